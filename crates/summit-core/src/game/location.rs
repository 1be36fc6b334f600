use serde::{Deserialize, Serialize};

/// A room, identified by the room the player entered the level through and the
/// room they are in now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId {
    pub entry: String,
    pub current: String,
}

impl LocationId {
    pub fn new(entry: impl Into<String>, current: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            current: current.into(),
        }
    }

    /// Either label blank.
    pub fn is_empty(&self) -> bool {
        self.entry.is_empty() || self.current.is_empty()
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            Ok(())
        } else if self.entry == self.current {
            write!(f, "{}", self.current)
        } else {
            write!(f, "{} (via {})", self.current, self.entry)
        }
    }
}
