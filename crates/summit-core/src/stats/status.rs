use serde::Serialize;
use strum::IntoStaticStr;

/// Outcome of the most recent hook attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, IntoStaticStr)]
pub enum HookStatus {
    #[default]
    NotHooked,
    SignatureNotFound,
    TitleNotFound,
    Hooked,
}

impl HookStatus {
    pub fn text(&self) -> &'static str {
        match self {
            HookStatus::NotHooked => "Cannot find the game process. Retrying...",
            HookStatus::SignatureNotFound => "Cannot find memory region.",
            HookStatus::TitleNotFound => "Cannot find game fields.",
            HookStatus::Hooked => "Successfully found memory region.",
        }
    }

    pub fn is_hooked(&self) -> bool {
        *self == HookStatus::Hooked
    }
}

impl std::fmt::Display for HookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(HookStatus::default(), HookStatus::NotHooked);
        assert!(HookStatus::Hooked.is_hooked());
        assert!(!HookStatus::TitleNotFound.is_hooked());
        assert_eq!(
            HookStatus::SignatureNotFound.to_string(),
            "Cannot find memory region."
        );
    }
}
