//! Field-change notifications.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::stats::RunState;

/// Observable properties of a [`RunState`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum Field {
    ChapterName,
    Side,
    ChapterTime,
    RoomName,
    ChapterDeathCount,
    RoomDeathCount,
    DeathStats,
    Status,
}

impl Field {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Callback = Box<dyn FnMut(Field, &RunState)>;

struct Subscription {
    id: SubscriptionId,
    filter: Option<Field>,
    callback: Callback,
}

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<Subscription>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, filter: Option<Field>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push(Subscription {
            id,
            filter,
            callback,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deliver `field` to every subscriber whose filter accepts it.
    pub(crate) fn notify(&mut self, field: Field, state: &RunState) {
        for subscription in &mut self.entries {
            if subscription.filter.is_none_or(|f| f == field) {
                (subscription.callback)(field, state);
            }
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}
