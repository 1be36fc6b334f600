//! Deadline bookkeeping for the two periodic tasks.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Rehook,
    Tick,
}

/// Tracks the next deadline of each task. Both are due immediately after
/// creation; when both are due, rehook runs first.
#[derive(Debug, Clone)]
pub struct Schedule {
    hook_interval: Duration,
    tick_interval: Duration,
    next_hook: Instant,
    next_tick: Instant,
}

impl Schedule {
    pub fn new(hook_interval: Duration, tick_interval: Duration, now: Instant) -> Self {
        Self {
            hook_interval,
            tick_interval,
            next_hook: now,
            next_tick: now,
        }
    }

    /// Pop the task due at `now`, advancing its deadline.
    pub fn due(&mut self, now: Instant) -> Option<Task> {
        if self.next_hook <= now {
            self.next_hook = advance(self.next_hook, self.hook_interval, now);
            Some(Task::Rehook)
        } else if self.next_tick <= now {
            self.next_tick = advance(self.next_tick, self.tick_interval, now);
            Some(Task::Tick)
        } else {
            None
        }
    }

    /// Time from `now` until the earlier deadline.
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_hook
            .min(self.next_tick)
            .saturating_duration_since(now)
    }
}

/// Next deadline after `deadline`; missed periods are dropped rather than
/// replayed in a burst.
fn advance(deadline: Instant, interval: Duration, now: Instant) -> Instant {
    let next = deadline + interval;
    if next <= now { now + interval } else { next }
}
