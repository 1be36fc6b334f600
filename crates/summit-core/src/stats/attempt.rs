use serde::Serialize;

use crate::game::LocationId;

/// Rolling death/success counters for one room within a chapter side.
///
/// `current_deaths` and `passed` belong to the attempt in progress; the
/// `historical_*` counters only change when an attempt ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttemptStat {
    pub location: LocationId,
    pub passed: bool,
    pub current_deaths: i32,
    pub historical_deaths: i32,
    pub historical_successes: i32,
}

impl AttemptStat {
    pub fn new(location: LocationId) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }

    pub fn total_deaths(&self) -> i32 {
        self.current_deaths + self.historical_deaths
    }

    pub fn total_successes(&self) -> i32 {
        self.historical_successes + i32::from(self.passed)
    }

    /// Successes over all recorded outcomes; 0 when nothing is recorded.
    pub fn success_rate(&self) -> f64 {
        let successes = self.total_successes();
        let outcomes = self.total_deaths() + successes;
        if outcomes <= 0 {
            0.0
        } else {
            f64::from(successes) / f64::from(outcomes)
        }
    }

    /// Current-attempt deaths, shown only once the room has been passed.
    pub fn current_deaths_display(&self) -> String {
        if self.passed {
            self.current_deaths.to_string()
        } else {
            "-".to_string()
        }
    }

    /// End-of-attempt bookkeeping: fold current counters into history.
    pub fn end_attempt(&mut self) {
        self.historical_deaths += self.current_deaths;
        self.current_deaths = 0;
        if self.passed {
            self.historical_successes += 1;
        }
        self.passed = false;
    }
}
