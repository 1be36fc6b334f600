use std::collections::HashMap;

use crate::game::LocationId;
use crate::stats::AttemptStat;

/// Attempt statistics for one chapter side, in first-visit order.
#[derive(Debug, Clone, Default)]
pub struct StatTable {
    stats: Vec<AttemptStat>,
    index: HashMap<LocationId, usize>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn as_slice(&self) -> &[AttemptStat] {
        &self.stats
    }

    pub fn get(&self, location: &LocationId) -> Option<&AttemptStat> {
        self.index.get(location).map(|&i| &self.stats[i])
    }

    pub fn get_mut(&mut self, location: &LocationId) -> Option<&mut AttemptStat> {
        self.index.get(location).map(|&i| &mut self.stats[i])
    }

    /// Create the entry for `location` if missing. Returns true if it was created.
    pub fn ensure(&mut self, location: &LocationId) -> bool {
        if self.index.contains_key(location) {
            return false;
        }
        self.index.insert(location.clone(), self.stats.len());
        self.stats.push(AttemptStat::new(location.clone()));
        true
    }

    /// Run end-of-attempt bookkeeping on every entry.
    pub fn end_attempt(&mut self) {
        self.stats.iter_mut().for_each(AttemptStat::end_attempt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_visit_order() {
        let mut table = StatTable::new();
        assert!(table.ensure(&LocationId::new("b", "b")));
        assert!(table.ensure(&LocationId::new("a", "a")));
        assert!(!table.ensure(&LocationId::new("b", "b")));

        let names: Vec<String> = table
            .as_slice()
            .iter()
            .map(|s| s.location.to_string())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_get_mut() {
        let mut table = StatTable::new();
        let loc = LocationId::new("a", "a");
        table.ensure(&loc);
        table.get_mut(&loc).unwrap().current_deaths = 3;

        assert_eq!(table.get(&loc).unwrap().current_deaths, 3);
        assert!(table.get(&LocationId::new("x", "x")).is_none());
    }

    #[test]
    fn test_end_attempt_all() {
        let mut table = StatTable::new();
        let a = LocationId::new("a", "a");
        let b = LocationId::new("b", "b");
        table.ensure(&a);
        table.ensure(&b);
        table.get_mut(&a).unwrap().passed = true;
        table.get_mut(&b).unwrap().current_deaths = 2;

        table.end_attempt();

        assert_eq!(table.get(&a).unwrap().historical_successes, 1);
        assert_eq!(table.get(&b).unwrap().historical_deaths, 2);
        assert!(table.as_slice().iter().all(|s| !s.passed && s.current_deaths == 0));
    }
}
