//! Reconciles the per-tick snapshot stream into per-room attempt statistics.
//!
//! Each tick runs a fixed sequence of guarded transitions (see [`RunState::update`]).
//! The game's death counters are noisy while the player moves between rooms and
//! menus, so a new counter value is only accepted if it is exactly one above the
//! stored baseline or the baseline has been reset.

use std::collections::HashMap;

use tracing::debug;

use crate::export::{format_csv, format_elapsed};
use crate::game::{Chapter, LocationId, MENU_ID, Side, Snapshot, UNSET_ID};
use crate::stats::observer::{Callback, Subscribers, SubscriptionId};
use crate::stats::{AttemptStat, Field, HookStatus, StatTable};

/// Table key: raw chapter id and side.
pub type TableKey = (i32, i32);

#[derive(Debug)]
pub struct RunState {
    chapter_id: i32,
    side: i32,
    location: Option<LocationId>,
    /// Baselines; `None` until the next value is accepted unconditionally
    chapter_deaths: Option<i32>,
    location_deaths: Option<i32>,
    /// Portion of `location_deaths` already folded into the current room
    location_deaths_folded: i32,
    elapsed_ms: i64,
    completed_latch: bool,
    tables: HashMap<TableKey, StatTable>,
    active: Option<TableKey>,
    status: HookStatus,
    pending: Vec<Field>,
    subscribers: Subscribers,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            chapter_id: UNSET_ID,
            side: 0,
            location: None,
            chapter_deaths: None,
            location_deaths: None,
            location_deaths_folded: 0,
            elapsed_ms: 0,
            completed_latch: false,
            tables: HashMap::new(),
            active: None,
            status: HookStatus::NotHooked,
            pending: Vec::new(),
            subscribers: Subscribers::default(),
        }
    }

    /// Apply one snapshot, then notify subscribers of every field that changed.
    ///
    /// Transition order:
    /// 1. completion edge (commits and ends the tick)
    /// 2. side and chapter change (table switch sees the new side)
    /// 3. time regression (menu reset commits as failed)
    /// 4. elapsed time
    /// 5. room transition
    /// 6. chapter death counter
    /// 7. room death counter
    pub fn update(&mut self, snapshot: &Snapshot) {
        self.apply(snapshot);
        self.flush();
    }

    fn apply(&mut self, s: &Snapshot) {
        if self.completion_edge(s.completed) {
            return;
        }
        self.chapter_change(s.chapter_id, s.side);
        self.time_regression(s.chapter_id, s.elapsed_ms);
        self.store_elapsed(s.elapsed_ms);
        let absorbed = self.room_transition(&s.location, s.location_deaths);
        self.accept_chapter_deaths(s.chapter_deaths);
        if !absorbed {
            self.accept_location_deaths(s.location_deaths);
        }
    }

    fn completion_edge(&mut self, completed: bool) -> bool {
        if !completed || self.completed_latch {
            return false;
        }
        debug!("Chapter completed in {}", self.location_display());
        self.commit(true);
        self.completed_latch = true;
        true
    }

    fn chapter_change(&mut self, chapter_id: i32, side: i32) {
        if side != self.side {
            self.side = side;
            self.mark(Field::Side);
        }

        if chapter_id == self.chapter_id {
            return;
        }

        if Chapter::is_valid_id(chapter_id) {
            let key = (chapter_id, side);
            self.tables.entry(key).or_default();
            self.active = Some(key);
            debug!(
                "Active table: {} {}",
                Chapter::name_for(chapter_id),
                Side::name_for(side)
            );
            self.mark(Field::DeathStats);
        }
        self.chapter_id = chapter_id;
        self.mark(Field::ChapterName);
    }

    fn time_regression(&mut self, chapter_id: i32, elapsed_ms: i64) {
        if elapsed_ms >= self.elapsed_ms {
            return;
        }

        // The chapter counter restarts with the timer; the room counter does not
        self.chapter_deaths = None;

        if chapter_id == MENU_ID {
            debug!("Reset to menu from {}", self.location_display());
            self.commit(false);
            if self.location.take().is_some() {
                self.mark(Field::RoomName);
            }
        }
    }

    fn store_elapsed(&mut self, elapsed_ms: i64) {
        if elapsed_ms != self.elapsed_ms {
            self.elapsed_ms = elapsed_ms;
            self.mark(Field::ChapterTime);
        }
    }

    /// Returns true when `location_deaths` was absorbed by the outgoing room.
    fn room_transition(&mut self, location: &LocationId, location_deaths: i32) -> bool {
        if location.is_empty() || self.location.as_ref() == Some(location) || self.elapsed_ms <= 0 {
            return false;
        }

        debug!("Room {} -> {}", self.location_display(), location);

        let created = self
            .active_table_mut()
            .is_some_and(|table| table.ensure(location));
        if created {
            self.mark(Field::DeathStats);
        }

        let absorbed = if self.location.is_none() {
            self.completed_latch = false;
            self.chapter_deaths = None;
            self.reset_location_deaths();
            false
        } else {
            let absorbed = accepts(self.location_deaths, location_deaths);
            if absorbed {
                self.set_location_deaths(location_deaths);
            }
            self.commit(true);
            self.reset_location_deaths();
            absorbed
        };

        self.location = Some(location.clone());
        self.mark(Field::RoomName);
        absorbed
    }

    fn accept_chapter_deaths(&mut self, value: i32) {
        if accepts(self.chapter_deaths, value) {
            if self.chapter_deaths != Some(value) {
                self.mark(Field::ChapterDeathCount);
            }
            self.chapter_deaths = Some(value);
        }
    }

    fn accept_location_deaths(&mut self, value: i32) {
        if accepts(self.location_deaths, value) {
            self.set_location_deaths(value);
        }
    }

    fn set_location_deaths(&mut self, value: i32) {
        if self.location_deaths != Some(value) {
            self.mark(Field::RoomDeathCount);
        }
        self.location_deaths = Some(value);
    }

    fn reset_location_deaths(&mut self) {
        self.location_deaths = None;
        self.location_deaths_folded = 0;
    }

    /// Add the stored room's unfolded deaths to its stat and mark its outcome.
    fn fold_location_deaths(&mut self, passed: bool) {
        let Some(location) = self.location.clone() else {
            return;
        };
        let baseline = self.location_deaths.unwrap_or(0);
        let deaths = (baseline - self.location_deaths_folded).max(0);

        if let Some(stat) = self
            .active_table_mut()
            .and_then(|table| table.get_mut(&location))
        {
            stat.current_deaths += deaths;
            stat.passed = passed;
        }
        self.location_deaths_folded = baseline;
    }

    /// End the current attempt with the stored room marked passed or failed.
    fn commit(&mut self, passed: bool) {
        if self.location.is_none() || self.active.is_none() {
            return;
        }
        self.fold_location_deaths(passed);
        if let Some(table) = self.active_table_mut() {
            table.end_attempt();
        }
        self.mark(Field::DeathStats);
    }

    fn active_table_mut(&mut self) -> Option<&mut StatTable> {
        let key = self.active?;
        self.tables.get_mut(&key)
    }

    fn mark(&mut self, field: Field) {
        if !self.pending.contains(&field) {
            self.pending.push(field);
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let fields = std::mem::take(&mut self.pending);
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for field in fields {
            subscribers.notify(field, self);
        }
        self.subscribers = subscribers;
    }

    /// Register `callback` for changes to `field`, or to every field when `None`.
    pub fn subscribe<F>(&mut self, field: Option<Field>, callback: F) -> SubscriptionId
    where
        F: FnMut(Field, &RunState) + 'static,
    {
        let callback: Callback = Box::new(callback);
        self.subscribers.add(field, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn set_status(&mut self, status: HookStatus) {
        if status != self.status {
            self.status = status;
            self.mark(Field::Status);
            self.flush();
        }
    }

    pub fn status(&self) -> HookStatus {
        self.status
    }

    pub fn status_text(&self) -> &'static str {
        self.status.text()
    }

    pub fn chapter_id(&self) -> i32 {
        self.chapter_id
    }

    /// Empty for ids that are not known chapters.
    pub fn chapter_name(&self) -> &'static str {
        Chapter::name_for(self.chapter_id)
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    pub fn side_name(&self) -> &'static str {
        Side::name_for(self.side)
    }

    pub fn location(&self) -> Option<&LocationId> {
        self.location.as_ref()
    }

    pub fn location_display(&self) -> String {
        self.location
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed_ms
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_ms)
    }

    /// Accepted chapter death count, or -1 before the first accepted value.
    pub fn chapter_death_count(&self) -> i32 {
        self.chapter_deaths.unwrap_or(-1)
    }

    /// Accepted room death count, or -1 before the first accepted value.
    pub fn location_death_count(&self) -> i32 {
        self.location_deaths.unwrap_or(-1)
    }

    pub fn is_completed(&self) -> bool {
        self.completed_latch
    }

    pub fn active_key(&self) -> Option<TableKey> {
        self.active
    }

    /// Stats of the active table in first-visit order.
    pub fn stats(&self) -> &[AttemptStat] {
        self.active
            .and_then(|key| self.tables.get(&key))
            .map(StatTable::as_slice)
            .unwrap_or(&[])
    }

    pub fn stats_for(&self, chapter_id: i32, side: i32) -> Option<&[AttemptStat]> {
        self.tables
            .get(&(chapter_id, side))
            .map(StatTable::as_slice)
    }

    pub fn stat(&self, location: &LocationId) -> Option<&AttemptStat> {
        self.active
            .and_then(|key| self.tables.get(&key))
            .and_then(|table| table.get(location))
    }

    pub fn to_csv(&self) -> String {
        format_csv(self.stats())
    }
}

/// Counter acceptance: exactly one above the baseline, or no baseline yet.
fn accepts(baseline: Option<i32>, value: i32) -> bool {
    match baseline {
        None => true,
        Some(b) => b.checked_add(1) == Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tick {
        chapter: i32,
        side: i32,
        room: (&'static str, &'static str),
        chapter_deaths: i32,
        room_deaths: i32,
        time: i64,
        completed: bool,
    }

    impl Tick {
        fn at(room: &'static str, time: i64) -> Self {
            Self {
                chapter: 1,
                side: 0,
                room: (room, room),
                chapter_deaths: 0,
                room_deaths: 0,
                time,
                completed: false,
            }
        }

        fn via(mut self, entry: &'static str) -> Self {
            self.room.0 = entry;
            self
        }

        fn chapter(mut self, chapter: i32, side: i32) -> Self {
            self.chapter = chapter;
            self.side = side;
            self
        }

        fn deaths(mut self, chapter_deaths: i32, room_deaths: i32) -> Self {
            self.chapter_deaths = chapter_deaths;
            self.room_deaths = room_deaths;
            self
        }

        fn completed(mut self) -> Self {
            self.completed = true;
            self
        }

        fn snapshot(&self) -> Snapshot {
            Snapshot {
                chapter_id: self.chapter,
                side: self.side,
                location: LocationId::new(self.room.0, self.room.1),
                chapter_deaths: self.chapter_deaths,
                location_deaths: self.room_deaths,
                elapsed_ms: self.time,
                completed: self.completed,
            }
        }
    }

    fn run(state: &mut RunState, ticks: &[Tick]) {
        for tick in ticks {
            state.update(&tick.snapshot());
        }
    }

    fn loc(name: &str) -> LocationId {
        LocationId::new(name, name)
    }

    #[test]
    fn test_initial_state() {
        let state = RunState::new();
        assert_eq!(state.chapter_id(), UNSET_ID);
        assert_eq!(state.chapter_name(), "");
        assert_eq!(state.side(), 0);
        assert!(state.location().is_none());
        assert_eq!(state.chapter_death_count(), -1);
        assert_eq!(state.location_death_count(), -1);
        assert_eq!(state.elapsed_ms(), 0);
        assert!(state.stats().is_empty());
        assert!(state.active_key().is_none());
        assert_eq!(state.status(), HookStatus::NotHooked);
    }

    #[test]
    fn test_death_credited_to_room_left() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("b", 200).via("a").deaths(1, 1),
            ],
        );

        // Leaving "a" ends its attempt as passed, including the death seen this tick
        let a = state.stat(&loc("a")).unwrap();
        assert_eq!(a.historical_deaths, 1);
        assert_eq!(a.current_deaths, 0);
        assert_eq!(a.historical_successes, 1);
        assert!(!a.passed);

        let b = state.stat(&LocationId::new("a", "b")).unwrap();
        assert_eq!(b.current_deaths, 0);
        assert_eq!(b.total_deaths(), 0);
        assert_eq!(state.location_display(), "b (via a)");
        assert_eq!(state.chapter_death_count(), 1);
    }

    #[test]
    fn test_deaths_accumulate_before_leaving() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("a", 150).deaths(1, 1),
                Tick::at("a", 160).deaths(2, 2),
                Tick::at("b", 200).deaths(2, 0),
            ],
        );

        let a = state.stat(&loc("a")).unwrap();
        assert_eq!(a.historical_deaths, 2);
        assert_eq!(a.current_deaths, 0);
        assert_eq!(state.stat(&loc("b")).unwrap().current_deaths, 0);
        assert_eq!(state.location_death_count(), 0);
    }

    #[test]
    fn test_stale_counter_ignored() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100).deaths(5, 0),
                // Jump by more than one is stale
                Tick::at("a", 110).deaths(9, 3),
                Tick::at("a", 120).deaths(6, 1),
            ],
        );

        assert_eq!(state.chapter_death_count(), 6);
        assert_eq!(state.location_death_count(), 1);
    }

    #[test]
    fn test_first_room_needs_running_timer() {
        let mut state = RunState::new();
        run(&mut state, &[Tick::at("a", 0)]);
        assert!(state.location().is_none());
        assert!(state.stats().is_empty());

        run(&mut state, &[Tick::at("a", 1)]);
        assert_eq!(state.location(), Some(&loc("a")));
        assert_eq!(state.stats().len(), 1);
    }

    #[test]
    fn test_empty_room_ignored() {
        let mut state = RunState::new();
        run(&mut state, &[Tick::at("a", 100), Tick::at("", 200)]);
        assert_eq!(state.location(), Some(&loc("a")));
    }

    #[test]
    fn test_completion_commits_once() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("b", 200),
                Tick::at("b", 300).deaths(1, 1),
                Tick::at("b", 400).deaths(1, 1).completed(),
            ],
        );

        let a = state.stat(&loc("a")).unwrap();
        assert_eq!(a.historical_successes, 1);
        let b = state.stat(&loc("b")).unwrap();
        assert_eq!(b.historical_successes, 1);
        assert_eq!(b.historical_deaths, 1);
        assert!(state.is_completed());

        run(
            &mut state,
            &[Tick::at("b", 500).deaths(1, 1).completed()],
        );
        let b = state.stat(&loc("b")).unwrap();
        assert_eq!(b.historical_successes, 1);
        assert_eq!(b.historical_deaths, 1);
        assert_eq!(state.elapsed_ms(), 500);
    }

    #[test]
    fn test_completion_tick_skips_other_updates() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("b", 900).deaths(1, 1).completed(),
            ],
        );

        assert_eq!(state.elapsed_ms(), 100);
        assert_eq!(state.location(), Some(&loc("a")));
        assert_eq!(state.chapter_death_count(), 0);
    }

    #[test]
    fn test_menu_reset_commits_failure() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("b", 200),
                Tick::at("b", 300).deaths(1, 1),
                Tick::at("", 50).chapter(MENU_ID, 0).deaths(1, 1),
            ],
        );

        assert!(state.location().is_none());
        let b = state.stat(&loc("b")).unwrap();
        assert_eq!(b.historical_deaths, 1);
        assert_eq!(b.historical_successes, 0);
        assert!(!b.passed);
        // Leaving "a" already recorded its success
        assert_eq!(state.stat(&loc("a")).unwrap().historical_successes, 1);
        assert_eq!(state.chapter_name(), "Menu");
        // Menu keeps the previous table active
        assert_eq!(state.active_key(), Some((1, 0)));
    }

    #[test]
    fn test_time_regression_outside_menu_keeps_room() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100).deaths(3, 0),
                Tick::at("a", 50).deaths(0, 0),
            ],
        );

        assert_eq!(state.location(), Some(&loc("a")));
        // Chapter baseline was cleared, so 0 is accepted
        assert_eq!(state.chapter_death_count(), 0);
        assert_eq!(state.stat(&loc("a")).unwrap().historical_deaths, 0);
    }

    #[test]
    fn test_new_attempt_after_reset() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("a", 200).deaths(1, 1),
                Tick::at("", 10).chapter(MENU_ID, 0).deaths(1, 1),
                Tick::at("a", 20).deaths(0, 0),
                Tick::at("b", 30).deaths(0, 0),
            ],
        );

        let a = state.stat(&loc("a")).unwrap();
        assert_eq!(a.historical_deaths, 1);
        assert_eq!(a.current_deaths, 0);
        assert!(!a.passed);
        assert_eq!(a.total_successes(), 1);
    }

    #[test]
    fn test_commit_without_location_is_noop() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[Tick::at("", 100).completed()],
        );
        assert!(state.stats().is_empty());
        assert!(state.is_completed());
    }

    #[test]
    fn test_tables_per_chapter_side() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("", 10).chapter(MENU_ID, 0),
                Tick::at("x", 20).chapter(2, 1),
            ],
        );

        assert_eq!(state.active_key(), Some((2, 1)));
        assert_eq!(state.side_name(), "B-Side");
        assert_eq!(state.stats().len(), 1);
        assert_eq!(state.stats()[0].location, loc("x"));
        assert_eq!(state.stats_for(1, 0).map(<[_]>::len), Some(1));
        assert!(state.stats_for(3, 0).is_none());
    }

    #[test]
    fn test_invalid_chapter_tracks_rooms_without_stats() {
        let mut state = RunState::new();
        run(&mut state, &[Tick::at("a", 100).chapter(42, 0)]);

        assert_eq!(state.chapter_id(), 42);
        assert_eq!(state.chapter_name(), "");
        assert_eq!(state.location(), Some(&loc("a")));
        assert!(state.stats().is_empty());
    }

    #[test]
    fn test_folded_deaths_not_counted_twice() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[
                Tick::at("a", 100),
                Tick::at("b", 200),
                Tick::at("b", 300).deaths(1, 1),
                Tick::at("b", 400).deaths(1, 1).completed(),
                // Back to the menu while the room counter still reads 1
                Tick::at("", 10).chapter(MENU_ID, 0).deaths(1, 1),
            ],
        );

        let b = state.stat(&loc("b")).unwrap();
        assert_eq!(b.total_deaths(), 1);
        assert_eq!(b.historical_successes, 1);
    }

    #[test]
    fn test_subscribe_all_fields() {
        let mut state = RunState::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        state.subscribe(None, move |field, _| sink.borrow_mut().push(field));

        run(&mut state, &[Tick::at("a", 100)]);

        let seen = seen.borrow();
        assert!(seen.contains(&Field::ChapterName));
        assert!(seen.contains(&Field::ChapterTime));
        assert!(seen.contains(&Field::RoomName));
        assert!(seen.contains(&Field::DeathStats));
        assert!(seen.contains(&Field::ChapterDeathCount));
        assert!(seen.contains(&Field::RoomDeathCount));
        assert!(!seen.contains(&Field::Side));
    }

    #[test]
    fn test_subscribe_single_field_sees_consistent_state() {
        let mut state = RunState::new();
        let rooms = Rc::new(RefCell::new(Vec::new()));
        let sink = rooms.clone();
        state.subscribe(Some(Field::RoomName), move |field, s| {
            assert_eq!(field, Field::RoomName);
            sink.borrow_mut()
                .push((s.location_display(), s.elapsed_ms()));
        });

        run(
            &mut state,
            &[Tick::at("a", 100), Tick::at("a", 150), Tick::at("b", 200)],
        );

        assert_eq!(
            *rooms.borrow(),
            vec![("a".to_string(), 100), ("b".to_string(), 200)]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let mut state = RunState::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = state.subscribe(None, move |_, _| *sink.borrow_mut() += 1);
        assert_eq!(state.subscriber_count(), 1);

        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        run(&mut state, &[Tick::at("a", 100)]);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_status_notifies_once() {
        let mut state = RunState::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        state.subscribe(Some(Field::Status), move |_, _| *sink.borrow_mut() += 1);

        state.set_status(HookStatus::Hooked);
        state.set_status(HookStatus::Hooked);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(state.status_text(), "Successfully found memory region.");
    }

    #[test]
    fn test_elapsed_display() {
        let mut state = RunState::new();
        run(&mut state, &[Tick::at("a", 3_723_004)]);
        assert_eq!(state.elapsed_display(), "1:02:03.004");
    }

    #[test]
    fn test_to_csv() {
        let mut state = RunState::new();
        run(
            &mut state,
            &[Tick::at("a", 100), Tick::at("b", 200).deaths(1, 1)],
        );

        let csv = state.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "a,1,-,1,1,1");
        assert_eq!(lines[2], "b,0,-,0,0,0");
    }
}
