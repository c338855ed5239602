use chrono::{DateTime, Local};

use crate::store::TimerStore;
use crate::timer::{Status, Timer, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Paused,
    Done,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Self::All, Self::Active, Self::Paused, Self::Done];

    pub fn matches(self, timer: &Timer, now: DateTime<Local>) -> bool {
        match self {
            Self::All => true,
            Self::Active => timer.status(now) == Status::Active,
            Self::Paused => timer.status(now) == Status::Paused,
            Self::Done => timer.status(now) == Status::Done,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Active,
            Self::Active => Self::Paused,
            Self::Paused => Self::Done,
            Self::Done => Self::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Done => "Done",
        }
    }
}

/// Store positions of the timers in `filter`'s view, in store order.
pub fn visible_indices(store: &TimerStore, filter: Filter, now: DateTime<Local>) -> Vec<usize> {
    store
        .timers()
        .iter()
        .enumerate()
        .filter(|(_, t)| filter.matches(t, now))
        .map(|(i, _)| i)
        .collect()
}

pub fn visible<'a>(store: &'a TimerStore, filter: Filter, now: DateTime<Local>) -> Vec<&'a Timer> {
    store.timers().iter().filter(|t| filter.matches(t, now)).collect()
}

/// Maps a view-local cursor to its timer's id.
pub fn target(store: &TimerStore, filter: Filter, cursor: usize, now: DateTime<Local>) -> Option<TimerId> {
    visible(store, filter, now).get(cursor).map(|t| t.id)
}

/// Maps a view-local cursor to a store position, resolving by timer id.
pub fn actual_index(store: &TimerStore, filter: Filter, cursor: usize, now: DateTime<Local>) -> Option<usize> {
    target(store, filter, cursor, now).and_then(|id| store.position(id))
}

/// Where `id` sits in `filter`'s view, if it is visible there.
pub fn visible_position(store: &TimerStore, filter: Filter, id: TimerId, now: DateTime<Local>) -> Option<usize> {
    visible(store, filter, now).iter().position(|t| t.id == id)
}

/// Pulls `cursor` back inside a view of `len` items (0 when empty).
pub fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use std::time::Duration;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    /// a: active, b: paused, c: done, d: active
    fn mixed() -> (TimerStore, DateTime<Local>) {
        let mut store = TimerStore::new();
        store.add("a", Duration::from_secs(600), t0()).unwrap();
        store.add("b", Duration::from_secs(600), t0()).unwrap();
        store.add("c", Duration::from_secs(10), t0()).unwrap();
        store.add("d", Duration::from_secs(900), t0()).unwrap();
        let now = t0() + TimeDelta::seconds(60);
        store.pause(1, now).unwrap();
        (store, now)
    }

    fn names(timers: Vec<&Timer>) -> Vec<&str> {
        timers.into_iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn views_preserve_store_order() {
        let (store, now) = mixed();
        assert_eq!(names(visible(&store, Filter::All, now)), ["a", "b", "c", "d"]);
        assert_eq!(names(visible(&store, Filter::Active, now)), ["a", "d"]);
        assert_eq!(names(visible(&store, Filter::Paused, now)), ["b"]);
        assert_eq!(names(visible(&store, Filter::Done, now)), ["c"]);
    }

    #[test]
    fn buckets_partition_the_store() {
        let (store, now) = mixed();
        let all = visible_indices(&store, Filter::All, now);
        assert_eq!(all.len(), store.len());

        let mut covered: Vec<usize> = [Filter::Active, Filter::Paused, Filter::Done]
            .into_iter()
            .flat_map(|f| visible_indices(&store, f, now))
            .collect();
        covered.sort_unstable();
        assert_eq!(covered, all);
    }

    #[test]
    fn cursor_resolves_through_the_view() {
        let (store, now) = mixed();
        assert_eq!(actual_index(&store, Filter::Active, 0, now), Some(0));
        assert_eq!(actual_index(&store, Filter::Active, 1, now), Some(3));
        assert_eq!(actual_index(&store, Filter::Done, 0, now), Some(2));
        assert_eq!(actual_index(&store, Filter::Paused, 1, now), None);
    }

    #[test]
    fn identical_timers_resolve_to_distinct_slots() {
        let mut store = TimerStore::new();
        store.add("twin", Duration::from_secs(60), t0()).unwrap();
        store.add("twin", Duration::from_secs(60), t0()).unwrap();

        assert_eq!(actual_index(&store, Filter::All, 0, t0()), Some(0));
        assert_eq!(actual_index(&store, Filter::All, 1, t0()), Some(1));
    }

    #[test]
    fn clamp_collapses_to_last_valid_index() {
        assert_eq!(clamp_cursor(5, 3), 2);
        assert_eq!(clamp_cursor(1, 3), 1);
        assert_eq!(clamp_cursor(4, 0), 0);
    }

    #[test]
    fn filter_cycle_wraps() {
        let mut f = Filter::All;
        for expected in [Filter::Active, Filter::Paused, Filter::Done, Filter::All] {
            f = f.next();
            assert_eq!(f, expected);
        }
    }
}
