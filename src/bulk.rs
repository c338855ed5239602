use chrono::{DateTime, Local};
use tracing::info;

use crate::filter::Filter;
use crate::store::{pause_timer, restart_timer, resume_timer, TimerStore};
use crate::timer::{Status, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    PauseAll,
    ResumeAll,
    DeleteDone,
    RestartAll,
}

impl BulkAction {
    pub fn title(&self) -> &'static str {
        match self {
            Self::PauseAll => "Pause All Active",
            Self::ResumeAll => "Resume All Paused",
            Self::DeleteDone => "Delete Completed",
            Self::RestartAll => "Restart All",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            Self::PauseAll => "Pause all active timers?",
            Self::ResumeAll => "Resume all paused timers?",
            Self::DeleteDone => "Delete all completed timers?",
            Self::RestartAll => "Restart all timers?",
        }
    }
}

/// Applies `action` to every eligible timer and returns how many changed.
/// Ineligible timers are skipped; the store turns dirty only if count > 0.
pub fn execute(store: &mut TimerStore, action: BulkAction, now: DateTime<Local>) -> usize {
    let count = match action {
        BulkAction::PauseAll => apply(store, |t| pause_timer(t, now).is_ok()),
        BulkAction::ResumeAll => apply(store, |t| resume_timer(t, now).is_ok()),
        BulkAction::DeleteDone => store.retain(|t| t.status(now) != Status::Done),
        BulkAction::RestartAll => restart_matching(store, Filter::All, now),
    };
    if count > 0 {
        store.mark_dirty();
    }
    info!(?action, count, "bulk action applied");
    count
}

/// Restarts every timer in `filter`'s view that has a duration.
pub fn restart_matching(store: &mut TimerStore, filter: Filter, now: DateTime<Local>) -> usize {
    let count = apply(store, |t| filter.matches(t, now) && restart_timer(t, now).is_ok());
    if count > 0 {
        store.mark_dirty();
    }
    count
}

/// Removes every timer. Returns how many were removed.
pub fn delete_all(store: &mut TimerStore) -> usize {
    let count = store.retain(|_| false);
    if count > 0 {
        store.mark_dirty();
    }
    count
}

fn apply(store: &mut TimerStore, mut op: impl FnMut(&mut Timer) -> bool) -> usize {
    let mut count = 0;
    for timer in store.timers_mut() {
        if op(timer) {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use std::time::Duration;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Local> {
        t0() + TimeDelta::seconds(secs)
    }

    /// long: active, short: done at +60s, held: paused
    fn store() -> TimerStore {
        let mut store = TimerStore::new();
        store.add("long", Duration::from_secs(3600), t0()).unwrap();
        store.add("short", Duration::from_secs(30), t0()).unwrap();
        store.add("held", Duration::from_secs(600), t0()).unwrap();
        store.pause(2, at(10)).unwrap();
        store.mark_clean();
        store
    }

    #[test]
    fn pause_all_skips_done_and_paused() {
        let mut s = store();
        assert_eq!(execute(&mut s, BulkAction::PauseAll, at(60)), 1);
        assert!(s.get(0).unwrap().paused);
        assert!(!s.get(1).unwrap().paused);
        assert!(s.is_dirty());
    }

    #[test]
    fn pause_all_then_resume_all_restores_end() {
        let mut s = store();
        let before = s.get(0).unwrap().end;

        execute(&mut s, BulkAction::PauseAll, at(60));
        assert_eq!(execute(&mut s, BulkAction::ResumeAll, at(60)), 2);

        let after = s.get(0).unwrap().end;
        assert!((after - before).num_seconds().abs() <= 1);
    }

    #[test]
    fn delete_done_keeps_survivor_order() {
        let mut s = store();
        s.add("also done", Duration::from_secs(5), t0()).unwrap();
        s.add("tail", Duration::from_secs(7200), t0()).unwrap();

        assert_eq!(execute(&mut s, BulkAction::DeleteDone, at(60)), 2);
        let names: Vec<_> = s.timers().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["long", "held", "tail"]);
        assert!(s.timers().iter().all(|t| t.status(at(60)) != Status::Done));
    }

    #[test]
    fn restart_all_rearms_everything_with_a_duration() {
        let mut s = store();
        s.timers_mut()[1].duration = Duration::ZERO;

        assert_eq!(execute(&mut s, BulkAction::RestartAll, at(100)), 2);
        assert_eq!(s.get(0).unwrap().end, at(3700));
        assert!(!s.get(2).unwrap().paused);
        assert_eq!(s.get(2).unwrap().end, at(700));
    }

    #[test]
    fn nothing_eligible_leaves_store_clean() {
        let mut s = store();
        assert_eq!(execute(&mut s, BulkAction::DeleteDone, at(5)), 0);
        assert!(!s.is_dirty());
    }

    #[test]
    fn restart_matching_respects_the_view() {
        let mut s = store();
        assert_eq!(restart_matching(&mut s, Filter::Paused, at(60)), 1);
        assert_eq!(s.get(2).unwrap().end, at(660));
        assert_eq!(s.get(0).unwrap().end, at(3600));
    }

    #[test]
    fn delete_all_empties_the_store() {
        let mut s = store();
        assert_eq!(delete_all(&mut s), 3);
        assert!(s.is_empty());
        assert!(s.is_dirty());
    }
}
