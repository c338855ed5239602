use chrono::{DateTime, Local};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::timer::{deadline, until, Timer, TimerId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("index {index} out of range ({len} timer(s))")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("timer is already paused")]
    AlreadyPaused,
    #[error("cannot pause: timer already done")]
    AlreadyDone,
    #[error("timer is already active")]
    NotPaused,
    #[error("cannot resume: no remaining time")]
    NoRemaining,
    #[error("cannot restart: timer has no duration")]
    ZeroDuration,
    #[error("name must not be empty")]
    EmptyName,
}

type Result<T> = std::result::Result<T, TimerError>;

/// Ordered timers plus the unsaved-changes flag. Every successful mutation
/// marks the store dirty.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimerStore {
    timers: Vec<Timer>,
    next_id: u64,
    dirty: bool,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of loaded timers, giving each a fresh id. Starts clean.
    pub fn from_timers(timers: Vec<Timer>) -> Self {
        let mut store = Self::default();
        for mut timer in timers {
            timer.id = store.issue_id();
            store.timers.push(timer);
        }
        store
    }

    fn issue_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn into_timers(self) -> Vec<Timer> {
        self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Timer> {
        self.timers.get(index)
    }

    pub fn position(&self, id: TimerId) -> Option<usize> {
        self.timers.iter().position(|t| t.id == id)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn slot(&mut self, index: usize) -> Result<&mut Timer> {
        let len = self.timers.len();
        self.timers
            .get_mut(index)
            .ok_or(TimerError::IndexOutOfRange { index, len })
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Timer) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(keep);
        before - self.timers.len()
    }

    pub(crate) fn timers_mut(&mut self) -> &mut [Timer] {
        &mut self.timers
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    pub fn add(&mut self, name: &str, duration: Duration, now: DateTime<Local>) -> Result<TimerId> {
        if name.trim().is_empty() {
            return Err(TimerError::EmptyName);
        }
        let id = self.issue_id();
        self.timers.push(Timer {
            id,
            name: name.into(),
            end: deadline(now, duration),
            paused: false,
            remaining: Duration::ZERO,
            duration,
        });
        self.dirty = true;
        debug!(?id, name, ?duration, "added timer");
        Ok(id)
    }

    pub fn remove(&mut self, index: usize) -> Result<Timer> {
        self.slot(index)?;
        let removed = self.timers.remove(index);
        self.dirty = true;
        debug!(id = ?removed.id, name = %removed.name, "removed timer");
        Ok(removed)
    }

    /// Exchanges positions `index` and `index + 1`. Returns false at the end.
    pub fn swap_with_next(&mut self, index: usize) -> bool {
        if index + 1 >= self.timers.len() {
            return false;
        }
        self.timers.swap(index, index + 1);
        self.dirty = true;
        true
    }

    pub fn pause(&mut self, index: usize, now: DateTime<Local>) -> Result<()> {
        let timer = self.slot(index)?;
        pause_timer(timer, now)?;
        self.dirty = true;
        Ok(())
    }

    pub fn resume(&mut self, index: usize, now: DateTime<Local>) -> Result<()> {
        let timer = self.slot(index)?;
        resume_timer(timer, now)?;
        self.dirty = true;
        Ok(())
    }

    pub fn restart(&mut self, index: usize, now: DateTime<Local>) -> Result<()> {
        let timer = self.slot(index)?;
        restart_timer(timer, now)?;
        self.dirty = true;
        Ok(())
    }

    /// Renames, resets the duration and re-arms the timer from `now`.
    pub fn edit(&mut self, index: usize, name: &str, duration: Duration, now: DateTime<Local>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(TimerError::EmptyName);
        }
        if duration.is_zero() {
            return Err(TimerError::ZeroDuration);
        }
        let timer = self.slot(index)?;
        timer.name = name.into();
        timer.duration = duration;
        restart_timer(timer, now)?;
        self.dirty = true;
        Ok(())
    }

    /// Renames without touching the clock.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(TimerError::EmptyName);
        }
        self.slot(index)?.name = name.into();
        self.dirty = true;
        Ok(())
    }
}

pub(crate) fn pause_timer(timer: &mut Timer, now: DateTime<Local>) -> Result<()> {
    if timer.paused {
        return Err(TimerError::AlreadyPaused);
    }
    if timer.end <= now {
        return Err(TimerError::AlreadyDone);
    }
    timer.remaining = until(now, timer.end);
    timer.paused = true;
    Ok(())
}

pub(crate) fn resume_timer(timer: &mut Timer, now: DateTime<Local>) -> Result<()> {
    if !timer.paused {
        return Err(TimerError::NotPaused);
    }
    if timer.remaining.is_zero() {
        return Err(TimerError::NoRemaining);
    }
    timer.end = deadline(now, timer.remaining);
    timer.paused = false;
    Ok(())
}

pub(crate) fn restart_timer(timer: &mut Timer, now: DateTime<Local>) -> Result<()> {
    if timer.duration.is_zero() {
        return Err(TimerError::ZeroDuration);
    }
    timer.end = deadline(now, timer.duration);
    timer.paused = false;
    timer.remaining = Duration::ZERO;
    Ok(())
}
