use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::{
    path::PathBuf,
    time::{Duration, Instant, SystemTime},
};
use tracing::{info, warn};

use crate::adjust;
use crate::bulk::{self, BulkAction};
use crate::config::AdjustConfig;
use crate::duration;
use crate::error::Result;
use crate::filter::{self, Filter};
use crate::notify;
use crate::storage;
use crate::store::TimerStore;
use crate::timer::{Timer, TimerId};

// ============================================================================
// Constants
// ============================================================================

pub const TICK_RATE: Duration = Duration::from_secs(1);
const AUTO_SAVE_INTERVAL: Duration = Duration::from_secs(5);
const DURATION_CHARS: &str = "0123456789smhdyo ";

// ============================================================================
// Modes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Duration,
}

impl Field {
    fn other(self) -> Self {
        match self {
            Self::Name => Self::Duration,
            Self::Duration => Self::Name,
        }
    }
}

/// The add/edit form. `target` is `None` when adding.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub target: Option<TimerId>,
    pub name: String,
    pub duration: String,
    pub focus: Field,
    pub error: Option<String>,
}

impl Form {
    fn blank() -> Self {
        Self {
            target: None,
            name: String::new(),
            duration: String::new(),
            focus: Field::Name,
            error: None,
        }
    }

    fn for_timer(timer: &Timer) -> Self {
        Self {
            target: Some(timer.id),
            name: timer.name.clone(),
            duration: duration::format(timer.duration),
            focus: Field::Name,
            error: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.target.is_none()
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Name => &mut self.name,
            Field::Duration => &mut self.duration,
        }
    }
}

/// Exactly one of these is active; entering one leaves the previous.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browsing,
    Editing(Form),
    ConfirmingDelete { target: TimerId },
    ConfirmingRestart { target: TimerId },
    ConfirmingBulk { action: BulkAction },
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub store: TimerStore,
    pub filter: Filter,
    pub cursor: usize,
    pub mode: Mode,
    pub now: DateTime<Local>,
    pub config: AdjustConfig,
    pub show_help: bool,
    pub status: Option<String>,
    pub external_change_pending: bool,
    data_file: PathBuf,
    synced_at: Option<SystemTime>,
    last_save: Instant,
    notifications: bool,
    sound: bool,
}

impl App {
    pub fn new(store: TimerStore, config: AdjustConfig, data_file: PathBuf, now: DateTime<Local>) -> Self {
        let synced_at = storage::modified(&data_file);
        Self {
            store,
            filter: Filter::All,
            cursor: 0,
            mode: Mode::Browsing,
            now,
            config,
            show_help: false,
            status: None,
            external_change_pending: false,
            data_file,
            synced_at,
            last_save: Instant::now(),
            notifications: false,
            sound: false,
        }
    }

    pub fn with_notifications(mut self, notifications: bool, sound: bool) -> Self {
        self.notifications = notifications;
        self.sound = sound;
        self
    }

    pub fn visible(&self) -> Vec<&Timer> {
        filter::visible(&self.store, self.filter, self.now)
    }

    /// Timer under the cursor in the current view.
    pub fn target(&self) -> Option<TimerId> {
        filter::target(&self.store, self.filter, self.cursor, self.now)
    }

    pub fn timer(&self, id: TimerId) -> Option<&Timer> {
        self.store.position(id).and_then(|i| self.store.get(i))
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = filter::clamp_cursor(self.cursor, len);
    }

    /// Puts the cursor on `id` if the current view shows it.
    fn follow(&mut self, id: TimerId) {
        match filter::visible_position(&self.store, self.filter, id, self.now) {
            Some(pos) => self.cursor = pos,
            None => self.clamp_cursor(),
        }
    }

    // ------------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------------

    /// Advances "now", announces timers that finished since the last tick and
    /// auto-saves pending changes.
    pub fn update(&mut self, now: DateTime<Local>) -> Vec<String> {
        let before = self.now;
        self.now = now;

        let finished: Vec<String> = self
            .store
            .timers()
            .iter()
            .filter(|t| !t.paused && before < t.end && t.end <= now)
            .map(|t| t.name.clone())
            .collect();

        for name in &finished {
            info!(name = %name, "timer finished");
            if self.notifications {
                notify::timer_done(name, self.sound);
            }
        }

        self.clamp_cursor();

        if self.store.is_dirty() && self.last_save.elapsed() >= AUTO_SAVE_INTERVAL {
            if let Err(e) = self.save() {
                warn!("auto-save failed: {}", e);
                self.last_save = Instant::now();
            }
        }
        finished
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    pub fn save(&mut self) -> Result<()> {
        storage::save_timers(&self.data_file, self.store.timers())?;
        self.store.mark_clean();
        self.synced_at = storage::modified(&self.data_file);
        self.last_save = Instant::now();
        self.external_change_pending = false;
        Ok(())
    }

    /// Best effort: a failed write is logged and the session still ends.
    pub fn save_on_quit(&mut self) {
        if !self.store.is_dirty() {
            return;
        }
        match self.save() {
            Ok(()) => info!("saved timers on quit"),
            Err(e) => warn!("could not save timers on quit: {}", e),
        }
    }

    /// Reloads when the file changed on disk. Local edits win: while the
    /// session is dirty or a dialog is open the reload waits.
    pub fn check_external_change(&mut self) {
        let Some(mtime) = storage::modified(&self.data_file) else {
            return;
        };
        if self.synced_at.is_some_and(|seen| mtime <= seen) {
            return;
        }

        if self.store.is_dirty() || self.mode != Mode::Browsing {
            if !self.external_change_pending {
                warn!("timer file changed on disk while local changes are pending; keeping local state");
                self.external_change_pending = true;
            }
            return;
        }

        match storage::load_timers(&self.data_file) {
            Ok(timers) => {
                info!(count = timers.len(), "reloaded timers after external change");
                self.replace_timers(timers);
                self.status = Some("Reloaded timers from disk".into());
            }
            Err(e) => warn!("external change could not be loaded: {}", e),
        }
        self.synced_at = Some(mtime);
        self.external_change_pending = false;
    }

    pub fn replace_timers(&mut self, timers: Vec<Timer>) {
        self.store = TimerStore::from_timers(timers);
        self.clamp_cursor();
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Handles one key press. Returns true when the session should end.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Browsing => return self.handle_browsing(key),
            Mode::Editing(_) => self.handle_form(key),
            Mode::ConfirmingDelete { .. } | Mode::ConfirmingRestart { .. } | Mode::ConfirmingBulk { .. } => {
                self.handle_confirm(key)
            }
        }
        false
    }

    fn handle_browsing(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        self.status = None;

        match key.code {
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') if ctrl => self.reorder_up(),
            KeyCode::Down | KeyCode::Char('j') if ctrl => self.reorder_down(),
            KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.visible().len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Editing(Form::blank()),
            KeyCode::Char('e') => {
                if let Some(form) = self.target().and_then(|id| self.timer(id)).map(Form::for_timer) {
                    self.mode = Mode::Editing(form);
                }
            }
            KeyCode::Char('d') => {
                if let Some(target) = self.target() {
                    self.mode = Mode::ConfirmingDelete { target };
                }
            }
            KeyCode::Char('r') => {
                let restartable = self
                    .target()
                    .and_then(|id| self.timer(id))
                    .filter(|t| !t.duration.is_zero())
                    .map(|t| t.id);
                if let Some(target) = restartable {
                    self.mode = Mode::ConfirmingRestart { target };
                }
            }
            KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Char('P') => self.mode = Mode::ConfirmingBulk { action: BulkAction::PauseAll },
            KeyCode::Char('U') => self.mode = Mode::ConfirmingBulk { action: BulkAction::ResumeAll },
            KeyCode::Char('R') => self.mode = Mode::ConfirmingBulk { action: BulkAction::RestartAll },
            KeyCode::Char('D') => self.mode = Mode::ConfirmingBulk { action: BulkAction::DeleteDone },
            KeyCode::Tab => {
                self.filter = self.filter.next();
                self.clamp_cursor();
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.filter = Filter::ALL[c as usize - '1' as usize];
                self.cursor = 0;
            }
            KeyCode::Char('?') => self.show_help = !self.show_help,
            _ => {}
        }
        false
    }

    fn toggle_pause(&mut self) {
        let Some(index) = filter::actual_index(&self.store, self.filter, self.cursor, self.now) else {
            return;
        };
        let paused = self.store.get(index).is_some_and(|t| t.paused);
        let result = if paused {
            self.store.resume(index, self.now)
        } else {
            self.store.pause(index, self.now)
        };
        // Ineligible timers are left alone.
        if result.is_ok() {
            self.clamp_cursor();
        }
    }

    fn reorder_up(&mut self) {
        let Some(id) = self.target() else { return };
        if let Some(index) = self.store.position(id).filter(|&i| i > 0) {
            self.store.swap_with_next(index - 1);
            self.follow(id);
        }
    }

    fn reorder_down(&mut self) {
        let Some(id) = self.target() else { return };
        if let Some(index) = self.store.position(id) {
            if self.store.swap_with_next(index) {
                self.follow(id);
            }
        }
    }

    fn handle_form(&mut self, key: KeyEvent) {
        let Mode::Editing(form) = &mut self.mode else {
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browsing;
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => form.focus = form.focus.other(),
            KeyCode::Down => form.focus = Field::Duration,
            KeyCode::Up => form.focus = Field::Name,
            KeyCode::Enter => {
                if form.focus == Field::Name {
                    if !form.name.trim().is_empty() {
                        form.focus = Field::Duration;
                    }
                } else {
                    self.submit();
                }
                return;
            }
            KeyCode::Backspace => {
                form.focused_mut().pop();
                form.error = None;
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {}
            KeyCode::Char(c) if form.focus == Field::Duration => {
                let steps = match c {
                    '=' => Some(i64::from(self.config.increment_step)),
                    '-' => Some(-i64::from(self.config.increment_step)),
                    '+' => Some(i64::from(self.config.shift_increment_step)),
                    '_' => Some(-i64::from(self.config.shift_increment_step)),
                    _ => None,
                };
                match steps {
                    Some(steps) => form.duration = adjust::adjust(&form.duration, steps, &self.config),
                    None if DURATION_CHARS.contains(c.to_ascii_lowercase()) => {
                        form.duration.push(c.to_ascii_lowercase())
                    }
                    None => {}
                }
                form.error = None;
            }
            KeyCode::Char(c) => {
                form.name.push(c);
                form.error = None;
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        let Mode::Editing(mut form) = std::mem::replace(&mut self.mode, Mode::Browsing) else {
            return;
        };

        let name = form.name.trim().to_string();
        if name.is_empty() {
            form.error = Some("Name must not be empty".into());
            self.mode = Mode::Editing(form);
            return;
        }
        let span = match duration::parse(&form.duration) {
            Ok(span) => span,
            Err(e) => {
                form.error = Some(format!("Invalid duration: {}", e));
                self.mode = Mode::Editing(form);
                return;
            }
        };

        let committed = match form.target {
            None => self.store.add(&name, span, self.now).ok(),
            Some(id) => self
                .store
                .position(id)
                .and_then(|index| self.store.edit(index, &name, span, self.now).ok())
                .map(|_| id),
        };

        match committed {
            Some(id) => {
                info!(name = %name, duration = %duration::format(span), new = form.is_new(), "timer saved");
                self.follow(id);
            }
            None => self.status = Some("Timer no longer exists".into()),
        }
    }

    fn handle_confirm(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.mode = Mode::Browsing,
            _ => {}
        }
    }

    fn confirm(&mut self) {
        let mode = std::mem::replace(&mut self.mode, Mode::Browsing);
        let now = self.now;

        match mode {
            Mode::ConfirmingDelete { target } => {
                if let Some(index) = self.store.position(target) {
                    if let Ok(removed) = self.store.remove(index) {
                        info!(name = %removed.name, "deleted timer");
                    }
                }
            }
            Mode::ConfirmingRestart { target } => {
                if let Some(index) = self.store.position(target) {
                    let _ = self.store.restart(index, now);
                }
            }
            Mode::ConfirmingBulk { action } => {
                let count = bulk::execute(&mut self.store, action, now);
                self.status = Some(format!("{}: {} timer(s)", action.title(), count));
            }
            Mode::Browsing | Mode::Editing(_) => {}
        }
        self.clamp_cursor();
    }
}
