use chrono::{DateTime, Datelike, Local};
use clap::{Parser, Subcommand};
use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::bulk::{self, BulkAction};
use crate::duration;
use crate::error::{Error, Result};
use crate::filter::{self, Filter};
use crate::storage;
use crate::store::{TimerError, TimerStore};
use crate::timer::{until, Status, Timer};

// ============================================================================
// Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "rcountdown",
    author,
    version,
    about = "⏳ rcountdown - Countdown timers for the terminal",
    long_about = "Countdown timers for the terminal.\n\n\
                  Run without a command to open the interactive view.\n\
                  Durations combine units: 30s, 5m, 1h30m, 2d, 1mo, 1y."
)]
pub struct Args {
    /// Timer file to read and write
    #[arg(long, env = "RCOUNTDOWN_DATA", global = true)]
    pub data_file: Option<PathBuf>,
    /// Adjustment config file
    #[arg(long, env = "RCOUNTDOWN_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Do not show desktop notifications when timers finish
    #[arg(long)]
    pub no_notify: bool,
    /// Do not play a sound when timers finish
    #[arg(long)]
    pub no_sound: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Which status bucket indices count in. No flag means every timer.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
#[group(multiple = false)]
pub struct View {
    /// Only running timers
    #[arg(long)]
    pub active: bool,
    /// Only paused timers
    #[arg(long)]
    pub paused: bool,
    /// Only finished timers
    #[arg(long)]
    pub done: bool,
}

impl View {
    pub fn filter(&self) -> Filter {
        if self.active {
            Filter::Active
        } else if self.paused {
            Filter::Paused
        } else if self.done {
            Filter::Done
        } else {
            Filter::All
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a timer
    #[command(visible_alias = "a")]
    Add { name: String, duration: String },

    /// List timers
    #[command(visible_alias = "l")]
    List {
        #[command(flatten)]
        view: View,
    },

    /// Pause a timer by its 1-based position, or every active timer
    #[command(visible_alias = "p")]
    Pause {
        #[arg(long, conflicts_with = "index")]
        all: bool,
        #[command(flatten)]
        view: View,
        index: Option<String>,
    },

    /// Resume a paused timer, or every paused timer
    #[command(visible_alias = "r")]
    Resume {
        #[arg(long, conflicts_with = "index")]
        all: bool,
        #[command(flatten)]
        view: View,
        index: Option<String>,
    },

    /// Delete a timer, every finished timer, or everything
    #[command(visible_alias = "d")]
    Delete {
        /// Delete every finished timer
        #[arg(long, conflicts_with_all = ["all", "index"])]
        done: bool,
        /// Delete every timer (asks first)
        #[arg(long, conflicts_with = "index")]
        all: bool,
        /// Skip the confirmation for --all
        #[arg(short, long, requires = "all")]
        yes: bool,
        /// Count the index among running timers
        #[arg(long, conflicts_with = "paused")]
        active: bool,
        /// Count the index among paused timers
        #[arg(long)]
        paused: bool,
        index: Option<String>,
    },

    /// Restart a timer from its full duration. Without an index a view flag
    /// restarts that whole view.
    #[command(visible_alias = "rs")]
    Restart {
        #[arg(long, conflicts_with = "index")]
        all: bool,
        #[command(flatten)]
        view: View,
        index: Option<String>,
    },

    /// Rename a timer, and re-arm it with a new duration if one is given
    #[command(visible_alias = "e")]
    Edit {
        #[command(flatten)]
        view: View,
        index: String,
        name: String,
        duration: Option<String>,
    },
}

// ============================================================================
// Execution
// ============================================================================

/// Loads the timer file, runs `command` and writes the file back if anything changed.
pub fn run<W: Write, R: BufRead>(
    command: Command,
    data_file: &Path,
    now: DateTime<Local>,
    out: &mut W,
    input: &mut R,
) -> Result<()> {
    let mut store = TimerStore::from_timers(storage::load_timers(data_file)?);
    execute(&mut store, command, now, out, input)?;
    if store.is_dirty() {
        storage::save_timers(data_file, store.timers())?;
    }
    Ok(())
}

pub fn execute<W: Write, R: BufRead>(
    store: &mut TimerStore,
    command: Command,
    now: DateTime<Local>,
    out: &mut W,
    input: &mut R,
) -> Result<()> {
    match command {
        Command::Add { name, duration: text } => {
            let span = duration::parse(&text)?;
            let name = name.trim();
            store.add(name, span, now)?;
            info!(name, duration = %duration::format(span), "added timer");
            writeln!(out, "Added timer \"{}\" ({})", name, duration::format(span))?;
        }

        Command::List { view } => list(store, view.filter(), now, out)?,

        Command::Pause { all: true, .. } => {
            let count = bulk::execute(store, BulkAction::PauseAll, now);
            writeln!(out, "Paused {} timer(s)", count)?;
        }
        Command::Pause { view, index, .. } => {
            let i = resolve(store, view.filter(), index.as_deref(), now)?;
            let name = name_at(store, i);
            match store.pause(i, now) {
                Ok(()) => writeln!(out, "Paused timer \"{}\"", name)?,
                Err(TimerError::AlreadyPaused) => writeln!(out, "Timer \"{}\" is already paused", name)?,
                Err(e) => return Err(e.into()),
            }
        }

        Command::Resume { all: true, .. } => {
            let count = bulk::execute(store, BulkAction::ResumeAll, now);
            writeln!(out, "Resumed {} timer(s)", count)?;
        }
        Command::Resume { view, index, .. } => {
            let i = resolve(store, view.filter(), index.as_deref(), now)?;
            let name = name_at(store, i);
            match store.resume(i, now) {
                Ok(()) => writeln!(out, "Resumed timer \"{}\"", name)?,
                Err(TimerError::NotPaused) => writeln!(out, "Timer \"{}\" is already active", name)?,
                Err(e) => return Err(e.into()),
            }
        }

        Command::Delete { done: true, .. } => {
            let count = bulk::execute(store, BulkAction::DeleteDone, now);
            writeln!(out, "Deleted {} completed timer(s)", count)?;
        }
        Command::Delete { all: true, yes, .. } => {
            if yes || confirm("Delete all timers? [y/N]: ", out, input)? {
                let count = bulk::delete_all(store);
                writeln!(out, "Deleted {} timer(s)", count)?;
            } else {
                writeln!(out, "Cancelled")?;
            }
        }
        Command::Delete { active, paused, index, .. } => {
            let view = View { active, paused, done: false };
            let i = resolve(store, view.filter(), index.as_deref(), now)?;
            let removed = store.remove(i)?;
            info!(name = %removed.name, "deleted timer");
            writeln!(out, "Deleted timer \"{}\"", removed.name)?;
        }

        Command::Restart { all: true, .. } => {
            let count = bulk::execute(store, BulkAction::RestartAll, now);
            writeln!(out, "Restarted {} timer(s)", count)?;
        }
        Command::Restart { view, index: None, .. } if view.filter() != Filter::All => {
            let filter = view.filter();
            let count = bulk::restart_matching(store, filter, now);
            writeln!(out, "Restarted {} {} timer(s)", count, filter.label().to_lowercase())?;
        }
        Command::Restart { view, index, .. } => {
            let i = resolve(store, view.filter(), index.as_deref(), now)?;
            store.restart(i, now)?;
            writeln!(out, "Restarted timer \"{}\"", name_at(store, i))?;
        }

        Command::Edit { view, index, name, duration: text } => {
            let i = resolve(store, view.filter(), Some(index.as_str()), now)?;
            let old = name_at(store, i);
            let name = name.trim();
            match text {
                Some(text) => store.edit(i, name, duration::parse(&text)?, now)?,
                None => store.rename(i, name)?,
            }
            info!(from = %old, to = name, "edited timer");
            writeln!(out, "Edited timer: \"{}\" -> \"{}\"", old, name)?;
        }
    }
    Ok(())
}

/// Maps a 1-based position in `filter`'s view to a store index.
fn resolve(store: &TimerStore, filter: Filter, index: Option<&str>, now: DateTime<Local>) -> Result<usize> {
    let raw = index.ok_or_else(|| Error::Usage("a timer index is required".into()))?;
    let position = raw
        .parse::<usize>()
        .ok()
        .filter(|&n| n >= 1)
        .ok_or_else(|| Error::InvalidIndex(raw.into()))?;

    let visible = filter::visible_indices(store, filter, now);
    visible
        .get(position - 1)
        .copied()
        .ok_or(Error::OutOfRange { index: position, shown: visible.len() })
}

fn name_at(store: &TimerStore, index: usize) -> String {
    store.get(index).map(|t| t.name.clone()).unwrap_or_default()
}

fn confirm<W: Write, R: BufRead>(prompt: &str, out: &mut W, input: &mut R) -> Result<bool> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

// ============================================================================
// Listing
// ============================================================================

fn list<W: Write>(store: &TimerStore, filter: Filter, now: DateTime<Local>, out: &mut W) -> Result<()> {
    let timers = filter::visible(store, filter, now);

    writeln!(out, "Countdown Timers")?;
    writeln!(out, "================")?;
    writeln!(out)?;

    if timers.is_empty() {
        writeln!(out, "No timers found.")?;
        return Ok(());
    }

    for (i, timer) in timers.iter().enumerate() {
        let (remaining, end) = list_columns(timer, now);
        let line = format!(
            "[{}] [{}] {:<30} {:<13}",
            i + 1,
            timer.status(now).label(),
            timer.name,
            remaining
        );
        match end {
            Some(end) => writeln!(out, "{} {}", line, end)?,
            None => writeln!(out, "{}", line)?,
        }
    }

    writeln!(out)?;
    writeln!(out, "Showing {} timer(s)", timers.len())?;
    Ok(())
}

fn list_columns(timer: &Timer, now: DateTime<Local>) -> (String, Option<String>) {
    match timer.status(now) {
        Status::Paused => (duration::format(timer.remaining), None),
        Status::Done => {
            let elapsed = timer.duration + until(timer.end, now);
            ("Done".into(), Some(format!("(+{} elapsed)", duration::format(elapsed))))
        }
        Status::Active => (
            duration::format(timer.remaining_at(now)),
            Some(format!("(ends {})", end_time(timer.end, now))),
        ),
    }
}

/// Coarser than the table's end time: dates drop the clock once they leave the month.
fn end_time(end: DateTime<Local>, now: DateTime<Local>) -> String {
    let fmt = if end.year() != now.year() {
        "%Y-%m-%d"
    } else if end.month() != now.month() {
        "%b %-d"
    } else if end.day() != now.day() {
        "%b %-d %H:%M"
    } else {
        "%H:%M:%S"
    };
    end.format(fmt).to_string()
}
