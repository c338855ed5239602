//! Countdown timers for the terminal: a modal TUI and a scriptable CLI over
//! the same timer file.

pub mod adjust;
pub mod app;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod filter;
pub mod logging;
pub mod notify;
pub mod popup;
pub mod storage;
pub mod store;
pub mod timer;
pub mod ui;

pub use error::{Error, Result};
