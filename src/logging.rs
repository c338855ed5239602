use std::{
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "RCOUNTDOWN_LOG";

/// Where log records go. The TUI owns the terminal, so it logs to a file.
pub enum Sink {
    File(PathBuf),
    Stderr,
}

fn default_directive(sink: &Sink, verbose: bool) -> &'static str {
    match (sink, verbose) {
        (_, true) => "rcountdown=debug",
        (Sink::File(_), false) => "rcountdown=info",
        (Sink::Stderr, false) => "rcountdown=warn",
    }
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init(sink: Sink, verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&sink, verbose)));

    match sink {
        Sink::File(path) => {
            let file = path
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
            match file {
                Ok(file) => {
                    let _ = tracing_subscriber::fmt()
                        .with_env_filter(filter)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file))
                        .try_init();
                }
                Err(_) => {
                    let _ = tracing_subscriber::fmt()
                        .with_env_filter(filter)
                        .with_writer(io::sink)
                        .try_init();
                }
            }
        }
        Sink::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .without_time()
                .with_writer(io::stderr)
                .try_init();
        }
    }
}
