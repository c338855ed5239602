use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::timer::Timer;

const APP_DIR: &str = "rcountdown";
const DATA_FILE: &str = "timers.json";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "rcountdown.log";

#[derive(Deserialize)]
struct SaveData {
    #[serde(default)]
    timers: Vec<Timer>,
}

#[derive(Serialize)]
struct SaveDataRef<'a> {
    timers: &'a [Timer],
}

// ============================================================================
// Locations
// ============================================================================

pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_data_file() -> PathBuf {
    app_dir().join(DATA_FILE)
}

pub fn default_config_file() -> PathBuf {
    app_dir().join(CONFIG_FILE)
}

pub fn log_file() -> PathBuf {
    app_dir().join(LOG_FILE)
}

// ============================================================================
// Reading & Writing
// ============================================================================

/// Loads the persisted timers. A missing file is an empty list.
pub fn load_timers(path: &Path) -> Result<Vec<Timer>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(Error::Io { path: path.into(), source }),
    };

    let data: SaveData = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.into(),
        source,
    })?;
    debug!(count = data.timers.len(), path = %path.display(), "loaded timers");
    Ok(data.timers)
}

pub fn save_timers(path: &Path, timers: &[Timer]) -> Result<()> {
    save_json(path, &SaveDataRef { timers }).map_err(|source| Error::Io {
        path: path.into(),
        source,
    })?;
    debug!(count = timers.len(), path = %path.display(), "saved timers");
    Ok(())
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(data)?)
}

/// Modification time of `path`, if it exists.
pub fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
