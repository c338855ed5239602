use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::storage;

const DEFAULT_STEP: u32 = 1;
const DEFAULT_SHIFT_STEP: u32 = 5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdjustUnit {
    #[default]
    Smart,
    Seconds,
    Minutes,
    Hours,
}

/// Controls how the duration field reacts to the increase/decrease keys.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdjustConfig {
    pub unit: AdjustUnit,
    pub increment_step: u32,
    pub shift_increment_step: u32,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            unit: AdjustUnit::Smart,
            increment_step: DEFAULT_STEP,
            shift_increment_step: DEFAULT_SHIFT_STEP,
        }
    }
}

impl AdjustConfig {
    /// Reads each field on its own; a missing or invalid field keeps its default.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(text)?;
        let mut config = Self::default();

        match raw.get("unit").map(AdjustUnit::deserialize) {
            Some(Ok(unit)) => config.unit = unit,
            Some(Err(e)) => warn!("config: invalid unit ({}), using smart", e),
            None => {}
        }
        if let Some(step) = positive(&raw, "incrementStep") {
            config.increment_step = step;
        }
        if let Some(step) = positive(&raw, "shiftIncrementStep") {
            config.shift_increment_step = step;
        }

        Ok(config)
    }

    /// Loads the config file, writing a default one when none exists.
    /// Never fails: problems are logged and defaults used.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                if let Err(e) = storage::save_json(path, &config) {
                    warn!("could not create default config at {}: {}", path.display(), e);
                }
                return config;
            }
            Err(e) => {
                warn!("could not read config {}: {}, using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json(&text) {
            Ok(config) => {
                debug!(?config, "loaded adjustment config");
                config
            }
            Err(e) => {
                warn!("malformed config file {}, using defaults: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

fn positive(raw: &Value, key: &str) -> Option<u32> {
    let value = raw.get(key)?;
    let step = value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok());
    if step.is_none() {
        warn!("config: invalid {} ({}), using default", key, value);
    }
    step
}
