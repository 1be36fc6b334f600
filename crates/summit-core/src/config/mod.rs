//! Tracker configuration.
//!
//! `Config` is read from a JSON file; every field is optional and falls back to
//! the defaults below. Scheduling constants live in [`timing`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::game::layout;
use crate::signature::Signature;

/// Scheduling defaults.
pub mod timing {
    use std::time::Duration;

    /// How often a lost or missing process is looked for again.
    pub const HOOK_INTERVAL: Duration = Duration::from_secs(5);

    /// Snapshot polling period, roughly once per frame at 60 Hz.
    pub const TICK_INTERVAL: Duration = Duration::from_millis(16);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub process_name: String,
    pub hook_interval_ms: u64,
    pub tick_interval_ms: u64,
    /// Directory receiving `Session_*.csv` snapshots
    pub session_dir: PathBuf,
    pub save_sessions: bool,
    /// Code signature locating the game object; override when the game updates
    pub signature: Signature,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            process_name: layout::PROCESS_NAME.to_string(),
            hook_interval_ms: timing::HOOK_INTERVAL.as_millis() as u64,
            tick_interval_ms: timing::TICK_INTERVAL.as_millis() as u64,
            session_dir: PathBuf::from("sessions"),
            save_sessions: true,
            signature: layout::signature(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| Error::ConfigParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.process_name.trim().is_empty() {
            return Err(Error::ConfigParseError(
                "process_name must not be empty".to_string(),
            ));
        }
        if self.hook_interval_ms == 0 || self.tick_interval_ms == 0 {
            return Err(Error::ConfigParseError(
                "intervals must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn hook_interval(&self) -> Duration {
        Duration::from_millis(self.hook_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
