/// User settings -- selected volumes, pulse interval and active window.
///
/// Stored as JSON under the per-user configuration directory. The GUI
/// writes through a [`SharedSettings`] handle; the scheduler thread takes
/// a snapshot at every tick, so a change becomes visible on the next tick
/// without any further coordination.
use crate::error::ConfigError;
use crate::model::{SelectionSet, TimeWindow};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default name of the marker file written to each volume root.
pub const DEFAULT_MARKER_FILE_NAME: &str = "NoSleepHD.txt";

/// Default pulse interval in seconds.
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;

/// Settings handle shared between the UI and the scheduler thread.
pub type SharedSettings = Arc<RwLock<Settings>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub selected_disks: SelectionSet,
    pub marker_file_name: String,
    pub interval_seconds: u64,
    pub timing_enabled: bool,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_disks: SelectionSet::new(),
            marker_file_name: DEFAULT_MARKER_FILE_NAME.to_owned(),
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
            timing_enabled: false,
            start_hour: 0,
            start_minute: 0,
            end_hour: 0,
            end_minute: 0,
        }
    }
}

impl Settings {
    /// Wrap into a [`SharedSettings`] handle.
    pub fn shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }

    /// Pulse period. Never shorter than one second.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }

    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::from_hm(
            self.start_hour,
            self.start_minute,
            self.end_hour,
            self.end_minute,
        )
    }

    /// `<config dir>/NoSleepHD/settings.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("NoSleepHD").join("settings.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read settings from `path`.
    ///
    /// A missing file yields defaults. Any other failure is returned so the
    /// caller can decide whether to fall back.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`Settings::load`], but logs and falls back to defaults on error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Could not load settings: {e} -- using defaults");
            Self::default()
        })
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }
}
