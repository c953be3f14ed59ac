/// Marker-file lifecycle on a single volume.
///
/// One small file with a fixed name lives at the root of every selected
/// volume while a session is active. A pulse only rewrites its last-access
/// timestamp, which is enough metadata I/O to reset a drive's idle timer
/// without touching file data.
use crate::error::MarkerError;
use std::fs::{self, FileTimes, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Text written into every marker file.
pub const MARKER_CONTENT: &str = "This file is maintained by NoSleepHD to keep this disk from \
spinning down.\r\nIt is removed automatically when NoSleepHD stops. It is safe to delete.\r\n";

/// Creates, touches and deletes marker files of one fixed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFiles {
    file_name: String,
}

impl MarkerFiles {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Full marker path for `volume`.
    pub fn path_for(&self, volume: &Path) -> PathBuf {
        volume.join(&self.file_name)
    }

    /// Write the marker file at the root of `volume`, replacing any stale one.
    pub fn create(&self, volume: &Path) -> Result<PathBuf, MarkerError> {
        let path = self.path_for(volume);
        fs::write(&path, MARKER_CONTENT).map_err(|source| MarkerError {
            path: path.clone(),
            source,
        })?;
        debug!("Created marker {}", path.display());
        Ok(path)
    }

    /// Set the marker's last-access time to now.
    ///
    /// Returns `Ok(false)` without error when the volume or the marker is
    /// gone; drives may be unplugged at any time.
    pub fn touch(&self, volume: &Path) -> Result<bool, MarkerError> {
        if !volume.is_dir() {
            return Ok(false);
        }
        let path = self.path_for(volume);
        let file = match OpenOptions::new().write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(source) => return Err(MarkerError { path, source }),
        };
        file.set_times(FileTimes::new().set_accessed(SystemTime::now()))
            .map_err(|source| MarkerError { path, source })?;
        Ok(true)
    }

    /// Remove the marker from `volume`. A missing marker is not an error.
    ///
    /// Returns whether a file was actually removed.
    pub fn delete(&self, volume: &Path) -> Result<bool, MarkerError> {
        let path = self.path_for(volume);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted marker {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(MarkerError { path, source }),
        }
    }
}
