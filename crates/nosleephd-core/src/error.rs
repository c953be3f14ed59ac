/// Error types for the keep-awake engine.
///
/// Only [`SessionError`] is meant to reach the user. [`MarkerError`] is
/// returned per volume so callers can log it, but batch operations never
/// stop on one.
use std::io;
use std::path::PathBuf;

/// A marker-file operation failed on one volume.
#[derive(Debug, thiserror::Error)]
#[error("marker file {path}: {source}")]
pub struct MarkerError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Reasons a keep-awake session could not be started.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no volumes are selected")]
    NoVolumesSelected,
    #[error("the keep-awake core is already held by another session")]
    CoreUnavailable,
    #[error("failed to spawn the pulse scheduler: {0}")]
    SchedulerSpawn(#[source] io::Error),
}

/// Settings could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("settings I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no per-user configuration directory is available")]
    NoConfigDir,
}
