/// NoSleepHD Core -- keeps spinning disks awake.
///
/// This crate contains all engine logic with zero UI dependencies.
///
/// # Modules
///
/// - [`model`] -- Volumes, selection set, and the active-period window.
/// - [`platform`] -- Fixed-disk volume enumeration.
/// - [`marker`] -- Per-volume marker-file create/touch/delete.
/// - [`scheduler`] -- Background pulse and gate ticks.
/// - [`session`] -- The start/stop contract exposed to front ends.
/// - [`config`] -- Persisted user settings.
pub mod config;
pub mod error;
pub mod marker;
pub mod model;
pub mod platform;
pub mod scheduler;
pub mod session;

pub use config::{Settings, SharedSettings};
pub use error::{ConfigError, MarkerError, SessionError};
pub use session::{CoreSlot, KeepAwakeSession};
