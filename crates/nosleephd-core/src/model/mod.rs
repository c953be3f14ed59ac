/// Data model for the keep-awake engine.
///
/// Volumes and their classification, the user's selection, and the
/// active-period window.
pub mod selection;
pub mod volume;
pub mod window;

pub use selection::SelectionSet;
pub use volume::{classify, Volume, VolumeKind, VolumeList};
pub use window::{is_active, TimeWindow};
