/// NoSleepHD GUI -- egui-based desktop frontend.
///
/// This crate contains all UI code. Engine logic lives in `nosleephd-core`.
pub mod app;
pub mod state;

pub use app::{NoSleepApp, NoSleepState};
