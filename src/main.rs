//! NoSleepHD -- keeps spinning hard disks from going to sleep.
//!
//! Thin binary entry point. All logic lives in the `nosleephd-core`
//! and `nosleephd-gui` crates.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("NoSleepHD starting");

    // Enumerate volumes and load settings before the window opens so the
    // first frame is already populated.
    let state = nosleephd_gui::NoSleepState::build();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("NoSleepHD")
            .with_inner_size([520.0, 480.0])
            .with_min_inner_size([380.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NoSleepHD",
        options,
        Box::new(|cc| Ok(Box::new(nosleephd_gui::NoSleepApp::with_state(cc, state)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
