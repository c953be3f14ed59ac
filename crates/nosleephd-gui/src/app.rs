/// Main `eframe::App` implementation for NoSleepHD.
///
/// Two screens: the volume list with the start/stop switch, and the
/// settings page.
use crate::state::{AppState, NoticeLevel, View};
use nosleephd_core::model::{Volume, VolumeKind};
use std::time::{Duration, Instant};

/// Pre-built application state.
///
/// Construct this **before** calling `eframe::run_native` so volume
/// enumeration and settings loading finish before the window opens.
pub struct NoSleepState {
    pub(crate) inner: AppState,
}

impl NoSleepState {
    pub fn build() -> Self {
        Self {
            inner: AppState::new(),
        }
    }
}

/// The NoSleepHD application.
pub struct NoSleepApp {
    state: AppState,
}

impl NoSleepApp {
    pub fn with_state(cc: &eframe::CreationContext<'_>, state: NoSleepState) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self { state: state.inner }
    }
}

impl eframe::App for NoSleepApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.expire_notices(Instant::now());
        if !self.state.notices.is_empty() || self.state.is_started() {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::TopBottomPanel::top("toolbar")
            .min_height(36.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                toolbar(ui, &mut self.state);
                ui.add_space(4.0);
            });

        if !self.state.notices.is_empty() {
            egui::TopBottomPanel::bottom("notices").show(ctx, |ui| notices(ui, &self.state));
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Main => volume_list(ui, &mut self.state),
            View::Settings => settings_page(ui, &mut self.state),
        });
    }
}

fn toolbar(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        let label = if state.is_started() { "■ Stop" } else { "▶ Start" };
        if ui.button(label).clicked() {
            state.toggle();
        }

        let status = match (state.is_started(), state.is_pulse_enabled()) {
            (false, _) => "Idle",
            (true, true) => "Keeping disks awake",
            (true, false) => "Paused outside active period",
        };
        ui.label(status);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match state.view {
                View::Main => {
                    if ui.button("⚙ Settings").clicked() {
                        state.view = View::Settings;
                    }
                    if ui.button("⟳ Refresh").clicked() {
                        state.refresh_volumes();
                    }
                }
                View::Settings => {
                    if ui.button("⬅ Back").clicked() {
                        state.view = View::Main;
                    }
                }
            }
        });
    });
}

fn volume_list(ui: &mut egui::Ui, state: &mut AppState) {
    if state.volumes.is_empty() {
        ui.label("No fixed disks found.");
        return;
    }

    // Collect toggles first; the list is borrowed while drawing.
    let mut toggled: Vec<(String, bool)> = Vec::new();
    let locked = state.is_started();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (kind, group) in [
            (VolumeKind::RootVolume, &state.volumes.roots),
            (VolumeKind::MountedFolder, &state.volumes.mounted_folders),
        ] {
            if group.is_empty() {
                continue;
            }
            ui.heading(kind.label());
            ui.add_space(4.0);
            for volume in group {
                if let Some(change) = volume_row(ui, volume, locked) {
                    toggled.push(change);
                }
            }
            ui.add_space(8.0);
        }
    });

    for (path, selected) in toggled {
        state.set_volume_selected(&path, selected);
    }
}

fn volume_row(ui: &mut egui::Ui, volume: &Volume, locked: bool) -> Option<(String, bool)> {
    let mut selected = volume.selected;
    let response = ui.add_enabled(!locked, egui::Checkbox::new(&mut selected, &volume.path));
    response
        .changed()
        .then(|| (volume.path.clone(), selected))
}

fn settings_page(ui: &mut egui::Ui, state: &mut AppState) {
    let before = state.settings();
    let mut draft = before.clone();

    egui::Grid::new("settings_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Interval");
            ui.add(
                egui::DragValue::new(&mut draft.interval_seconds)
                    .range(1..=86_400)
                    .suffix(" s"),
            );
            ui.end_row();

            ui.label("Marker file");
            ui.label(&draft.marker_file_name);
            ui.end_row();

            ui.label("Active period");
            ui.checkbox(&mut draft.timing_enabled, "Only keep disks awake between");
            ui.end_row();

            ui.label("From");
            ui.add_enabled_ui(draft.timing_enabled, |ui| {
                time_picker(ui, "start", &mut draft.start_hour, &mut draft.start_minute);
            });
            ui.end_row();

            ui.label("To");
            ui.add_enabled_ui(draft.timing_enabled, |ui| {
                time_picker(ui, "end", &mut draft.end_hour, &mut draft.end_minute);
            });
            ui.end_row();
        });

    if draft.timing_enabled && !draft.time_window().is_restricted() {
        ui.add_space(6.0);
        ui.weak("Start and end are equal -- the active period has no effect.");
    }

    if state.is_paused_without_window() {
        ui.add_space(6.0);
        ui.weak("The pulse was paused by the active period and stays paused until keep-awake is restarted.");
    }

    if draft != before {
        state.apply_settings(draft);
    }
}

fn time_picker(ui: &mut egui::Ui, id: &str, hour: &mut u32, minute: &mut u32) {
    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt(format!("{id}_hour"))
            .width(48.0)
            .selected_text(format!("{hour:02}"))
            .show_ui(ui, |ui| {
                for h in 0..24 {
                    ui.selectable_value(hour, h, format!("{h:02}"));
                }
            });
        ui.label(":");
        egui::ComboBox::from_id_salt(format!("{id}_minute"))
            .width(48.0)
            .selected_text(format!("{minute:02}"))
            .show_ui(ui, |ui| {
                for m in 0..60 {
                    ui.selectable_value(minute, m, format!("{m:02}"));
                }
            });
    });
}

fn notices(ui: &mut egui::Ui, state: &AppState) {
    for notice in &state.notices {
        let colour = match notice.level {
            NoticeLevel::Caution => egui::Color32::from_rgb(0xf9, 0xe2, 0xaf),
            NoticeLevel::Danger => egui::Color32::from_rgb(0xf3, 0x8b, 0xa8),
        };
        ui.horizontal(|ui| {
            ui.colored_label(colour, egui::RichText::new(&notice.title).strong());
            ui.label(&notice.message);
        });
    }
}
