/// Application state management.
///
/// Holds everything the UI reads and writes: the enumerated volumes, the
/// shared settings, the keep-awake session and pending notices. All
/// user-visible transitions go through methods here so they can be
/// exercised without opening a window.
use nosleephd_core::model::VolumeList;
use nosleephd_core::platform::{SystemVolumes, VolumeSource};
use nosleephd_core::{CoreSlot, KeepAwakeSession, SessionError, Settings, SharedSettings};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long a notice stays on screen.
pub const NOTICE_LIFETIME: Duration = Duration::from_secs(3);

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Caution,
    Danger,
}

/// A transient message shown to the user.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
}

pub struct AppState {
    pub view: View,
    pub volumes: VolumeList,
    pub notices: Vec<Notice>,
    settings: SharedSettings,
    /// `None` keeps settings in memory only.
    settings_path: Option<PathBuf>,
    source: Box<dyn VolumeSource>,
    session: KeepAwakeSession,
}

impl AppState {
    /// Load settings from the default location and enumerate the system's
    /// volumes.
    pub fn new() -> Self {
        let settings_path = match Settings::default_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("{e} -- settings will not be saved");
                None
            }
        };
        let settings = settings_path
            .as_deref()
            .map(Settings::load_or_default)
            .unwrap_or_default();
        Self::with_parts(Box::new(SystemVolumes), settings, settings_path)
    }

    /// Build state from explicit collaborators.
    pub fn with_parts(
        source: Box<dyn VolumeSource>,
        settings: Settings,
        settings_path: Option<PathBuf>,
    ) -> Self {
        let settings = settings.shared();
        let session = KeepAwakeSession::new(settings.clone(), CoreSlot::new());
        let mut state = Self {
            view: View::Main,
            volumes: VolumeList::default(),
            notices: Vec::new(),
            settings,
            settings_path,
            source,
            session,
        };
        state.refresh_volumes();
        state
    }

    /// Replace the session, e.g. to share a core slot or tune tick periods.
    pub fn set_session(&mut self, build: impl FnOnce(SharedSettings) -> KeepAwakeSession) {
        self.session.stop();
        self.session = build(self.settings.clone());
    }

    pub fn is_started(&self) -> bool {
        self.session.is_active()
    }

    pub fn is_pulse_enabled(&self) -> bool {
        self.session.is_pulse_enabled()
    }

    /// Running, paused by the active period, and the active period has since
    /// been switched off. The gate no longer touches the pulse in that case,
    /// so it stays paused until the session is restarted.
    pub fn is_paused_without_window(&self) -> bool {
        self.is_started() && !self.is_pulse_enabled() && !self.settings.read().timing_enabled
    }

    /// Copy of the current settings.
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Re-enumerate volumes and re-apply the selection marks.
    pub fn refresh_volumes(&mut self) {
        self.volumes = self.source.enumerate();
        let settings = self.settings.read();
        self.volumes
            .mark_selected(|path| settings.selected_disks.contains(path));
        tracing::info!(
            "Found {} drive(s) and {} mounted folder(s)",
            self.volumes.roots.len(),
            self.volumes.mounted_folders.len()
        );
    }

    /// Select or deselect a volume and persist the selection.
    pub fn set_volume_selected(&mut self, path: &str, selected: bool) {
        self.settings.write().selected_disks.set(path, selected);
        for volume in self
            .volumes
            .roots
            .iter_mut()
            .chain(self.volumes.mounted_folders.iter_mut())
            .filter(|v| v.path == path)
        {
            volume.selected = selected;
        }
        self.save_settings();
    }

    /// Replace all settings and persist them. Takes effect on the next
    /// scheduler tick.
    pub fn apply_settings(&mut self, settings: Settings) {
        *self.settings.write() = settings;
        self.volumes
            .mark_selected(|path| self.settings.read().selected_disks.contains(path));
        self.save_settings();
    }

    /// The start/stop button.
    pub fn toggle(&mut self) {
        if self.is_started() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn start(&mut self) {
        match self.session.start() {
            Ok(_) => {}
            Err(SessionError::NoVolumesSelected) => {
                self.notify(NoticeLevel::Caution, "You have not selected any HDD.");
            }
            Err(e) => {
                tracing::warn!("Failed to start keep-awake: {e}");
                self.notify(
                    NoticeLevel::Danger,
                    &format!("Failed to start keep-awake: {e}"),
                );
            }
        }
    }

    pub fn stop(&mut self) {
        self.session.stop();
    }

    /// Drop notices older than [`NOTICE_LIFETIME`].
    pub fn expire_notices(&mut self, now: Instant) {
        self.notices
            .retain(|n| now.saturating_duration_since(n.shown_at) < NOTICE_LIFETIME);
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notices.push(Notice {
            level,
            title: "Warning".to_owned(),
            message: message.to_owned(),
            shown_at: Instant::now(),
        });
    }

    fn save_settings(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.read().save(path) {
            tracing::warn!("Could not save settings: {e}");
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
