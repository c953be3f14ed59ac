/// Keep-awake session -- the start/stop contract used by the front end.
///
/// Starting writes a marker file on every selected volume, claims the
/// keep-awake core and launches the [`PulseScheduler`]. Stopping undoes all
/// three. Both operations are idempotent.
use crate::config::SharedSettings;
use crate::error::SessionError;
use crate::marker::MarkerFiles;
use crate::scheduler::{Clock, PulseScheduler, SchedulerOptions, SystemClock};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Exclusive keep-awake core. Only one session per slot can be active.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct CoreSlot(Arc<AtomicBool>);

impl CoreSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct KeepAwakeSession {
    settings: SharedSettings,
    slot: CoreSlot,
    clock: Arc<dyn Clock>,
    options: SchedulerOptions,

    active: bool,
    holds_slot: bool,
    scheduler: Option<PulseScheduler>,
    /// Marker name and volumes captured at start; stop cleans up exactly these.
    markers: Option<MarkerFiles>,
    volumes: Vec<PathBuf>,
}

impl KeepAwakeSession {
    pub fn new(settings: SharedSettings, slot: CoreSlot) -> Self {
        Self {
            settings,
            slot,
            clock: Arc::new(SystemClock),
            options: SchedulerOptions::default(),
            active: false,
            holds_slot: false,
            scheduler: None,
            markers: None,
            volumes: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the scheduler is currently allowed to pulse. `false` when
    /// the session is not running.
    pub fn is_pulse_enabled(&self) -> bool {
        self.scheduler
            .as_ref()
            .is_some_and(PulseScheduler::is_pulse_enabled)
    }

    /// Start using the selection currently stored in settings.
    pub fn start(&mut self) -> Result<bool, SessionError> {
        if self.active {
            return Ok(true);
        }
        let selected = self.settings.read().selected_disks.to_vec();
        self.start_with(selected)
    }

    /// Start on an explicit list of volume paths.
    ///
    /// Marker creation failures are logged and do not prevent the start.
    /// If the core is held elsewhere nothing is written. If the scheduler
    /// cannot be spawned, every marker created here is removed again
    /// before the error is returned.
    pub fn start_with<I, S>(&mut self, volumes: I) -> Result<bool, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.active {
            return Ok(true);
        }
        let volumes: Vec<PathBuf> = volumes
            .into_iter()
            .map(|v| PathBuf::from(v.as_ref()))
            .collect();
        if volumes.is_empty() {
            return Err(SessionError::NoVolumesSelected);
        }

        // Claim the core before writing anything; markers on a shared volume
        // may belong to the session that holds it.
        if !self.slot.try_acquire() {
            warn!("Keep-awake core is already in use");
            return Err(SessionError::CoreUnavailable);
        }
        self.holds_slot = true;

        let markers = MarkerFiles::new(self.settings.read().marker_file_name.clone());
        self.volumes = volumes;

        let mut created = 0usize;
        for volume in &self.volumes {
            match markers.create(volume) {
                Ok(_) => created += 1,
                Err(e) => warn!("Could not create marker: {e}"),
            }
        }
        self.markers = Some(markers.clone());

        let scheduler = match PulseScheduler::start(
            Arc::clone(&self.settings),
            markers,
            Arc::clone(&self.clock),
            self.options,
        ) {
            Ok(scheduler) => scheduler,
            Err(e) => {
                warn!("Could not start pulse scheduler: {e} -- rolling back");
                self.stop();
                return Err(SessionError::SchedulerSpawn(e));
            }
        };
        self.scheduler = Some(scheduler);
        self.active = true;

        info!(
            "Keep-awake started on {} volume(s), {created} marker(s) created",
            self.volumes.len()
        );
        Ok(true)
    }

    /// Stop pulsing and remove the markers written at start. Errors while
    /// deleting are logged and skipped.
    pub fn stop(&mut self) {
        if !self.active && !self.holds_slot && self.markers.is_none() {
            return;
        }

        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }

        if let Some(markers) = self.markers.take() {
            for volume in &self.volumes {
                delete_marker(&markers, volume);
            }
        }
        self.volumes.clear();

        if self.holds_slot {
            self.slot.release();
            self.holds_slot = false;
        }

        if self.active {
            self.active = false;
            info!("Keep-awake stopped");
        }
    }
}

fn delete_marker(markers: &MarkerFiles, volume: &Path) {
    if let Err(e) = markers.delete(volume) {
        warn!("Could not delete marker: {e}");
    }
}

impl Drop for KeepAwakeSession {
    fn drop(&mut self) {
        self.stop();
    }
}
