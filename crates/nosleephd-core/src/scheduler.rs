/// Pulse scheduler -- two independent periodic tasks on one worker thread.
///
/// - **Pulse tick** (user interval): touches the marker file on every
///   currently selected volume, but only while the pulse is enabled.
/// - **Gate tick** (fixed cadence): evaluates the active-period window and
///   flips the pulse's enabled flag. With timing turned off in settings it
///   leaves the flag alone.
///
/// Settings are snapshotted at the start of every tick. The worker only
/// suspends between ticks, so [`PulseScheduler::stop`] lets an in-flight
/// tick finish and guarantees no tick starts afterwards.
use crate::config::{Settings, SharedSettings};
use crate::marker::MarkerFiles;
use chrono::NaiveTime;
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// How often the active-period window is re-evaluated.
pub const GATE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Source of the current local time-of-day.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// Tick periods. Defaults suit production use.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    pub gate_interval: Duration,
    /// Replaces the interval from settings when set.
    pub pulse_interval: Option<Duration>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            gate_interval: GATE_POLL_INTERVAL,
            pulse_interval: None,
        }
    }
}

impl SchedulerOptions {
    fn pulse_interval_for(&self, settings: &Settings) -> Duration {
        self.pulse_interval.unwrap_or_else(|| settings.interval())
    }
}

/// State shared between the handle and the worker thread.
#[derive(Debug)]
struct Shared {
    pulse_enabled: AtomicBool,
    pulses: AtomicU64,
}

/// Handle to a running scheduler. Dropping it stops the worker.
pub struct PulseScheduler {
    stop_tx: Option<Sender<()>>,
    shared: Arc<Shared>,
    thread: Option<thread::JoinHandle<()>>,
}

impl PulseScheduler {
    /// Spawn the worker thread. The pulse starts out enabled.
    pub fn start(
        settings: SharedSettings,
        markers: MarkerFiles,
        clock: Arc<dyn Clock>,
        options: SchedulerOptions,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let shared = Arc::new(Shared {
            pulse_enabled: AtomicBool::new(true),
            pulses: AtomicU64::new(0),
        });

        let worker = Worker {
            settings,
            markers,
            clock,
            options,
            shared: Arc::clone(&shared),
        };
        let thread = thread::Builder::new()
            .name("nosleephd-pulse".to_owned())
            .spawn(move || worker.run(stop_rx))?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            shared,
            thread: Some(thread),
        })
    }

    /// Whether pulse ticks currently touch marker files.
    pub fn is_pulse_enabled(&self) -> bool {
        self.shared.pulse_enabled.load(Ordering::Relaxed)
    }

    /// Number of pulse ticks that ran while enabled.
    pub fn pulse_count(&self) -> u64 {
        self.shared.pulses.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Stop both timers and wait for the worker to exit. Idempotent.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::warn!("Pulse worker panicked");
            }
        }
    }
}

impl Drop for PulseScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Touch the marker on each of `volumes`.
///
/// Per-volume failures are logged and skipped. Returns the number of
/// markers actually touched.
pub fn pulse<'a>(markers: &MarkerFiles, volumes: impl IntoIterator<Item = &'a str>) -> usize {
    let mut touched = 0;
    for volume in volumes {
        match markers.touch(Path::new(volume)) {
            Ok(true) => touched += 1,
            Ok(false) => {}
            Err(e) => debug!("Pulse skipped {volume}: {e}"),
        }
    }
    touched
}

// ─── Background thread ──────────────────────────────────────────────────────

struct Worker {
    settings: SharedSettings,
    markers: MarkerFiles,
    clock: Arc<dyn Clock>,
    options: SchedulerOptions,
    shared: Arc<Shared>,
}

impl Worker {
    fn run(self, stop_rx: Receiver<()>) {
        let initial = self.settings.read().clone();
        let mut pulse_every = self.options.pulse_interval_for(&initial);
        let mut pulse_rx = tick(pulse_every);
        let gate_rx = tick(self.options.gate_interval);

        info!(
            "Pulse scheduler started (interval {:?}, gate every {:?})",
            pulse_every, self.options.gate_interval
        );
        self.gate(&initial);

        loop {
            let mut retune = None;
            select! {
                recv(stop_rx) -> _ => break,
                recv(pulse_rx) -> _ => {
                    let snapshot = self.settings.read().clone();
                    self.pulse(&snapshot);
                    let wanted = self.options.pulse_interval_for(&snapshot);
                    if wanted != pulse_every {
                        retune = Some(wanted);
                    }
                }
                recv(gate_rx) -> _ => {
                    let snapshot = self.settings.read().clone();
                    self.gate(&snapshot);
                }
            }
            if let Some(every) = retune {
                debug!("Pulse interval changed to {every:?}");
                pulse_every = every;
                pulse_rx = tick(every);
            }
        }

        info!("Pulse scheduler stopped");
    }

    fn pulse(&self, snapshot: &Settings) {
        if !self.shared.pulse_enabled.load(Ordering::Relaxed) {
            return;
        }
        let touched = pulse(&self.markers, snapshot.selected_disks.iter());
        self.shared.pulses.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Pulse touched {touched}/{} markers",
            snapshot.selected_disks.len()
        );
    }

    fn gate(&self, snapshot: &Settings) {
        if !snapshot.timing_enabled {
            return;
        }
        let previous = self.shared.pulse_enabled.load(Ordering::Relaxed);
        let next = snapshot
            .time_window()
            .evaluate(self.clock.now(), previous);
        if next != previous {
            self.shared.pulse_enabled.store(next, Ordering::Relaxed);
            info!(
                "Pulse {} by active-period window",
                if next { "enabled" } else { "paused" }
            );
        }
    }
}
