/// End-to-end keep-awake session tests.
///
/// Each `TempDir` stands in for a volume root, so marker files are really
/// written, touched and deleted on disk. The scheduler runs with short
/// tick periods so the suite stays fast.
use nosleephd_core::marker::MarkerFiles;
use chrono::NaiveTime;
use nosleephd_core::scheduler::{Clock, SchedulerOptions};
use nosleephd_core::{CoreSlot, KeepAwakeSession, SessionError, Settings, SharedSettings};
use std::fs::{self, FileTimes};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

const MARKER: &str = "NoSleepHD.txt";

// ── Helpers ──────────────────────────────────────────────────────────────────

fn settings_for(volumes: &[&TempDir]) -> SharedSettings {
    let mut settings = Settings::default();
    for v in volumes {
        settings.selected_disks.insert(path_str(v.path()));
    }
    settings.shared()
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn fast_session(settings: SharedSettings, slot: CoreSlot) -> KeepAwakeSession {
    KeepAwakeSession::new(settings, slot).with_options(SchedulerOptions {
        gate_interval: Duration::from_millis(10),
        pulse_interval: Some(Duration::from_millis(10)),
    })
}

/// A clock stopped at one time of day.
struct StoppedClock(NaiveTime);

impl Clock for StoppedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

fn windowed_settings(volume: &TempDir) -> SharedSettings {
    let settings = settings_for(&[volume]);
    {
        let mut s = settings.write();
        s.timing_enabled = true;
        s.start_hour = 8;
        s.end_hour = 18;
    }
    settings
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

fn marker_count(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name() == MARKER)
        .count()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Start creates one marker per volume; stop removes them all.
#[test]
fn start_then_stop_leaves_no_markers() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let mut session = fast_session(settings_for(&[&a, &b]), CoreSlot::new());

    assert!(session.start().unwrap());
    assert!(session.is_active());
    assert_eq!(marker_count(a.path()), 1);
    assert_eq!(marker_count(b.path()), 1);

    session.stop();
    assert!(!session.is_active());
    assert_eq!(marker_count(a.path()), 0);
    assert_eq!(marker_count(b.path()), 0);
}

/// A second start is a no-op and does not duplicate markers.
#[test]
fn double_start_is_idempotent() {
    let a = TempDir::new().unwrap();
    let mut session = fast_session(settings_for(&[&a]), CoreSlot::new());

    assert!(session.start().unwrap());
    assert!(session.start().unwrap());
    assert_eq!(marker_count(a.path()), 1);
    assert_eq!(fs::read_dir(a.path()).unwrap().count(), 1);
}

/// A second stop, or a stop without a start, does nothing.
#[test]
fn double_stop_is_idempotent() {
    let a = TempDir::new().unwrap();
    let slot = CoreSlot::new();
    let mut session = fast_session(settings_for(&[&a]), slot.clone());

    session.stop();
    session.start().unwrap();
    session.stop();
    session.stop();
    assert!(!session.is_active());
    assert!(!slot.is_held());
}

/// An unreachable volume does not keep the others from getting markers.
#[test]
fn unreachable_volume_does_not_block_start() {
    let a = TempDir::new().unwrap();
    let gone = a.path().join("unplugged");
    let b = TempDir::new().unwrap();

    let mut session = fast_session(Settings::default().shared(), CoreSlot::new());
    let volumes = vec![path_str(a.path()), path_str(&gone), path_str(b.path())];
    assert!(session.start_with(&volumes).unwrap());

    assert!(session.is_active());
    assert_eq!(marker_count(a.path()), 1);
    assert_eq!(marker_count(b.path()), 1);
    assert!(!gone.exists());
}

/// Starting with nothing selected fails before touching the filesystem.
#[test]
fn start_without_selection_fails() {
    let mut session = fast_session(Settings::default().shared(), CoreSlot::new());
    assert!(matches!(
        session.start(),
        Err(SessionError::NoVolumesSelected)
    ));
    assert!(!session.is_active());
}

/// If the core is already held, the attempt writes nothing and leaves the
/// running session's markers alone, even on a shared volume.
#[test]
fn core_unavailable_keeps_running_session_markers() {
    let shared = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let slot = CoreSlot::new();

    let mut first = fast_session(settings_for(&[&shared]), slot.clone());
    first.start().unwrap();
    assert!(slot.is_held());

    let mut second = fast_session(settings_for(&[&shared, &b]), slot.clone());
    assert!(matches!(second.start(), Err(SessionError::CoreUnavailable)));
    assert!(!second.is_active());
    assert_eq!(marker_count(b.path()), 0);

    // The running session still owns its marker and keeps pulsing it.
    assert!(first.is_active());
    assert_eq!(marker_count(shared.path()), 1);
    assert!(slot.is_held());

    // A failed attempt has nothing to clean up when it is dropped.
    drop(second);
    assert_eq!(marker_count(shared.path()), 1);

    first.stop();
    assert!(!slot.is_held());
    assert_eq!(marker_count(shared.path()), 0);

    let mut third = fast_session(settings_for(&[&shared, &b]), slot.clone());
    assert!(third.start().unwrap());
    assert_eq!(marker_count(shared.path()), 1);
    assert_eq!(marker_count(b.path()), 1);
}

/// While active, pulses keep refreshing the marker's access time.
#[test]
fn pulse_refreshes_access_time() {
    let a = TempDir::new().unwrap();
    let mut session = fast_session(settings_for(&[&a]), CoreSlot::new());
    session.start().unwrap();

    let marker = MarkerFiles::new(MARKER).path_for(a.path());
    let old = SystemTime::now() - Duration::from_secs(3_600);
    fs::File::options()
        .write(true)
        .open(&marker)
        .unwrap()
        .set_times(FileTimes::new().set_accessed(old))
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let accessed = fs::metadata(&marker).unwrap().accessed().unwrap();
        if accessed > old + Duration::from_secs(60) {
            break;
        }
        assert!(Instant::now() < deadline, "marker was never touched");
        std::thread::sleep(Duration::from_millis(10));
    }
    session.stop();
}

/// Stop removes markers for the volumes captured at start, even if the
/// selection changed in the meantime.
#[test]
fn stop_uses_volumes_captured_at_start() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let settings = settings_for(&[&a]);
    let mut session = fast_session(settings.clone(), CoreSlot::new());
    session.start().unwrap();

    {
        let mut s = settings.write();
        s.selected_disks.remove(&path_str(a.path()));
        s.selected_disks.insert(path_str(b.path()));
    }
    session.stop();
    assert_eq!(marker_count(a.path()), 0);
}

/// Dropping an active session cleans up like `stop`.
#[test]
fn drop_stops_session() {
    let a = TempDir::new().unwrap();
    let slot = CoreSlot::new();
    {
        let mut session = fast_session(settings_for(&[&a]), slot.clone());
        session.start().unwrap();
        assert_eq!(marker_count(a.path()), 1);
    }
    assert_eq!(marker_count(a.path()), 0);
    assert!(!slot.is_held());
}

/// Outside the active period the session stays active with its marker in
/// place, but the pulse is paused.
#[test]
fn session_pauses_pulse_outside_active_period() {
    let a = TempDir::new().unwrap();
    let evening = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
    let mut session = fast_session(windowed_settings(&a), CoreSlot::new())
        .with_clock(Arc::new(StoppedClock(evening)));

    session.start().unwrap();
    assert!(wait_until(|| !session.is_pulse_enabled()));
    assert!(session.is_active());
    assert_eq!(marker_count(a.path()), 1);

    session.stop();
    assert!(!session.is_pulse_enabled());
    assert_eq!(marker_count(a.path()), 0);
}

/// Inside the active period the session keeps pulsing.
#[test]
fn session_pulses_inside_active_period() {
    let a = TempDir::new().unwrap();
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let mut session = fast_session(windowed_settings(&a), CoreSlot::new())
        .with_clock(Arc::new(StoppedClock(noon)));

    session.start().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert!(session.is_pulse_enabled());
    session.stop();
}
