/// Active-period window and the gate that decides whether pulsing runs.
///
/// The gate is polled, not event-driven: it looks at the current
/// time-of-day and the state it produced last time, and returns the next
/// state. Both boundaries use a strict `>` comparison, so `now == start`
/// and `now == end` leave the previous state in place.
use chrono::NaiveTime;

/// Daily active period `[start, end)` in local wall-clock time.
///
/// `start == end` disables the restriction entirely. `start > end` spans
/// midnight (e.g. 22:00–06:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Build a window from hour/minute pairs. Out-of-range values are
    /// clamped to 23/59.
    pub fn from_hm(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> Self {
        Self {
            start: hm(start_hour, start_minute),
            end: hm(end_hour, end_minute),
        }
    }

    /// `false` when `start == end`; the gate is inert for such a window.
    pub fn is_restricted(&self) -> bool {
        self.start != self.end
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Next pulse-enabled state for `now`, given the `previous` one.
    pub fn evaluate(&self, now: NaiveTime, previous: bool) -> bool {
        is_active(now, self, previous)
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or_default()
}

/// Gate evaluation.
///
/// The two comparisons are applied one after the other, not folded into a
/// single expression: overnight windows test `end` first and `start`
/// second, same-day windows test `start` first and `end` second. The later
/// assignment wins.
pub fn is_active(now: NaiveTime, window: &TimeWindow, previous: bool) -> bool {
    if !window.is_restricted() {
        return previous;
    }

    let mut active = previous;
    if window.wraps_midnight() {
        if now > window.end {
            active = false;
        }
        if now > window.start {
            active = true;
        }
    } else {
        if now > window.start {
            active = true;
        }
        if now > window.end {
            active = false;
        }
    }
    active
}
