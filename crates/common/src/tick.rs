//! Tick-rate gates for cooperative frame loops.
//!
//! Both compositors schedule work from a single cooperative loop and
//! throttle sub-tasks independently: the recording compositor caps screen
//! and camera grabs at different rates, and the preview render loop runs a
//! low-frequency watchdog that can wake it out of idle. All gates take the
//! current monotonic time in nanoseconds so they stay deterministic under
//! test.

/// Caps a recurring task at a target rate.
///
/// The first call always fires so a freshly started loop produces output
/// immediately instead of waiting one full interval.
#[derive(Debug)]
pub struct RateGate {
    target_interval_ns: u64,
    last_fire_ns: Option<u64>,
}

impl RateGate {
    /// Create a gate targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            last_fire_ns: None,
        }
    }

    /// Check whether enough time has passed for the next tick.
    /// Returns true and advances internal state if so.
    pub fn should_fire(&mut self, now_ns: u64) -> bool {
        match self.last_fire_ns {
            None => {
                self.last_fire_ns = Some(now_ns);
                true
            }
            Some(last) if now_ns >= last + self.target_interval_ns => {
                self.last_fire_ns = Some(now_ns);
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }

    /// Forget the last fire time so the next check fires unconditionally.
    pub fn reset(&mut self) {
        self.last_fire_ns = None;
    }
}

/// Low-frequency poll gate for idle-recovery checks.
///
/// Unlike [`RateGate`], the first poll does not fire: the watchdog exists
/// to catch work that appeared *after* a loop went idle, so it only
/// reports due once a full interval has elapsed.
#[derive(Debug)]
pub struct Watchdog {
    interval_ns: u64,
    last_poll_ns: Option<u64>,
}

impl Watchdog {
    /// Create a watchdog with the given poll interval in milliseconds.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ns: interval_ms * 1_000_000,
            last_poll_ns: None,
        }
    }

    /// Returns true once per elapsed interval.
    pub fn due(&mut self, now_ns: u64) -> bool {
        match self.last_poll_ns {
            None => {
                self.last_poll_ns = Some(now_ns);
                false
            }
            Some(last) if now_ns >= last + self.interval_ns => {
                self.last_poll_ns = Some(now_ns);
                true
            }
            _ => false,
        }
    }
}

/// Current monotonic time in nanoseconds since an arbitrary process epoch.
pub fn monotonic_now_ns() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}
