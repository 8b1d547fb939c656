//! Virtual frame clock for deterministic playback.

use flythru_env::FrameClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock that only moves when told to.
///
/// Clones share the same time, so the harness can keep one handle to
/// advance while a `FrameTimer` reads through another.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Virtual time in nanoseconds since the run started
    time_ns: Arc<AtomicU64>,
}

impl SimClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances virtual time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.time_ns.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        self.time_ns.store(time_ns, Ordering::SeqCst);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.time_ns.load(Ordering::SeqCst)
    }

    /// Returns the current virtual time in seconds.
    pub fn secs(&self) -> f64 {
        self.now().as_secs_f64()
    }
}

impl FrameClock for SimClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }
}
