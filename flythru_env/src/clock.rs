//! Frame clock abstraction.

use std::time::{Duration, Instant};

/// Monotonic time source driving the render loop.
///
/// # Implementations
///
/// - **Production**: `SystemClock` - wraps `std::time::Instant`
/// - **Simulation**: `SimClock` (in `flythru_sim`) - a virtual clock
///   advanced by the harness
pub trait FrameClock {
    /// Returns the time elapsed since the clock was created.
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`.
pub struct SystemClock {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl SystemClock {
    /// Creates a new SystemClock starting now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Turns a clock into per-frame deltas.
///
/// The first call to `next_frame` measures from the moment the timer was
/// created.
pub struct FrameTimer<C: FrameClock> {
    clock: C,
    last: Duration,
    frames: u64,
}

impl<C: FrameClock> FrameTimer<C> {
    /// Creates a timer reading from `clock`.
    pub fn new(clock: C) -> Self {
        let last = clock.now();
        Self {
            clock,
            last,
            frames: 0,
        }
    }

    /// Returns the seconds elapsed since the previous frame.
    pub fn next_frame(&mut self) -> f64 {
        let now = self.clock.now();
        let delta = now.saturating_sub(self.last);
        self.last = now;
        self.frames += 1;
        delta.as_secs_f64()
    }

    /// Number of frames measured so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Returns the underlying clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct ManualClock(Cell<Duration>);

    impl FrameClock for ManualClock {
        fn now(&self) -> Duration {
            self.0.get()
        }
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let t1 = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        let t2 = clock.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(5));
    }

    #[test]
    fn test_frame_timer_deltas() {
        let clock = ManualClock(Cell::new(Duration::from_millis(100)));
        let mut timer = FrameTimer::new(clock);

        timer.clock().0.set(Duration::from_millis(116));
        let dt = timer.next_frame();
        assert!((dt - 0.016).abs() < 1e-9);

        timer.clock().0.set(Duration::from_millis(150));
        let dt = timer.next_frame();
        assert!((dt - 0.034).abs() < 1e-9);

        assert_eq!(timer.frames(), 2);
    }

    #[test]
    fn test_frame_timer_never_negative() {
        let clock = ManualClock(Cell::new(Duration::from_millis(50)));
        let mut timer = FrameTimer::new(clock);

        timer.clock().0.set(Duration::from_millis(10));
        assert_eq!(timer.next_frame(), 0.0);
    }
}
