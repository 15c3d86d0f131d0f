//! Monotonic clock with lazy calibration.

use std::sync::OnceLock;
use std::time::Instant;

/// High-resolution monotonic clock.
///
/// The epoch is fixed by the first call to [`calibrate`](Self::calibrate) or
/// [`absolute_time`](Self::absolute_time), whichever comes first. Calibration
/// happens at most once; if it never completes, the next call tries again.
#[derive(Debug)]
pub struct MonotonicClock {
    epoch: OnceLock<Instant>,
}

impl MonotonicClock {
    /// Create an uncalibrated clock.
    pub const fn new() -> Self {
        Self {
            epoch: OnceLock::new(),
        }
    }

    /// Fix the epoch now. Later calls are no-ops.
    pub fn calibrate(&self) {
        self.epoch();
    }

    /// Whether the epoch has been fixed.
    pub fn is_calibrated(&self) -> bool {
        self.epoch.get().is_some()
    }

    /// Seconds elapsed since the epoch, calibrating first if needed.
    pub fn absolute_time(&self) -> f64 {
        self.epoch().elapsed().as_secs_f64()
    }

    fn epoch(&self) -> Instant {
        *self.epoch.get_or_init(Instant::now)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncalibrated_clock_is_usable() {
        let clock = MonotonicClock::new();
        assert!(!clock.is_calibrated());

        let t1 = clock.absolute_time();
        assert!(clock.is_calibrated());
        assert!(t1 >= 0.0);

        let t2 = clock.absolute_time();
        assert!(t2 >= t1);
    }

    #[test]
    fn test_calibrate_is_idempotent() {
        let clock = MonotonicClock::new();
        clock.calibrate();
        let t1 = clock.absolute_time();
        clock.calibrate();
        let t2 = clock.absolute_time();
        assert!(t2 >= t1);
    }

    #[test]
    fn test_never_goes_backward() {
        let clock = MonotonicClock::new();
        let mut last = clock.absolute_time();
        for _ in 0..10_000 {
            let now = clock.absolute_time();
            assert!(now >= last);
            last = now;
        }
    }
}
