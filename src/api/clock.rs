//! Stopwatch over the monotonic clock.

use crate::platform::{DefaultBackend, PlatformBackend};

/// Measures elapsed seconds between `start` and `stop`.
///
/// While running, [`update`](Self::update) refreshes the elapsed time without
/// stopping. A stopped stopwatch keeps its last reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stopwatch {
    start_time: Option<f64>,
    elapsed: f64,
}

impl Stopwatch {
    pub const fn new() -> Self {
        Self {
            start_time: None,
            elapsed: 0.0,
        }
    }

    /// Start (or restart) timing from now.
    pub fn start(&mut self) {
        self.start_time = Some(now());
        self.elapsed = 0.0;
    }

    /// Refresh `elapsed` if running.
    pub fn update(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed = now() - start;
        }
    }

    /// Take a final reading and stop.
    pub fn stop(&mut self) {
        self.update();
        self.start_time = None;
    }

    /// Seconds measured by the last `update` or `stop`.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

fn now() -> f64 {
    DefaultBackend::new().absolute_time()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle() {
        let mut watch = Stopwatch::new();
        watch.update();
        assert!(!watch.is_running());
        assert_eq!(watch.elapsed(), 0.0);
    }

    #[test]
    fn test_start_stop() {
        let mut watch = Stopwatch::new();
        watch.start();
        assert!(watch.is_running());

        std::thread::sleep(std::time::Duration::from_millis(5));
        watch.update();
        let running = watch.elapsed();
        assert!(running > 0.0);

        watch.stop();
        assert!(!watch.is_running());
        let stopped = watch.elapsed();
        assert!(stopped >= running);

        std::thread::sleep(std::time::Duration::from_millis(2));
        watch.update();
        assert_eq!(watch.elapsed(), stopped);
    }
}
