//! Time utilities for the tick loop

use std::time::{Duration, Instant};

/// Wall-clock interval between ticks, None when running unthrottled
pub fn tick_interval(tick_hz: u32) -> Option<Duration> {
    (tick_hz > 0).then(|| Duration::from_micros(1_000_000 / tick_hz as u64))
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_from_rate() {
        assert_eq!(tick_interval(0), None);
        assert_eq!(tick_interval(30), Some(Duration::from_micros(33_333)));
        assert_eq!(tick_interval(1_000), Some(Duration::from_millis(1)));
    }
}
