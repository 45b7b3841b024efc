use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frame deltas averaged for the FPS readout.
const HISTORY: usize = 60;

/// Snapshot shown by the overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub fps: f32,
    pub frame_time_ms: f32,
}

/// Measures frame deltas and keeps a rolling average.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    deltas: VecDeque<f32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            deltas: VecDeque::with_capacity(HISTORY),
        }
    }

    /// Starts over from now, dropping the frame history. Used once start-up
    /// work is done so it does not count as a frame.
    pub fn restart(&mut self) {
        self.restart_at(Instant::now());
    }

    pub fn restart_at(&mut self, now: Instant) {
        *self = Self::starting_at(now);
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        if self.deltas.len() == HISTORY {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta);
        delta
    }

    /// Time since the clock started, as of the last tick.
    pub fn elapsed(&self) -> Duration {
        self.last.saturating_duration_since(self.start)
    }

    pub fn stats(&self) -> FrameStats {
        let total: f32 = self.deltas.iter().sum();
        if self.deltas.is_empty() || total <= 0.0 {
            return FrameStats::default();
        }
        let mean = total / self.deltas.len() as f32;
        FrameStats {
            fps: 1.0 / mean,
            frame_time_ms: mean * 1000.0,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_zero_before_first_frame() {
        let clock = FrameClock::new();
        assert_eq!(clock.stats(), FrameStats::default());
    }

    #[test]
    fn averages_recent_frames() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let mut now = start;
        for _ in 0..10 {
            now += Duration::from_millis(20);
            let dt = clock.tick_at(now);
            assert!((dt - 0.02).abs() < 1e-6);
        }
        let stats = clock.stats();
        assert!((stats.fps - 50.0).abs() < 0.01);
        assert!((stats.frame_time_ms - 20.0).abs() < 0.01);
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
    }

    #[test]
    fn restart_discards_startup_gap() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(1500));

        let ready = start + Duration::from_secs(2);
        clock.restart_at(ready);
        assert_eq!(clock.stats(), FrameStats::default());
        assert_eq!(clock.elapsed(), Duration::ZERO);

        let dt = clock.tick_at(ready + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
        assert!((clock.stats().frame_time_ms - 16.0).abs() < 0.01);
    }

    #[test]
    fn old_frames_fall_out_of_the_window() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let mut now = start;
        for _ in 0..HISTORY {
            now += Duration::from_millis(100);
            clock.tick_at(now);
        }
        for _ in 0..HISTORY {
            now += Duration::from_millis(10);
            clock.tick_at(now);
        }
        assert!((clock.stats().fps - 100.0).abs() < 0.1);
    }
}
