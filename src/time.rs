//! Frame timing.
//!
//! The morph advances once per frame regardless of frame duration; the clock
//! only supplies the elapsed time that drives the breathing motion, the delta
//! that drives camera auto-rotation, and an FPS readout.

use std::time::{Duration, Instant};

/// Per-frame clock.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Start a clock now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Mark a new frame. Returns `(elapsed, delta)` in seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> (f32, f32) {
        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.saturating_duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let since_fps = now.saturating_duration_since(self.fps_update_time);
        if since_fps >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / since_fps.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Seconds since the clock started, as of the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds between the last two ticks.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
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
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_tick_reports_elapsed_and_delta() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        let (elapsed, delta) = clock.tick_at(t0 + Duration::from_millis(16));
        assert!((elapsed - 0.016).abs() < 1e-4);
        assert!((delta - 0.016).abs() < 1e-4);

        let (elapsed, delta) = clock.tick_at(t0 + Duration::from_millis(50));
        assert!((elapsed - 0.050).abs() < 1e-4);
        assert!((delta - 0.034).abs() < 1e-4);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_fps_updates_after_interval() {
        let t0 = Instant::now();
        let mut clock = FrameClock::starting_at(t0);
        for i in 1..=30 {
            clock.tick_at(t0 + Duration::from_micros(16_667 * i));
        }
        assert!((clock.fps() - 60.0).abs() < 1.0, "fps {}", clock.fps());
    }
}
