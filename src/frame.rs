//! Frame pacing and frame-rate measurement.

use std::time::{Duration, Instant};

/// Caps how often frames are rendered.
///
/// The limiter only computes deadlines; the event loop waits on them with
/// `ControlFlow::WaitUntil`, which is the only place the loop stalls.
#[derive(Clone, Copy, Debug)]
pub struct FrameLimiter {
    interval: Duration,
    next_frame: Instant,
}

impl FrameLimiter {
    /// A limiter for `target_fps` frames per second. `0` means uncapped.
    pub fn new(target_fps: u32, now: Instant) -> Self {
        let interval = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        };
        Self {
            interval,
            next_frame: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next frame may start.
    pub fn deadline(&self) -> Instant {
        self.next_frame
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_frame
    }

    /// Record that a frame started at `now` and schedule the next one.
    ///
    /// A loop that fell behind resumes from `now` instead of bursting to
    /// catch up.
    pub fn mark_frame(&mut self, now: Instant) {
        self.next_frame += self.interval;
        if self.next_frame < now {
            self.next_frame = now + self.interval;
        }
    }
}

/// Counts frames and reports the rate about once per second.
#[derive(Clone, Copy, Debug)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0.0,
        }
    }

    /// Latest measured rate.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Count one frame. Returns the new rate when a measurement window closes.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Self::WINDOW {
            return None;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_fps_interval() {
        let limiter = FrameLimiter::new(60, Instant::now());
        let micros = limiter.interval().as_micros();
        assert!((16_666..=16_667).contains(&micros));
    }

    #[test]
    fn first_frame_is_due_immediately() {
        let now = Instant::now();
        assert!(FrameLimiter::new(60, now).is_due(now));
    }

    #[test]
    fn next_frame_waits_one_interval() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(50, start);
        limiter.mark_frame(start);
        assert!(!limiter.is_due(start + Duration::from_millis(10)));
        assert!(limiter.is_due(start + Duration::from_millis(20)));
        assert_eq!(limiter.deadline(), start + Duration::from_millis(20));
    }

    #[test]
    fn late_frame_does_not_burst() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(50, start);
        let late = start + Duration::from_secs(1);
        limiter.mark_frame(late);
        assert_eq!(limiter.deadline(), late + Duration::from_millis(20));
    }

    #[test]
    fn zero_target_is_uncapped() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(0, start);
        limiter.mark_frame(start);
        assert!(limiter.is_due(start));
    }

    #[test]
    fn fps_reported_once_per_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for i in 1..60 {
            assert_eq!(counter.tick(start + Duration::from_millis(i * 10)), None);
        }
        let fps = counter.tick(start + Duration::from_secs(1)).unwrap();
        assert!((fps - 60.0).abs() < 1e-3);
        assert_eq!(counter.fps(), fps);
    }
}
