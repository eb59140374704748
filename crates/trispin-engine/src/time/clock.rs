use std::time::{Duration, Instant};

/// Snapshot taken when a frame is presented.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock was started.
    pub elapsed: f32,

    /// Seconds since the previous presented frame.
    pub dt: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Monotonic clock anchored at graphics context creation.
#[derive(Debug, Clone)]
pub struct ContextClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
}

impl ContextClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Records a presented frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let ft = FrameTime {
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            dt: now.saturating_duration_since(self.last).as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for ContextClock {
    fn default() -> Self {
        Self::new()
    }
}
