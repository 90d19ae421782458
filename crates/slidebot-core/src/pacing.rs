//! Wall-clock pacing of frame and log emission.

use std::time::{Duration, Instant};

/// Lowest frame rate accepted
pub const MIN_FPS: u32 = 1;
/// Highest frame rate accepted
pub const MAX_FPS: u32 = 12;
/// Frames are never emitted closer together than this
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Monotonic time source, measured from an arbitrary origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Real time, measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Minimum spacing between frames for a requested rate
pub fn frame_interval(fps: u32) -> Duration {
    let fps = fps.clamp(MIN_FPS, MAX_FPS);
    (Duration::from_secs(1) / fps).max(MIN_FRAME_DELAY)
}

/// Decides whether enough time has passed to publish another frame
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_emit: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True if nothing was emitted yet or the interval has elapsed
    pub fn is_due(&self, now: Duration) -> bool {
        match self.last_emit {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }

    /// Record an emission at `now`
    pub fn mark(&mut self, now: Duration) {
        self.last_emit = Some(now);
    }
}
