use std::time::{Duration, Instant};

/// Timing of a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockIndex {
    /// Time elapsed since previous frame.
    pub delta: Duration,

    /// Number of this frame.
    pub step: u64,
}

impl ClockIndex {
    /// Frame with predetermined duration.
    pub fn fixed(delta: Duration) -> Self {
        ClockIndex { delta, step: 0 }
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Produces `ClockIndex` for each frame from wall-clock time.
pub struct Clocks {
    last: Instant,
    step: u64,
}

impl Clocks {
    pub fn new() -> Self {
        Clocks {
            last: Instant::now(),
            step: 0,
        }
    }

    pub fn step(&mut self) -> ClockIndex {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        self.step += 1;

        ClockIndex {
            delta,
            step: self.step,
        }
    }
}

impl Default for Clocks {
    fn default() -> Self {
        Clocks::new()
    }
}
