//! Fixed-step accumulator
//!
//! Frame deltas add to screen time; the world advances in whole fixed steps
//! while `world_time + step <= screen_time`. The remainder carries over.

#[derive(Debug, Clone)]
pub struct SimulationClock {
    fixed_step: f64,
    screen_time: f64,
    world_time: f64,
    max_frame_delta: Option<f64>,
}

impl SimulationClock {
    pub fn new(fixed_step: f64, max_frame_delta: Option<f64>) -> Self {
        debug_assert!(fixed_step > 0.0);
        Self {
            fixed_step,
            screen_time: 0.0,
            world_time: 0.0,
            max_frame_delta,
        }
    }

    /// Add a frame delta; negative deltas are ignored
    pub fn accumulate(&mut self, delta: f64) {
        let mut delta = delta.max(0.0);
        if let Some(max) = self.max_frame_delta {
            if delta > max {
                log::debug!("Frame delta {:.3}s clamped to {:.3}s", delta, max);
                delta = max;
            }
        }
        self.screen_time += delta;
    }

    /// Advance world time by one step if it fits, returning the new world time
    pub fn next_step(&mut self) -> Option<f64> {
        if self.world_time + self.fixed_step <= self.screen_time {
            self.world_time += self.fixed_step;
            Some(self.world_time)
        } else {
            None
        }
    }

    /// Number of whole steps currently pending
    pub fn pending_steps(&self) -> u32 {
        ((self.screen_time - self.world_time) / self.fixed_step).max(0.0) as u32
    }

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    pub fn screen_time(&self) -> f64 {
        self.screen_time
    }
}
