use serde::{Deserialize, Serialize};

/// Exponentially decaying exploration rate with a floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonSchedule {
    epsilon: f64,
    decay: f64,
    min: f64,
}

impl EpsilonSchedule {
    /// Values are clamped into `[0, 1]`.
    pub fn new(epsilon: f64, decay: f64, min: f64) -> Self {
        Self {
            epsilon: epsilon.clamp(0., 1.),
            decay: decay.clamp(0., 1.),
            min: min.clamp(0., 1.),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn decay(&mut self) {
        self.epsilon = f64::max(self.min, self.epsilon * self.decay);
    }
}
