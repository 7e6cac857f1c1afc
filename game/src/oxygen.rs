use serde::{Deserialize, Serialize};

/// The player's air supply. Drains continuously; each broken floor makes it
/// drain faster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OxygenMeter {
    value: f32,
    capacity: f32,
    decay_rate: f32,
}

impl OxygenMeter {
    pub fn new(capacity: f32, decay_rate: f32) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            value: capacity,
            capacity,
            decay_rate: decay_rate.max(0.0),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }

    pub fn scale_decay(&mut self, factor: f32) {
        self.decay_rate = (self.decay_rate * factor).max(0.0);
    }

    pub fn tick(&mut self, dt_seconds: f32) {
        if !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return;
        }
        self.value = (self.value - self.decay_rate * dt_seconds).max(0.0);
    }
}
