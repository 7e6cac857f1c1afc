use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Clamps an interpolation parameter into `0.0..=1.0`. NaN maps to 0.
pub fn unit(t: f32) -> f32 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// A straight-line tween between two vectors, sampled with a clamped `t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Vec3,
    pub to: Vec3,
}

impl Segment {
    pub const fn new(from: Vec3, to: Vec3) -> Self {
        Self { from, to }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.from.lerp(self.to, unit(t))
    }
}
