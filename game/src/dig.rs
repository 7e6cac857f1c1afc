use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigPhase {
    Idle,
    Digging,
    Complete,
}

/// What one `tick` produced. The three fractions drive independent tweens
/// (pile shrink, hole growth, prize rise) and are all equal to `progress`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DigTick {
    pub progress: f32,
    pub pile_shrink: f32,
    pub hole_open: f32,
    pub prize_rise: f32,
    /// Progress moved this tick.
    pub advanced: bool,
    /// This is the tick that reached 1.0. Never set twice for one tracker.
    pub completed: bool,
}

impl DigTick {
    fn at(progress: f32, advanced: bool, completed: bool) -> Self {
        Self {
            progress,
            pile_shrink: progress,
            hole_open: progress,
            prize_rise: progress,
            advanced,
            completed,
        }
    }
}

/// Progress of one dig, in `0.0..=1.0`.
///
/// Overlap notifications toggle `active`; the frame loop calls `tick`.
/// Pausing keeps the progress made so far, and once the dig completes the
/// tracker ignores everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigProgressTracker {
    progress: f32,
    rate: f32,
    active: bool,
}

impl DigProgressTracker {
    pub fn new(rate: f32) -> Result<Self, GameError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(GameError::InvalidDigRate(rate));
        }
        Ok(Self {
            progress: 0.0,
            rate,
            active: false,
        })
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    pub fn phase(&self) -> DigPhase {
        if self.is_complete() {
            DigPhase::Complete
        } else if self.active {
            DigPhase::Digging
        } else {
            DigPhase::Idle
        }
    }

    pub fn set_active(&mut self, active: bool) {
        if self.is_complete() {
            return;
        }
        self.active = active;
    }

    pub fn tick(&mut self, dt_seconds: f32) -> DigTick {
        if !self.active || self.is_complete() {
            return DigTick::at(self.progress, false, false);
        }

        let dt = if dt_seconds.is_finite() { dt_seconds.max(0.0) } else { 0.0 };
        let before = self.progress;
        self.progress = (self.progress + self.rate * dt).min(1.0);

        DigTick::at(self.progress, self.progress > before, self.is_complete())
    }
}
