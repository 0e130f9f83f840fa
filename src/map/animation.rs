//! Spring tween behind every animated map value.
//!
//! A [`Spring`] owns its current value, target and velocity. Calling
//! [`Spring::set_target`] while it is moving retargets it in place: the velocity
//! carries over, nothing is queued.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Longest step integrated at once, keeps the spring stable on slow frames
const MAX_SUBSTEP: f32 = 1.0 / 120.0;

/// Tuning for a spring. Defaults match a gentle, slightly underdamped motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    /// Distance and speed below which the spring snaps onto its target
    pub precision: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 170.0,
            damping: 26.0,
            precision: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    current: Vec3,
    target: Vec3,
    velocity: Vec3,
    config: SpringConfig,
}

impl Spring {
    pub fn new(value: Vec3, config: SpringConfig) -> Self {
        Self {
            current: value,
            target: value,
            velocity: Vec3::ZERO,
            config,
        }
    }

    pub fn current(&self) -> Vec3 {
        self.current
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Retarget the animation; takes effect on the next [`Spring::step`]
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Snap to a value with no animation
    pub fn jump_to(&mut self, value: Vec3) {
        self.current = value;
        self.target = value;
        self.velocity = Vec3::ZERO;
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target && self.velocity == Vec3::ZERO
    }

    /// Advance by `dt` seconds. Returns true if the value changed.
    pub fn step(&mut self, dt: f32) -> bool {
        if self.is_settled() || dt <= 0.0 {
            return false;
        }

        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP);
            let displacement = self.current - self.target;
            let acceleration =
                -self.config.stiffness * displacement - self.config.damping * self.velocity;
            // Semi-implicit Euler
            self.velocity += acceleration * h;
            self.current += self.velocity * h;
            remaining -= h;
        }

        let precision = self.config.precision;
        if self.current.distance(self.target) < precision && self.velocity.length() < precision {
            self.jump_to(self.target);
        }
        true
    }
}
