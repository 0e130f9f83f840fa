use bevy::prelude::*;

use super::animation::{Spring, SpringConfig};

/// Latest pointer location in scene space, smoothed. Owned by the host.
#[derive(Resource, Debug, Clone)]
pub struct PointerPosition {
    spring: Spring,
    /// Whether the pointer is over the drawing surface
    inside: bool,
}

impl Default for PointerPosition {
    fn default() -> Self {
        Self {
            spring: Spring::new(Vec3::ZERO, SpringConfig::default()),
            inside: false,
        }
    }
}

impl PointerPosition {
    pub fn current(&self) -> Vec3 {
        self.spring.current()
    }

    /// Unsmoothed latest position
    pub fn target(&self) -> Vec3 {
        self.spring.target()
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn track(&mut self, scene: Vec2) {
        let target = scene.extend(0.0);
        if !self.inside {
            // Re-entering the canvas; don't sweep in from the old exit point
            self.spring.jump_to(target);
        } else {
            self.spring.set_target(target);
        }
        self.inside = true;
    }

    pub fn leave(&mut self) {
        self.inside = false;
    }

    pub fn set_spring_config(&mut self, config: SpringConfig) {
        self.spring.set_config(config);
    }

    pub fn step(&mut self, dt: f32) -> bool {
        self.spring.step(dt)
    }
}
