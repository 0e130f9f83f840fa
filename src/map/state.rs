use bevy::prelude::*;

use crate::transform::MapPlacement;

use super::animation::{Spring, SpringConfig};

/// Requested placement for the map. Missing fields keep their current target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapStateTarget {
    pub position: Option<Vec3>,
    pub scale: Option<Vec3>,
}

impl MapStateTarget {
    pub fn position(position: Vec3) -> Self {
        Self {
            position: Some(position),
            scale: None,
        }
    }

    pub fn scale(scale: Vec3) -> Self {
        Self {
            position: None,
            scale: Some(scale),
        }
    }

    pub fn placement(placement: MapPlacement) -> Self {
        Self {
            position: Some(placement.position),
            scale: Some(placement.scale),
        }
    }
}

impl From<MapPlacement> for MapStateTarget {
    fn from(placement: MapPlacement) -> Self {
        Self::placement(placement)
    }
}

/// Animated placement of the map image in scene space.
///
/// The only way to move the map is [`MapState::set_target`]; the current value
/// follows over the next frames as [`MapState::step`] runs.
#[derive(Resource, Debug, Clone)]
pub struct MapState {
    position: Spring,
    scale: Spring,
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(MapPlacement::default(), SpringConfig::default())
    }
}

impl MapState {
    pub fn new(placement: MapPlacement, config: SpringConfig) -> Self {
        Self {
            position: Spring::new(placement.position, config),
            scale: Spring::new(placement.scale, config),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position.current()
    }

    pub fn scale(&self) -> Vec3 {
        self.scale.current()
    }

    /// Where the map is right now
    pub fn placement(&self) -> MapPlacement {
        MapPlacement::new(self.position.current(), self.scale.current())
    }

    /// Where the map is heading
    pub fn target(&self) -> MapPlacement {
        MapPlacement::new(self.position.target(), self.scale.target())
    }

    pub fn is_animating(&self) -> bool {
        !(self.position.is_settled() && self.scale.is_settled())
    }

    pub fn set_target(&mut self, target: MapStateTarget) {
        if let Some(position) = target.position {
            self.position.set_target(position);
        }
        if let Some(scale) = target.scale {
            self.scale.set_target(scale);
        }
    }

    /// Place the map without animating, e.g. after loading a new image
    pub fn jump_to(&mut self, placement: MapPlacement) {
        self.position.jump_to(placement.position);
        self.scale.jump_to(placement.scale);
    }

    pub fn set_spring_config(&mut self, config: SpringConfig) {
        self.position.set_config(config);
        self.scale.set_config(config);
    }

    /// Advance the animation. Returns true if the placement changed.
    pub fn step(&mut self, dt: f32) -> bool {
        let moved = self.position.step(dt);
        let scaled = self.scale.step(dt);
        moved || scaled
    }
}
