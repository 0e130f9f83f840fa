//! Coordinate transforms between the three spaces a map tool works in.
//!
//! - **Scene**: the renderer's world space. Origin at the viewport center, y-up,
//!   one scene unit spans [`Viewport::factor`] logical pixels. Points sit on the
//!   z = 0 plane, so only x/y take part in the mapping.
//! - **Canvas**: physical pixels of the drawing surface. Origin top-left, y-down.
//!   Its size is the logical viewport size times the device pixel ratio.
//! - **Image**: pixels of the source map image. Origin at the image's top-left
//!   corner, y-down. Independent of pan and zoom.
//!
//! The map image is drawn as a quad centered on [`MapPlacement::position`] whose
//! scene-space size is `image_size * scale`.
//!
//! ## Families
//!
//! [`MapTransform::vector`] maps offsets (drag deltas, sizes) and ignores every
//! translation. [`MapTransform::coordinates`] maps absolute points. Feeding a drag
//! delta through the coordinate family applies the pan offset a second time.
//!
//! A [`MapTransform`] is a plain value built from the viewport, placement and image
//! size it is given. Build a fresh one whenever any of them may have changed;
//! holding on to an old one drifts silently.


use bevy::prelude::*;

use crate::constants::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

/// Visible drawing surface, owned by the host and read-only to tools
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical size of the drawing surface
    pub size: Vec2,
    /// Physical pixels per logical pixel
    pub pixel_ratio: f32,
    /// Logical pixels per scene unit
    pub factor: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            size: Vec2::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
            pixel_ratio: 1.0,
            factor: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            ..default()
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor;
        self
    }

    /// Size of the drawing surface in canvas (physical) pixels
    pub fn canvas_size(&self) -> Vec2 {
        self.size * self.pixel_ratio
    }

    fn canvas_pixels_per_unit(&self) -> f32 {
        self.factor * self.pixel_ratio
    }
}

/// Placement of the map image in scene space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPlacement {
    /// Scene position of the image center
    pub position: Vec3,
    /// Scene units per image pixel, per axis
    pub scale: Vec3,
}

impl Default for MapPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl MapPlacement {
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    /// Placement moved by a scene-space offset
    pub fn translated(self, delta: Vec3) -> Self {
        Self {
            position: self.position + delta,
            ..self
        }
    }

    /// Placement rescaled so the image point under `pivot` (a scene point) stays put
    pub fn zoomed_about(self, pivot: Vec2, scale: Vec3) -> Self {
        let local = (pivot - self.position.truncate()) / self.scale.truncate();
        let position = pivot - local * scale.truncate();
        Self {
            position: position.extend(self.position.z),
            scale,
        }
    }
}

/// Snapshot of everything a coordinate mapping depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapTransform {
    viewport: Viewport,
    placement: MapPlacement,
    image_size: Vec2,
}

impl MapTransform {
    pub fn new(viewport: Viewport, placement: MapPlacement, image_size: Vec2) -> Self {
        Self {
            viewport,
            placement,
            image_size,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn placement(&self) -> &MapPlacement {
        &self.placement
    }

    pub fn image_size(&self) -> Vec2 {
        self.image_size
    }

    /// Transforms for offsets and deltas
    pub fn vector(&self) -> Vectors<'_> {
        Vectors { transform: self }
    }

    /// Transforms for absolute points
    pub fn coordinates(&self) -> Coordinates<'_> {
        Coordinates { transform: self }
    }
}

/// Linear part of every mapping: scale and axis flips, never translation
#[derive(Debug, Clone, Copy)]
pub struct Vectors<'a> {
    transform: &'a MapTransform,
}

impl Vectors<'_> {
    /// Scene vector to canvas vector
    pub fn scene_to_canvas(&self, vector: Vec2) -> Vec2 {
        let k = self.transform.viewport.canvas_pixels_per_unit();
        Vec2::new(vector.x * k, -vector.y * k)
    }

    /// Canvas vector to scene vector
    pub fn canvas_to_scene(&self, vector: Vec2) -> Vec2 {
        let k = self.transform.viewport.canvas_pixels_per_unit();
        Vec2::new(vector.x / k, -vector.y / k)
    }

    /// Canvas vector to image vector
    pub fn canvas_to_image(&self, vector: Vec2) -> Vec2 {
        self.scene_to_image(self.canvas_to_scene(vector))
    }

    /// Image vector to canvas vector
    pub fn image_to_canvas(&self, vector: Vec2) -> Vec2 {
        self.scene_to_canvas(self.image_to_scene(vector))
    }

    /// Scene vector to image vector
    pub fn scene_to_image(&self, vector: Vec2) -> Vec2 {
        let scale = self.transform.placement.scale.truncate();
        Vec2::new(vector.x / scale.x, -vector.y / scale.y)
    }

    /// Image vector to scene vector
    pub fn image_to_scene(&self, vector: Vec2) -> Vec2 {
        let scale = self.transform.placement.scale.truncate();
        Vec2::new(vector.x * scale.x, -vector.y * scale.y)
    }
}

/// Full affine mappings for points
#[derive(Debug, Clone, Copy)]
pub struct Coordinates<'a> {
    transform: &'a MapTransform,
}

impl Coordinates<'_> {
    fn canvas_center(&self) -> Vec2 {
        self.transform.viewport.canvas_size() / 2.0
    }

    fn map_center(&self) -> Vec2 {
        self.transform.placement.position.truncate()
    }

    /// Scene point to canvas point
    pub fn scene_to_canvas(&self, point: Vec2) -> Vec2 {
        self.canvas_center() + self.transform.vector().scene_to_canvas(point)
    }

    /// Canvas point to scene point
    pub fn canvas_to_scene(&self, point: Vec2) -> Vec2 {
        self.transform
            .vector()
            .canvas_to_scene(point - self.canvas_center())
    }

    /// Canvas point to image pixel
    pub fn canvas_to_image(&self, point: Vec2) -> Vec2 {
        self.scene_to_image(self.canvas_to_scene(point))
    }

    /// Image pixel to canvas point
    pub fn image_to_canvas(&self, point: Vec2) -> Vec2 {
        self.scene_to_canvas(self.image_to_scene(point))
    }

    /// Scene point to image pixel
    pub fn scene_to_image(&self, point: Vec2) -> Vec2 {
        let local = self.transform.vector().scene_to_image(point - self.map_center());
        local + self.transform.image_size / 2.0
    }

    /// Image pixel to scene point
    pub fn image_to_scene(&self, point: Vec2) -> Vec2 {
        let local = point - self.transform.image_size / 2.0;
        self.map_center() + self.transform.vector().image_to_scene(local)
    }
}
