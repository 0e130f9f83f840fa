//! Fog of war drawing surface.
//!
//! The fog is an RGBA canvas in image space, one fog pixel per map image pixel.
//! A fogged pixel is opaque black, a revealed pixel is fully transparent.
//!
//! Tools paint on the canvas directly through [`FogSurface`]. The renderer never
//! reads the canvas itself: [`sync_fog_texture`] copies it into the texture behind
//! [`FogSurface::texture`] once per frame when something changed, so a frame may
//! show a stroke that is still in progress.

use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{Rgba, RgbaImage};

const FOGGED: Rgba<u8> = Rgba([0, 0, 0, 255]);
const REVEALED: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// What a brush stroke does to the fog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FogBrushMode {
    /// Clear fog so players can see the map beneath
    Reveal,
    /// Put fog back
    Cover,
}

impl FogBrushMode {
    fn pixel(self) -> Rgba<u8> {
        match self {
            FogBrushMode::Reveal => REVEALED,
            FogBrushMode::Cover => FOGGED,
        }
    }
}

/// Fog canvas plus the handle of the texture the renderer composites
#[derive(Resource)]
pub struct FogSurface {
    canvas: RgbaImage,
    texture: Handle<Image>,
    dirty: bool,
}

impl Default for FogSurface {
    fn default() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            texture: Handle::default(),
            dirty: false,
        }
    }
}

impl FogSurface {
    /// Fully fogged surface of the given size
    pub fn new(size: UVec2, texture: Handle<Image>) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(size.x, size.y, FOGGED),
            texture,
            dirty: true,
        }
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.canvas.width(), self.canvas.height())
    }

    pub fn texture(&self) -> &Handle<Image> {
        &self.texture
    }

    /// Point the surface at a new texture; the next sync uploads the whole canvas
    pub fn set_texture(&mut self, texture: Handle<Image>) {
        self.texture = texture;
        self.dirty = true;
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the pixel is fogged. `None` outside the surface.
    pub fn is_fogged(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.canvas.width() || y >= self.canvas.height() {
            return None;
        }
        Some(self.canvas.get_pixel(x, y)[3] > 0)
    }

    /// Number of revealed pixels
    pub fn revealed_count(&self) -> usize {
        self.canvas.pixels().filter(|p| p[3] == 0).count()
    }

    pub fn fill(&mut self, mode: FogBrushMode) {
        let pixel = mode.pixel();
        for p in self.canvas.pixels_mut() {
            *p = pixel;
        }
        self.dirty = true;
    }

    /// Paint a disc centered on an image-space point. Returns true if any pixel changed.
    pub fn paint_circle(&mut self, center: Vec2, radius: f32, mode: FogBrushMode) -> bool {
        let (width, height) = self.canvas.dimensions();
        if width == 0 || height == 0 || radius <= 0.0 {
            return false;
        }

        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_x = ((center.x + radius).ceil().max(0.0) as u32).min(width);
        let max_y = ((center.y + radius).ceil().max(0.0) as u32).min(height);

        let pixel = mode.pixel();
        let radius_sq = radius * radius;
        let mut changed = false;
        for y in min_y..max_y {
            for x in min_x..max_x {
                let pixel_center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if pixel_center.distance_squared(center) > radius_sq {
                    continue;
                }
                let current = self.canvas.get_pixel_mut(x, y);
                if *current != pixel {
                    *current = pixel;
                    changed = true;
                }
            }
        }

        if changed {
            self.dirty = true;
        }
        changed
    }

    /// Paint a stroke between two image-space points, so fast drags leave no gaps
    pub fn paint_line(&mut self, from: Vec2, to: Vec2, radius: f32, mode: FogBrushMode) -> bool {
        let spacing = (radius / 2.0).max(1.0);
        let steps = (from.distance(to) / spacing).ceil().max(1.0) as u32;
        let mut changed = false;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            changed |= self.paint_circle(from.lerp(to, t), radius, mode);
        }
        changed
    }

    /// Renderer-side image matching the current canvas
    pub fn texture_image(&self) -> Image {
        let (width, height) = self.canvas.dimensions();
        Image::new(
            Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.texture_bytes(),
            TextureFormat::Rgba8UnormSrgb,
            default(),
        )
    }

    fn texture_bytes(&self) -> Vec<u8> {
        if self.canvas.width() == 0 || self.canvas.height() == 0 {
            return FOGGED.0.to_vec();
        }
        self.canvas.as_raw().clone()
    }
}

/// Upload the fog canvas into its texture when it changed
pub fn sync_fog_texture(mut fog: ResMut<FogSurface>, mut images: ResMut<Assets<Image>>) {
    if !fog.is_dirty() {
        return;
    }

    let bytes = fog.texture_bytes();
    if let Some(mut texture) = images.get_mut(&fog.texture) {
        texture.data = Some(bytes);
    }
    fog.dirty = false;
}
