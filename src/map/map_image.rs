//! Source map image owned by the host.
//!
//! Loaded from disk with the `image` crate so its pixel size is known before the
//! first frame. When no file is configured, or it fails to load, a checkerboard
//! placeholder stands in.

use std::path::Path;

use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use thiserror::Error;

use crate::constants::{PLACEHOLDER_CHECKER_SIZE, PLACEHOLDER_MAP_SIZE};

#[derive(Debug, Error)]
pub enum MapImageError {
    #[error("could not open map image {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// The map image the tools annotate
#[derive(Resource, Debug, Clone, Default)]
pub struct MapImage {
    pub handle: Handle<Image>,
    /// Size in image pixels
    pub size: UVec2,
}

impl MapImage {
    pub fn new(handle: Handle<Image>, size: UVec2) -> Self {
        Self { handle, size }
    }

    pub fn size_f32(&self) -> Vec2 {
        self.size.as_vec2()
    }
}

/// Decode an image file into a renderer image
pub fn load_map_image(path: &Path) -> Result<Image, MapImageError> {
    let decoded = image::open(path)
        .map_err(|source| MapImageError::Open {
            path: path.display().to_string(),
            source,
        })?
        .into_rgba8();
    let (width, height) = decoded.dimensions();

    Ok(Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        decoded.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        default(),
    ))
}

/// Grey checkerboard used when there is no map to show
pub fn create_placeholder_map() -> Image {
    let (width, height) = (PLACEHOLDER_MAP_SIZE.x, PLACEHOLDER_MAP_SIZE.y);
    let light: [u8; 4] = [90, 90, 96, 255];
    let dark: [u8; 4] = [60, 60, 66, 255];

    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let checker = (x / PLACEHOLDER_CHECKER_SIZE + y / PLACEHOLDER_CHECKER_SIZE) % 2 == 0;
            data.extend_from_slice(if checker { &light } else { &dark });
        }
    }

    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        default(),
    )
}
