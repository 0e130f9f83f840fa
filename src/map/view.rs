//! Host side of the map view: window tracking, sprites, animation and zoom.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::MapToolsConfig;
use crate::constants::{CAMERA_Z, FOG_Z, MAP_Z};
use crate::transform::{MapPlacement, Viewport};

use super::fog::FogSurface;
use super::map_image::{MapImage, create_placeholder_map, load_map_image};
use super::pointer::PointerPosition;
use super::state::{MapState, MapStateTarget};

/// Pixel wheel deltas per wheel line
const PIXELS_PER_LINE: f32 = 100.0;

#[derive(Component)]
pub struct MapCamera;

#[derive(Component)]
pub struct MapSprite;

#[derive(Component)]
pub struct FogSprite;

fn viewport_from_window(window: &Window, factor: f32) -> Viewport {
    Viewport::new(Vec2::new(window.width(), window.height()))
        .with_pixel_ratio(window.scale_factor())
        .with_factor(factor)
}

/// Placement that fits the whole image inside the viewport, centered
pub fn fit_placement(viewport: &Viewport, image_size: Vec2) -> MapPlacement {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return MapPlacement::default();
    }
    let scene_size = viewport.size / viewport.factor;
    let scale = (scene_size / image_size).min_element();
    MapPlacement::new(Vec3::ZERO, Vec3::new(scale, scale, 1.0))
}

/// Startup system: load the map image, create the fog and spawn the view
pub fn setup_map_view(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    config: Res<MapToolsConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
    mut map_state: ResMut<MapState>,
    mut pointer: ResMut<PointerPosition>,
) {
    let image = match &config.data.map_image_path {
        Some(path) => match load_map_image(path) {
            Ok(image) => {
                info!("Loaded map image {:?}", path);
                image
            }
            Err(e) => {
                warn!("{}; showing placeholder", e);
                create_placeholder_map()
            }
        },
        None => {
            info!("No map image configured, showing placeholder");
            create_placeholder_map()
        }
    };

    let size = image.size();
    let map_handle = images.add(image);

    let mut fog = FogSurface::new(size, Handle::default());
    let fog_handle = images.add(fog.texture_image());
    fog.set_texture(fog_handle.clone());

    if let Ok(window) = windows.single() {
        *viewport = viewport_from_window(window, viewport.factor);
    }

    let placement = fit_placement(&viewport, size.as_vec2());
    let scale = config.data.clamp_scale(placement.scale.x);
    map_state.set_spring_config(config.data.spring);
    map_state.jump_to(MapPlacement::new(
        placement.position,
        Vec3::new(scale, scale, 1.0),
    ));
    pointer.set_spring_config(config.data.spring);

    commands.insert_resource(MapImage::new(map_handle.clone(), size));
    commands.insert_resource(fog);

    commands.spawn((
        Camera2d,
        MapCamera,
        Transform::from_translation(Vec3::new(0.0, 0.0, CAMERA_Z)),
    ));
    commands.spawn((
        Sprite::from_image(map_handle),
        Transform::from_xyz(0.0, 0.0, MAP_Z),
        MapSprite,
    ));
    commands.spawn((
        Sprite::from_image(fog_handle),
        Transform::from_xyz(0.0, 0.0, FOG_Z),
        FogSprite,
    ));
}

/// Keep the viewport in step with the primary window
pub fn sync_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let next = viewport_from_window(window, viewport.factor);
    viewport.set_if_neq(next);
}

pub fn apply_spring_config(
    config: Res<MapToolsConfig>,
    mut map_state: ResMut<MapState>,
    mut pointer: ResMut<PointerPosition>,
) {
    if !config.is_changed() {
        return;
    }
    map_state.set_spring_config(config.data.spring);
    pointer.set_spring_config(config.data.spring);
}

pub fn animate_map_state(time: Res<Time>, mut map_state: ResMut<MapState>) {
    if !map_state.is_animating() {
        return;
    }
    map_state.step(time.delta_secs());
}

pub fn animate_pointer(time: Res<Time>, mut pointer: ResMut<PointerPosition>) {
    if pointer.bypass_change_detection().step(time.delta_secs()) {
        pointer.set_changed();
    }
}

/// Requested placement after zooming `lines` wheel lines about a scene point
pub fn zoom_placement(
    target: MapPlacement,
    lines: f32,
    pivot: Vec2,
    config: &crate::config::MapToolsConfigData,
) -> MapPlacement {
    let zoom = (1.0 + config.zoom_step).powf(lines);
    let scale = config.clamp_scale(target.scale.x * zoom);
    target.zoomed_about(pivot, Vec3::new(scale, scale, target.scale.z))
}

/// Wheel zoom about the pointer, clamped to the configured scale range
pub fn zoom_map(
    mut wheel: MessageReader<MouseWheel>,
    config: Res<MapToolsConfig>,
    pointer: Res<PointerPosition>,
    mut map_state: ResMut<MapState>,
) {
    for event in wheel.read() {
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
        };
        if lines == 0.0 {
            continue;
        }

        let pivot = if pointer.is_inside() {
            pointer.target().truncate()
        } else {
            Vec2::ZERO
        };
        let zoomed = zoom_placement(map_state.target(), lines, pivot, &config.data);
        map_state.set_target(MapStateTarget::placement(zoomed));
    }
}

/// Place the map and fog sprites where the map state says the map is
pub fn sync_map_sprites(
    map_state: Res<MapState>,
    viewport: Res<Viewport>,
    mut sprites: Query<(&mut Transform, Has<FogSprite>), Or<(With<MapSprite>, With<FogSprite>)>>,
) {
    if !map_state.is_changed() && !viewport.is_changed() {
        return;
    }

    let placement = map_state.placement();
    for (mut transform, is_fog) in &mut sprites {
        let z = if is_fog { FOG_Z } else { MAP_Z };
        transform.translation = (placement.position.truncate() * viewport.factor).extend(z);
        transform.scale = (placement.scale.truncate() * viewport.factor).extend(1.0);
    }
}
