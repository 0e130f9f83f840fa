mod animation;
mod fog;
mod map_image;
mod pointer;
mod state;
mod view;

pub use animation::{Spring, SpringConfig};
pub use fog::{FogBrushMode, FogSurface, sync_fog_texture};
pub use map_image::{MapImage, MapImageError, create_placeholder_map, load_map_image};
pub use pointer::PointerPosition;
pub use state::{MapState, MapStateTarget};
pub use view::{FogSprite, MapCamera, MapSprite, fit_placement, zoom_placement};

use bevy::prelude::*;

use crate::config::ConfigLoaded;
use crate::transform::Viewport;

/// Frame phases of the map view, run in this order
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapViewSet {
    /// Window, keyboard and pointer sampling
    Input,
    /// Tool selection and input routing
    Dispatch,
    /// Map and pointer animation
    Animate,
    /// Sprite placement, fog upload and overlays
    Render,
}

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewport>()
            .init_resource::<MapState>()
            .init_resource::<MapImage>()
            .init_resource::<FogSurface>()
            .init_resource::<PointerPosition>()
            .configure_sets(
                Update,
                (
                    MapViewSet::Input,
                    MapViewSet::Dispatch,
                    MapViewSet::Animate,
                    MapViewSet::Render,
                )
                    .chain(),
            )
            .add_systems(Startup, view::setup_map_view.after(ConfigLoaded))
            .add_systems(
                Update,
                (view::sync_viewport, view::apply_spring_config).in_set(MapViewSet::Input),
            )
            .add_systems(Update, view::zoom_map.in_set(MapViewSet::Dispatch))
            .add_systems(
                Update,
                (view::animate_map_state, view::animate_pointer).in_set(MapViewSet::Animate),
            )
            .add_systems(
                Update,
                (view::sync_map_sprites, sync_fog_texture).in_set(MapViewSet::Render),
            );
    }
}
