//! Tools that ship with the map view.

mod draw_fog;
mod measure;
mod pan;


pub use draw_fog::{DRAW_FOG_TOOL_ID, FogBrush, FogStroke, adjust_brush_radius, draw_fog_tool};
pub use measure::{MEASURE_TOOL_ID, MeasureSettings, Measurement, measure_tool};
pub use pan::{PAN_TOOL_ID, pan_tool};

use bevy::prelude::*;

use crate::config::{ConfigLoaded, MapToolsConfig};
use crate::map::MapViewSet;
use crate::tool::{MapToolAppExt, ToolContextStates};

/// Feed config values into the built-in tools' context state
fn apply_builtin_settings(config: Res<MapToolsConfig>, mut states: ResMut<ToolContextStates>) {
    if !config.is_changed() {
        return;
    }

    let brush = FogBrush {
        radius: config.data.fog_brush_radius,
    };
    if let Err(e) = states.set(DRAW_FOG_TOOL_ID, brush) {
        warn!("Could not apply fog brush settings: {}", e);
    }

    let measure = MeasureSettings {
        grid_cell_size: config.data.grid_cell_size,
    };
    if let Err(e) = states.set(MEASURE_TOOL_ID, measure) {
        warn!("Could not apply measure settings: {}", e);
    }
}

pub struct BuiltinToolsPlugin;

impl Plugin for BuiltinToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_map_tool(pan_tool())
            .add_map_tool(draw_fog_tool())
            .add_map_tool(measure_tool())
            .add_systems(Startup, apply_builtin_settings.after(ConfigLoaded))
            .add_systems(
                Update,
                (adjust_brush_radius, apply_builtin_settings)
                    .chain()
                    .in_set(MapViewSet::Input),
            );
    }
}
