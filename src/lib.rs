//! Pluggable tools for an interactive map view.
//!
//! The map view shows a source image under a fog of war layer. Tools plug into it
//! through [`tool::ToolDescriptor`] records; one tool is active at a time and it
//! alone receives pointer input. [`transform`] maps between scene, canvas and
//! image space under the current pan and zoom.

pub mod builtin;
pub mod config;
pub mod constants;
pub mod map;
pub mod paths;
pub mod theme;
pub mod tool;
pub mod transform;

use bevy::prelude::*;

/// Map view host, tool dispatch and built-in tools
pub struct MapToolsPlugin;

impl Plugin for MapToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(config::ConfigPlugin)
            .add_plugins(map::MapPlugin)
            .add_plugins(tool::ToolPlugin)
            .add_plugins(builtin::BuiltinToolsPlugin);
    }
}
