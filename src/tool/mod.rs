//! Pluggable map tools.
//!
//! A tool is registered once as a [`ToolDescriptor`] and becomes active when it
//! is selected. Only the active tool receives input. Each tool keeps private
//! local state for the length of one activation, and reads context state that
//! outside configuration may change at any time.

mod context;
mod context_state;
mod descriptor;
mod dispatcher;
mod error;
mod events;
mod gesture;
mod overlay;
mod systems;

#[cfg(test)]
mod tests;

pub use context::{
    DragLock, MapToolContext, MapToolParams, MapToolView, MapToolViewParams, ModifierState,
};
pub use context_state::ToolContextStates;
pub use descriptor::{DragHandler, LocalState, PointerHandler, RenderFn, ToolDescriptor};
pub use dispatcher::{DispatchOutcome, ToolDispatcher, ToolInfo, ToolTransition};
pub use error::ToolError;
pub use events::{
    DragEvent, DragPhase, DragResponse, PointerEvent, SelectToolRequest, ToolInput,
    UnmountMapView,
};
pub use gesture::GestureTracker;
pub use overlay::{OverlayShape, ToolOverlay, ToolOverlayGizmoGroup, draw_overlay};

use bevy::prelude::*;

use crate::config::ConfigLoaded;
use crate::map::MapViewSet;

/// Registration of tools on an [`App`]
pub trait MapToolAppExt {
    /// Register a tool and give it its default context state. A second tool with
    /// the same id is rejected and logged.
    fn add_map_tool<L, C>(&mut self, descriptor: ToolDescriptor<L, C>) -> &mut Self
    where
        L: Send + Sync + 'static,
        C: Default + Send + Sync + 'static;
}

impl MapToolAppExt for App {
    fn add_map_tool<L, C>(&mut self, descriptor: ToolDescriptor<L, C>) -> &mut Self
    where
        L: Send + Sync + 'static,
        C: Default + Send + Sync + 'static,
    {
        self.init_resource::<ToolDispatcher>()
            .init_resource::<ToolContextStates>();

        let world = self.world_mut();
        world.resource_scope(|world, mut dispatcher: Mut<ToolDispatcher>| {
            let mut context_states = world.resource_mut::<ToolContextStates>();
            if let Err(e) = dispatcher.register(descriptor, &mut context_states) {
                error!("Could not register map tool: {}", e);
            }
        });
        self
    }
}

pub struct ToolPlugin;

impl Plugin for ToolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolDispatcher>()
            .init_resource::<ToolContextStates>()
            .init_resource::<DragLock>()
            .init_resource::<ModifierState>()
            .init_resource::<GestureTracker>()
            .init_gizmo_group::<ToolOverlayGizmoGroup>()
            .add_message::<ToolInput>()
            .add_message::<SelectToolRequest>()
            .add_message::<UnmountMapView>()
            .add_systems(
                Startup,
                (systems::apply_tool_config, systems::select_default_tool)
                    .chain()
                    .after(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    systems::apply_tool_config,
                    systems::update_modifiers,
                    systems::collect_pointer_input,
                )
                    .in_set(MapViewSet::Input),
            )
            .add_systems(
                Update,
                (
                    systems::handle_tool_shortcuts,
                    systems::handle_select_tool_requests,
                    systems::handle_unmount,
                    systems::route_tool_input,
                )
                    .chain()
                    .in_set(MapViewSet::Dispatch),
            )
            .add_systems(
                Update,
                systems::draw_tool_overlay.in_set(MapViewSet::Render),
            );
    }
}
