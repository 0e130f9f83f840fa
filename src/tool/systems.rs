use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowEvent};

use crate::config::MapToolsConfig;
use crate::constants::DEFAULT_TOOL_ID;
use crate::map::{MapImage, MapState, MapStateTarget, PointerPosition};
use crate::transform::{MapTransform, Viewport};

use super::context::{DragLock, MapToolContext, MapToolParams, MapToolViewParams, ModifierState};
use super::context_state::ToolContextStates;
use super::dispatcher::ToolDispatcher;
use super::events::{SelectToolRequest, ToolInput, UnmountMapView};
use super::gesture::GestureTracker;
use super::overlay::{ToolOverlayGizmoGroup, draw_overlay};

/// Startup system: select the configured neutral tool
pub fn select_default_tool(
    config: Res<MapToolsConfig>,
    mut dispatcher: ResMut<ToolDispatcher>,
    mut drag_lock: ResMut<DragLock>,
) {
    let configured = config.data.default_tool.as_str();
    let default_tool = if dispatcher.contains(configured) {
        configured
    } else {
        warn!(
            "Configured default tool `{}` is not registered, using `{}`",
            configured, DEFAULT_TOOL_ID
        );
        DEFAULT_TOOL_ID
    };

    dispatcher.set_fallback(default_tool);
    if let Err(e) = dispatcher.select(default_tool, &mut drag_lock) {
        error!("Could not select default tool: {}", e);
    }
}

/// Push tool-related config values into the dispatcher and gesture tracker
pub fn apply_tool_config(
    config: Res<MapToolsConfig>,
    mut dispatcher: ResMut<ToolDispatcher>,
    mut gestures: ResMut<GestureTracker>,
) {
    if !config.is_changed() {
        return;
    }
    dispatcher.set_max_consecutive_faults(config.data.max_consecutive_faults);
    gestures.set_click_threshold(config.data.click_threshold);
}

pub fn update_modifiers(keyboard: Res<ButtonInput<KeyCode>>, mut modifiers: ResMut<ModifierState>) {
    let alt = keyboard.pressed(KeyCode::AltLeft) || keyboard.pressed(KeyCode::AltRight);
    modifiers.set_if_neq(ModifierState { alt });
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    dispatcher: Res<ToolDispatcher>,
    mut requests: MessageWriter<SelectToolRequest>,
) {
    let pressed = dispatcher.tools().find(|tool| {
        tool.shortcut
            .is_some_and(|key| keyboard.just_pressed(key))
    });
    if let Some(tool) = pressed {
        requests.write(SelectToolRequest::new(tool.id));
    }
}

pub fn handle_select_tool_requests(
    mut requests: MessageReader<SelectToolRequest>,
    mut dispatcher: ResMut<ToolDispatcher>,
    mut drag_lock: ResMut<DragLock>,
    mut gestures: ResMut<GestureTracker>,
) {
    for request in requests.read() {
        match dispatcher.select(&request.id, &mut drag_lock) {
            // The old tool's pending gesture goes away with its local state
            Ok(Some(_)) => gestures.cancel(),
            Ok(None) => {}
            Err(e) => warn!("Ignoring tool selection: {}", e),
        }
    }
}

pub fn handle_unmount(
    mut unmount: MessageReader<UnmountMapView>,
    mut dispatcher: ResMut<ToolDispatcher>,
    mut drag_lock: ResMut<DragLock>,
    mut gestures: ResMut<GestureTracker>,
) {
    if unmount.read().last().is_none() {
        return;
    }
    dispatcher.deactivate(&mut drag_lock);
    gestures.cancel();
}

/// Turn window cursor and button events into tool input, keeping their order
#[allow(clippy::too_many_arguments)]
pub fn collect_pointer_input(
    mut window_events: MessageReader<WindowEvent>,
    windows: Query<Entity, With<PrimaryWindow>>,
    viewport: Res<Viewport>,
    map_state: Res<MapState>,
    map_image: Res<MapImage>,
    mut gestures: ResMut<GestureTracker>,
    mut pointer: ResMut<PointerPosition>,
    mut last_cursor: Local<Option<Vec2>>,
    mut tool_input: MessageWriter<ToolInput>,
) {
    let Ok(primary) = windows.single() else {
        window_events.clear();
        return;
    };

    let transform = MapTransform::new(*viewport, map_state.placement(), map_image.size_f32());
    let to_scene = |canvas: Vec2| transform.coordinates().canvas_to_scene(canvas);

    for event in window_events.read() {
        let inputs = match event {
            WindowEvent::CursorMoved(moved) if moved.window == primary => {
                let canvas = moved.position * viewport.pixel_ratio;
                let scene = to_scene(canvas);
                *last_cursor = Some(canvas);
                pointer.track(scene);
                gestures.motion(canvas, scene.extend(0.0))
            }
            WindowEvent::CursorLeft(left) if left.window == primary => {
                pointer.leave();
                continue;
            }
            WindowEvent::MouseButtonInput(input) if input.window == primary => {
                let Some(canvas) = *last_cursor else {
                    continue;
                };
                let scene = to_scene(canvas).extend(0.0);
                match input.state {
                    ButtonState::Pressed => gestures.press(input.button, canvas, scene),
                    ButtonState::Released => gestures.release(input.button, canvas, scene),
                }
            }
            _ => continue,
        };

        for input in inputs {
            tool_input.write(input);
        }
    }
}

fn pan_map(ctx: &mut MapToolContext<'_>, canvas_delta: Vec2) {
    let scene_delta = ctx.transform().vector().canvas_to_scene(canvas_delta);
    let target = ctx.map_state().target().translated(scene_delta.extend(0.0));
    ctx.set_map_state(MapStateTarget::position(target.position));
}

/// Deliver input to the active tool, then pan the map with drags nobody claimed.
///
/// Input still queued when the active tool changes belongs to the previous tool's
/// gesture and is dropped.
pub fn route_tool_input(
    mut inputs: MessageReader<ToolInput>,
    mut dispatcher: ResMut<ToolDispatcher>,
    context_states: Res<ToolContextStates>,
    mut params: MapToolParams,
    mut seen_generation: Local<Option<u64>>,
) {
    let generation = dispatcher.generation();
    if seen_generation.is_some_and(|seen| seen != generation) {
        *seen_generation = Some(generation);
        inputs.clear();
        return;
    }

    let selected = dispatcher.active_id();
    for input in inputs.read() {
        params.with_context(|ctx| {
            // Local state lives in the dispatcher; writing it is not a change
            let outcome = dispatcher
                .bypass_change_detection()
                .dispatch(input, ctx, &context_states);

            if let ToolInput::Drag(drag) = input
                && ctx.is_drag_allowed()
                && !outcome.drag_handled()
            {
                pan_map(ctx, drag.delta);
            }
        });
    }

    // A fault fallback swaps the selected tool; that one is worth reporting
    if dispatcher.active_id() != selected {
        dispatcher.set_changed();
    }
    *seen_generation = Some(dispatcher.generation());
}

pub fn draw_tool_overlay(
    dispatcher: Res<ToolDispatcher>,
    context_states: Res<ToolContextStates>,
    params: MapToolViewParams,
    mut gizmos: Gizmos<ToolOverlayGizmoGroup>,
) {
    let view = params.view();
    if let Some(overlay) = dispatcher.render(&view, &context_states) {
        draw_overlay(&mut gizmos, &overlay.scaled(view.viewport.factor));
    }
}
