//! Fog brush. Dragging reveals the map under the brush, holding Alt puts fog back.
//!
//! The brush needs the drag for itself, so it takes the drag lock on pointer-down
//! and gives it back on pointer-up. Only the left button paints.

use bevy::prelude::*;

use crate::config::{MapToolsConfig, SaveConfigRequest};
use crate::map::FogBrushMode;
use crate::theme;
use crate::tool::{
    DragEvent, DragResponse, LocalState, MapToolContext, MapToolView, PointerEvent,
    ToolDescriptor, ToolDispatcher, ToolOverlay,
};

pub const DRAW_FOG_TOOL_ID: &str = "draw-fog";

const RADIUS_STEP: f32 = 1.25;
const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 500.0;

/// Brush settings injected from config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogBrush {
    /// Radius in image pixels
    pub radius: f32,
}

impl Default for FogBrush {
    fn default() -> Self {
        Self { radius: 40.0 }
    }
}

/// Stroke in progress
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FogStroke {
    /// Last painted point in image pixels
    pub last: Option<Vec2>,
}

fn brush_mode(is_alt_pressed: bool) -> FogBrushMode {
    if is_alt_pressed {
        FogBrushMode::Cover
    } else {
        FogBrushMode::Reveal
    }
}

fn image_point(ctx: &MapToolContext<'_>, scene: Vec3) -> Vec2 {
    ctx.transform().coordinates().scene_to_image(scene.truncate())
}

fn on_pointer_down(
    event: &PointerEvent,
    ctx: &mut MapToolContext<'_>,
    stroke: &mut LocalState<FogStroke>,
    brush: &FogBrush,
) {
    if event.button != MouseButton::Left {
        return;
    }
    ctx.drag_lock.deny();

    let point = image_point(ctx, event.scene);
    let mode = brush_mode(ctx.is_alt_pressed);
    ctx.fog.paint_circle(point, brush.radius, mode);
    stroke.set(FogStroke { last: Some(point) });
}

fn on_drag(
    event: &DragEvent,
    ctx: &mut MapToolContext<'_>,
    stroke: &mut LocalState<FogStroke>,
    brush: &FogBrush,
) -> DragResponse {
    if event.button != MouseButton::Left {
        return DragResponse::Continue;
    }
    let point = image_point(ctx, event.scene);
    let from = stroke.last.unwrap_or(point);
    let mode = brush_mode(ctx.is_alt_pressed);
    ctx.fog.paint_line(from, point, brush.radius, mode);

    stroke.last = if event.is_last() { None } else { Some(point) };
    DragResponse::Handled
}

fn on_pointer_up(
    event: &PointerEvent,
    ctx: &mut MapToolContext<'_>,
    stroke: &mut LocalState<FogStroke>,
    _brush: &FogBrush,
) {
    if event.button != MouseButton::Left {
        return;
    }
    stroke.last = None;
    ctx.drag_lock.allow();
}

fn render(
    brush: &FogBrush,
    _stroke: &LocalState<FogStroke>,
    ctx: &MapToolView<'_>,
) -> Option<ToolOverlay> {
    let scale = ctx.map_state().scale().x;
    let color = match brush_mode(ctx.is_alt_pressed) {
        FogBrushMode::Reveal => theme::FOG_BRUSH_CIRCLE,
        FogBrushMode::Cover => theme::FOG_BRUSH_COVER,
    };
    Some(ToolOverlay::new().circle(
        ctx.pointer_position().truncate(),
        brush.radius * scale,
        color,
    ))
}

/// `[` and `]` shrink and grow the brush while the fog tool is active. The new
/// radius goes into the config and is saved.
pub fn adjust_brush_radius(
    keyboard: Res<ButtonInput<KeyCode>>,
    dispatcher: Res<ToolDispatcher>,
    mut config: ResMut<MapToolsConfig>,
    mut save: MessageWriter<SaveConfigRequest>,
) {
    if !dispatcher.is_active(DRAW_FOG_TOOL_ID) {
        return;
    }
    let factor = if keyboard.just_pressed(KeyCode::BracketRight) {
        RADIUS_STEP
    } else if keyboard.just_pressed(KeyCode::BracketLeft) {
        RADIUS_STEP.recip()
    } else {
        return;
    };

    config.update(|data| {
        data.fog_brush_radius = (data.fog_brush_radius * factor).clamp(MIN_RADIUS, MAX_RADIUS);
    });
    debug!("Fog brush radius: {:.1}", config.data.fog_brush_radius);
    save.write(SaveConfigRequest);
}

pub fn draw_fog_tool() -> ToolDescriptor<FogStroke, FogBrush> {
    ToolDescriptor::new(DRAW_FOG_TOOL_ID, FogStroke::default)
        .with_label("Draw Fog (F)")
        .with_shortcut(KeyCode::KeyF)
        .with_render(render)
        .on_pointer_down(on_pointer_down)
        .on_drag(on_drag)
        .on_pointer_up(on_pointer_up)
}
