//! Input events delivered to tools.
//!
//! Positions are carried in both canvas pixels and scene units. Convert to image
//! space through the context's transform, which uses the map placement at the
//! moment the handler runs.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer position in canvas pixels
    pub canvas: Vec2,
    /// Pointer position in scene space
    pub scene: Vec3,
    pub button: MouseButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Start,
    Move,
    End,
}

/// Normalized drag gesture sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub phase: DragPhase,
    /// Current pointer position in canvas pixels
    pub canvas: Vec2,
    /// Current pointer position in scene space
    pub scene: Vec3,
    /// Canvas-pixel movement since the previous drag sample
    pub delta: Vec2,
    /// Canvas-pixel movement since the drag started
    pub movement: Vec2,
    pub button: MouseButton,
}

impl DragEvent {
    pub fn is_first(&self) -> bool {
        self.phase == DragPhase::Start
    }

    pub fn is_last(&self) -> bool {
        self.phase == DragPhase::End
    }

    /// Canvas position where the drag began
    pub fn origin(&self) -> Vec2 {
        self.canvas - self.movement
    }
}

/// What a tool's drag handler tells the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragResponse {
    /// Let the host keep processing the gesture (map panning, if allowed)
    #[default]
    Continue,
    /// The tool consumed this drag sample
    Handled,
}

/// One raw input event, in the order the input source produced it
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum ToolInput {
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    PointerMove(PointerEvent),
    Drag(DragEvent),
    Click(PointerEvent),
}

impl ToolInput {
    /// Handler name, used in logs
    pub fn handler_name(&self) -> &'static str {
        match self {
            ToolInput::PointerDown(_) => "on_pointer_down",
            ToolInput::PointerUp(_) => "on_pointer_up",
            ToolInput::PointerMove(_) => "on_pointer_move",
            ToolInput::Drag(_) => "on_drag",
            ToolInput::Click(_) => "on_click",
        }
    }
}

/// Ask the host to make a registered tool the active one
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SelectToolRequest {
    pub id: String,
}

impl SelectToolRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// The map view is going away; deactivate the current tool
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmountMapView;
