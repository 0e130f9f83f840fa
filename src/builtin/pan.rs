use bevy::prelude::*;

use crate::tool::ToolDescriptor;

pub const PAN_TOOL_ID: &str = "pan";

/// Neutral tool. It has no handlers, so every drag pans the map.
pub fn pan_tool() -> ToolDescriptor<(), ()> {
    ToolDescriptor::new(PAN_TOOL_ID, || ())
        .with_label("Pan (V)")
        .with_shortcut(KeyCode::KeyV)
}
