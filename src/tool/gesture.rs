//! Turns raw press/motion/release samples into the tool input stream.
//!
//! One button is tracked at a time; presses of other buttons while it is held are
//! ignored. A press becomes a drag once the pointer travels `click_threshold`
//! canvas pixels from where it went down. A release that never became a drag
//! produces a click after the pointer-up.

use bevy::prelude::*;

use crate::constants::DEFAULT_CLICK_THRESHOLD;

use super::events::{DragEvent, DragPhase, PointerEvent, ToolInput};

#[derive(Debug, Clone, Copy)]
struct Press {
    button: MouseButton,
    origin: Vec2,
    last: Vec2,
    dragging: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct GestureTracker {
    press: Option<Press>,
    click_threshold: f32,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_THRESHOLD)
    }
}

impl GestureTracker {
    pub fn new(click_threshold: f32) -> Self {
        Self {
            press: None,
            click_threshold: click_threshold.max(0.0),
        }
    }

    pub fn set_click_threshold(&mut self, click_threshold: f32) {
        self.click_threshold = click_threshold.max(0.0);
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|press| press.dragging)
    }

    pub fn press(&mut self, button: MouseButton, canvas: Vec2, scene: Vec3) -> Vec<ToolInput> {
        if self.press.is_some() {
            return Vec::new();
        }

        self.press = Some(Press {
            button,
            origin: canvas,
            last: canvas,
            dragging: false,
        });
        vec![ToolInput::PointerDown(PointerEvent {
            canvas,
            scene,
            button,
        })]
    }

    pub fn motion(&mut self, canvas: Vec2, scene: Vec3) -> Vec<ToolInput> {
        let Some(press) = self.press.as_mut() else {
            return vec![ToolInput::PointerMove(PointerEvent {
                canvas,
                scene,
                button: MouseButton::Left,
            })];
        };

        let mut inputs = vec![ToolInput::PointerMove(PointerEvent {
            canvas,
            scene,
            button: press.button,
        })];

        let movement = canvas - press.origin;
        if press.dragging {
            inputs.push(ToolInput::Drag(DragEvent {
                phase: DragPhase::Move,
                canvas,
                scene,
                delta: canvas - press.last,
                movement,
                button: press.button,
            }));
        } else if movement.length() >= self.click_threshold && movement != Vec2::ZERO {
            press.dragging = true;
            // The first sample carries all travel so far, so deltas sum to movement
            inputs.push(ToolInput::Drag(DragEvent {
                phase: DragPhase::Start,
                canvas,
                scene,
                delta: movement,
                movement,
                button: press.button,
            }));
        }
        press.last = canvas;
        inputs
    }

    pub fn release(&mut self, button: MouseButton, canvas: Vec2, scene: Vec3) -> Vec<ToolInput> {
        let Some(press) = self.press.filter(|press| press.button == button) else {
            return Vec::new();
        };
        self.press = None;

        let pointer = PointerEvent {
            canvas,
            scene,
            button,
        };
        let movement = canvas - press.origin;

        let mut inputs = Vec::with_capacity(2);
        if press.dragging {
            inputs.push(ToolInput::Drag(DragEvent {
                phase: DragPhase::End,
                canvas,
                scene,
                delta: canvas - press.last,
                movement,
                button,
            }));
            inputs.push(ToolInput::PointerUp(pointer));
        } else {
            inputs.push(ToolInput::PointerUp(pointer));
            if movement.length() < self.click_threshold || movement == Vec2::ZERO {
                inputs.push(ToolInput::Click(pointer));
            }
        }
        inputs
    }

    /// Forget the current press without emitting anything
    pub fn cancel(&mut self) {
        self.press = None;
    }
}
