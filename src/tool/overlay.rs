//! Render slot output.
//!
//! A tool's render function returns a [`ToolOverlay`]: a list of shapes in scene
//! space. The host scales it to world units and draws it every frame with the
//! [`ToolOverlayGizmoGroup`], so a render function stays a pure function of its
//! inputs.

use bevy::gizmos::config::GizmoConfigGroup;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayShape {
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Rect {
        center: Vec2,
        size: Vec2,
        color: Color,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolOverlay {
    pub shapes: Vec<OverlayShape>,
}

impl ToolOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, from: Vec2, to: Vec2, color: Color) -> Self {
        self.shapes.push(OverlayShape::Line { from, to, color });
        self
    }

    pub fn circle(mut self, center: Vec2, radius: f32, color: Color) -> Self {
        self.shapes.push(OverlayShape::Circle {
            center,
            radius,
            color,
        });
        self
    }

    pub fn rect(mut self, center: Vec2, size: Vec2, color: Color) -> Self {
        self.shapes.push(OverlayShape::Rect {
            center,
            size,
            color,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Same shapes with positions and sizes multiplied by `factor`, e.g. scene to world units
    pub fn scaled(&self, factor: f32) -> Self {
        let shapes = self
            .shapes
            .iter()
            .map(|shape| match *shape {
                OverlayShape::Line { from, to, color } => OverlayShape::Line {
                    from: from * factor,
                    to: to * factor,
                    color,
                },
                OverlayShape::Circle {
                    center,
                    radius,
                    color,
                } => OverlayShape::Circle {
                    center: center * factor,
                    radius: radius * factor,
                    color,
                },
                OverlayShape::Rect {
                    center,
                    size,
                    color,
                } => OverlayShape::Rect {
                    center: center * factor,
                    size: size * factor,
                    color,
                },
            })
            .collect();
        Self { shapes }
    }
}

/// Gizmo group for tool overlays, drawn above the map and fog
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct ToolOverlayGizmoGroup;

pub fn draw_overlay(gizmos: &mut Gizmos<ToolOverlayGizmoGroup>, overlay: &ToolOverlay) {
    for shape in &overlay.shapes {
        match *shape {
            OverlayShape::Line { from, to, color } => gizmos.line_2d(from, to, color),
            OverlayShape::Circle {
                center,
                radius,
                color,
            } => {
                gizmos.circle_2d(Isometry2d::from_translation(center), radius, color);
            }
            OverlayShape::Rect {
                center,
                size,
                color,
            } => {
                gizmos.rect_2d(Isometry2d::from_translation(center), size, color);
            }
        }
    }
}
