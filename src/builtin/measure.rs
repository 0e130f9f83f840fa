//! Ruler. Drag with the left button to measure a distance in image pixels and grid
//! cells; a left click clears it. Other buttons fall through to map panning.

use bevy::prelude::*;

use crate::theme;
use crate::tool::{
    DragEvent, DragResponse, LocalState, MapToolContext, MapToolView, PointerEvent,
    ToolDescriptor, ToolOverlay,
};

pub const MEASURE_TOOL_ID: &str = "measure";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasureSettings {
    /// Grid cell edge in image pixels
    pub grid_cell_size: f32,
}

impl Default for MeasureSettings {
    fn default() -> Self {
        Self {
            grid_cell_size: 70.0,
        }
    }
}

/// Current measurement, both ends in image pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurement {
    pub start: Option<Vec2>,
    pub end: Option<Vec2>,
}

impl Measurement {
    pub fn distance(&self) -> Option<f32> {
        Some(self.start?.distance(self.end?))
    }

    pub fn cells(&self, settings: &MeasureSettings) -> Option<f32> {
        if settings.grid_cell_size <= 0.0 {
            return None;
        }
        Some(self.distance()? / settings.grid_cell_size)
    }
}

fn on_drag(
    event: &DragEvent,
    ctx: &mut MapToolContext<'_>,
    measurement: &mut LocalState<Measurement>,
    settings: &MeasureSettings,
) -> DragResponse {
    if event.button != MouseButton::Left {
        return DragResponse::Continue;
    }
    let transform = ctx.transform();
    let coordinates = transform.coordinates();
    if event.is_first() {
        measurement.start = Some(coordinates.canvas_to_image(event.origin()));
    }
    measurement.end = Some(coordinates.canvas_to_image(event.canvas));

    if event.is_last()
        && let (Some(distance), Some(cells)) =
            (measurement.distance(), measurement.cells(settings))
    {
        debug!("Measured {:.1} px ({:.1} cells)", distance, cells);
    }

    // Measuring must not drag the map along
    DragResponse::Handled
}

fn on_click(
    event: &PointerEvent,
    _ctx: &mut MapToolContext<'_>,
    measurement: &mut LocalState<Measurement>,
    _settings: &MeasureSettings,
) {
    if event.button != MouseButton::Left {
        return;
    }
    measurement.set(Measurement::default());
}

fn render(
    _settings: &MeasureSettings,
    measurement: &LocalState<Measurement>,
    ctx: &MapToolView<'_>,
) -> Option<ToolOverlay> {
    let (start, end) = (measurement.start?, measurement.end?);
    let transform = ctx.transform();
    let coordinates = transform.coordinates();
    let (from, to) = (coordinates.image_to_scene(start), coordinates.image_to_scene(end));

    Some(
        ToolOverlay::new()
            .line(from, to, theme::MEASURE_LINE)
            .circle(from, theme::MEASURE_ENDPOINT_RADIUS, theme::MEASURE_ENDPOINT)
            .circle(to, theme::MEASURE_ENDPOINT_RADIUS, theme::MEASURE_ENDPOINT),
    )
}

pub fn measure_tool() -> ToolDescriptor<Measurement, MeasureSettings> {
    ToolDescriptor::new(MEASURE_TOOL_ID, Measurement::default)
        .with_label("Measure (M)")
        .with_shortcut(KeyCode::KeyM)
        .with_render(render)
        .on_drag(on_drag)
        .on_click(on_click)
}
