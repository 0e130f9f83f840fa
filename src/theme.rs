//! Centralized color theme for the map view.
//!
//! This module provides all colors used by the host and the built-in tools.
//! Modify values here to change the map view's color scheme.

use bevy::prelude::Color;

// ============================================================================
// Map View
// ============================================================================

/// Clear color behind the map
pub const MAP_BACKGROUND: Color = Color::srgb(0.08, 0.08, 0.1);

// ============================================================================
// Fog of War Colors
// ============================================================================

/// Yellow circle for the fog brush preview
pub const FOG_BRUSH_CIRCLE: Color = Color::srgba(1.0, 1.0, 0.0, 0.8);

/// Red circle while the brush puts fog back
pub const FOG_BRUSH_COVER: Color = Color::srgba(1.0, 0.3, 0.3, 0.8);

// ============================================================================
// Measure Tool Colors
// ============================================================================

/// Measure line
pub const MEASURE_LINE: Color = Color::srgb(0.2, 0.6, 1.0);

/// End point markers of the measure line
pub const MEASURE_ENDPOINT: Color = Color::srgba(0.2, 0.6, 1.0, 0.8);

/// Radius of the end point markers, in scene units
pub const MEASURE_ENDPOINT_RADIUS: f32 = 4.0;
