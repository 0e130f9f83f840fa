//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

use bevy::math::UVec2;

/// Default window width in logical pixels (also the initial viewport width)
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in logical pixels (also the initial viewport height)
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Size of the checkerboard shown when no map image is available
pub const PLACEHOLDER_MAP_SIZE: UVec2 = UVec2::new(1400, 1000);

/// Edge length of one placeholder checker square, in image pixels
pub const PLACEHOLDER_CHECKER_SIZE: u32 = 70;

/// Id of the tool selected at startup and after repeated tool faults
pub const DEFAULT_TOOL_ID: &str = "pan";

/// Faulting handler calls in a row before the dispatcher gives up on a tool
pub const DEFAULT_MAX_CONSECUTIVE_FAULTS: u32 = 3;

/// Max pointer travel, in canvas pixels, for a press to still count as a click
pub const DEFAULT_CLICK_THRESHOLD: f32 = 4.0;

/// Z of the map sprite
pub const MAP_Z: f32 = 0.0;

/// Z of the fog sprite, just above the map
pub const FOG_Z: f32 = 1.0;

/// Camera height above the map plane
pub const CAMERA_Z: f32 = 1000.0;
