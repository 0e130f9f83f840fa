use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{DEFAULT_CLICK_THRESHOLD, DEFAULT_MAX_CONSECUTIVE_FAULTS, DEFAULT_TOOL_ID};
use crate::map::SpringConfig;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file: {0}")]
    Read(#[source] std::io::Error),
    #[error("configuration file was corrupted: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("could not serialize configuration: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("could not write configuration file: {0}")]
    Write(#[source] std::io::Error),
}

/// Map view configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapToolsConfigData {
    /// Neutral tool selected at startup and after a tool keeps faulting
    pub default_tool: String,

    /// Faulting handler calls in a row before falling back to `default_tool`
    pub max_consecutive_faults: u32,

    /// Max pointer travel in canvas pixels for a press to count as a click
    pub click_threshold: f32,

    /// Relative scale change per wheel line
    pub zoom_step: f32,
    pub min_scale: f32,
    pub max_scale: f32,

    /// Tween for map placement and pointer smoothing
    pub spring: SpringConfig,

    /// Fog brush radius in image pixels
    pub fog_brush_radius: f32,

    /// Grid cell edge in image pixels, used by the measure tool
    pub grid_cell_size: f32,

    /// Map image shown on startup; a placeholder is used when unset
    pub map_image_path: Option<PathBuf>,
}

impl Default for MapToolsConfigData {
    fn default() -> Self {
        Self {
            default_tool: DEFAULT_TOOL_ID.to_string(),
            max_consecutive_faults: DEFAULT_MAX_CONSECUTIVE_FAULTS,
            click_threshold: DEFAULT_CLICK_THRESHOLD,
            zoom_step: 0.1,
            min_scale: 0.05,
            max_scale: 20.0,
            spring: SpringConfig::default(),
            fog_brush_radius: 40.0,
            grid_cell_size: 70.0,
            map_image_path: None,
        }
    }
}

impl MapToolsConfigData {
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale.max(self.min_scale))
    }

    /// Replace values that would break zooming with their defaults
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.min_scale.is_nan() || self.min_scale <= 0.0 {
            warn!("min_scale must be positive, using {}", defaults.min_scale);
            self.min_scale = defaults.min_scale;
        }
        if self.max_scale.is_nan() || self.max_scale < self.min_scale {
            let max_scale = defaults.max_scale.max(self.min_scale);
            warn!("max_scale must not be below min_scale, using {}", max_scale);
            self.max_scale = max_scale;
        }
        if self.zoom_step.is_nan() || self.zoom_step <= -1.0 {
            warn!("zoom_step must be above -1, using {}", defaults.zoom_step);
            self.zoom_step = defaults.zoom_step;
        }
        self
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct MapToolsConfig {
    /// The persisted configuration data
    pub data: MapToolsConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for MapToolsConfig {
    fn default() -> Self {
        Self::new(crate::paths::config_file())
    }
}

impl MapToolsConfig {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            data: MapToolsConfigData::default(),
            config_path,
            dirty: false,
        }
    }

    /// Edit the configuration, marking it dirty if anything changed
    pub fn update(&mut self, f: impl FnOnce(&mut MapToolsConfigData)) {
        let before = self.data.clone();
        f(&mut self.data);
        if self.data != before {
            self.dirty = true;
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether a notification is pending
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Result of loading config from disk
struct LoadConfigResult {
    data: MapToolsConfigData,
    /// Set if config was reset to defaults due to an error
    reset_reason: Option<ConfigError>,
}

fn read_config(path: &Path) -> Result<MapToolsConfigData, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
    serde_json::from_str(&json).map_err(ConfigError::Parse)
}

/// Load configuration from disk
fn load_config(path: &Path) -> LoadConfigResult {
    if !path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            data: MapToolsConfigData::default(),
            reset_reason: None,
        };
    }

    match read_config(path) {
        Ok(data) => {
            info!("Loaded config from {:?}", path);
            LoadConfigResult {
                data: data.validated(),
                reset_reason: None,
            }
        }
        Err(e) => {
            warn!("Failed to load config file: {}", e);
            LoadConfigResult {
                data: MapToolsConfigData::default(),
                reset_reason: Some(e),
            }
        }
    }
}

/// Save configuration to disk
fn save_config(data: &MapToolsConfigData, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(data).map_err(ConfigError::Serialize)?;
    std::fs::write(path, json).map_err(ConfigError::Write)
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<MapToolsConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason.to_string());
    }
}

/// Tell the user once that their config file was replaced with defaults
fn report_config_reset(mut reset_notification: ResMut<ConfigResetNotification>) {
    if !reset_notification.show {
        return;
    }
    warn!(
        "Configuration was reset to defaults: {}",
        reset_notification.reason.as_deref().unwrap_or("unknown reason")
    );
    reset_notification.show = false;
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<MapToolsConfig>,
) {
    for _ in events.read() {
        if !config.dirty {
            continue;
        }
        match save_config(&config.data, &config.config_path) {
            Ok(()) => {
                info!("Config saved to {:?}", config.config_path);
                config.dirty = false;
            }
            Err(e) => error!("Failed to save config: {}", e),
        }
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapToolsConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_systems(
                Startup,
                (load_config_system, report_config_reset)
                    .chain()
                    .in_set(ConfigLoaded),
            )
            .add_systems(
                Update,
                save_config_system.run_if(on_message::<SaveConfigRequest>),
            );
    }
}
