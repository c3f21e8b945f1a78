//! Viewport configuration
//!
//! TOML-backed settings for camera behavior and the default view. Loading
//! is the only fallible surface of the crate; everything downstream takes
//! already validated values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::ShowFlags;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration contents
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value was out of range
    #[error("invalid config value: {0}")]
    Validation(String),
}

/// Camera settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Pan/zoom speed factor
    pub move_speed: f32,
    /// Rotation speed factor
    pub look_speed: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip plane distance
    pub near_plane: f32,
    /// Far clip plane distance
    pub far_plane: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 1.0,
            look_speed: 1.0,
            fov_degrees: 55.0,
            near_plane: 0.1,
            far_plane: 4096.0,
        }
    }
}

/// Which scene categories are shown by default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    /// Show unmerged world geometry
    pub split_world: bool,
    /// Show merged world geometry
    pub merged_world: bool,
    /// Show script object display models
    pub object_geometry: bool,
    /// Show script object collision
    pub object_collision: bool,
    /// Show world collision geometry
    pub world_collision: bool,
    /// Show light billboards
    pub lights: bool,
    /// Show the skybox
    pub sky: bool,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            split_world: false,
            merged_world: true,
            object_geometry: true,
            object_collision: false,
            world_collision: false,
            lights: true,
            sky: true,
        }
    }
}

impl ShowConfig {
    /// Translate into the scene's show flag mask
    pub fn to_show_flags(&self) -> ShowFlags {
        let mut flags = ShowFlags::empty();
        flags.set(ShowFlags::SPLIT_WORLD, self.split_world);
        flags.set(ShowFlags::MERGED_WORLD, self.merged_world);
        flags.set(ShowFlags::OBJECT_GEOMETRY, self.object_geometry);
        flags.set(ShowFlags::OBJECT_COLLISION, self.object_collision);
        flags.set(ShowFlags::WORLD_COLLISION, self.world_collision);
        flags.set(ShowFlags::LIGHTS, self.lights);
        flags.set(ShowFlags::SKY, self.sky);
        flags
    }
}

/// Top-level viewport configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Camera settings
    pub camera: CameraConfig,
    /// Default show flags
    pub show: ShowConfig,
}

impl ViewportConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_contents(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_str_contents(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.near_plane <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "near_plane must be positive, got {}",
                self.camera.near_plane
            )));
        }
        if self.camera.far_plane <= self.camera.near_plane {
            return Err(ConfigError::Validation(format!(
                "far_plane ({}) must be greater than near_plane ({})",
                self.camera.far_plane, self.camera.near_plane
            )));
        }
        if !(1.0..180.0).contains(&self.camera.fov_degrees) {
            return Err(ConfigError::Validation(format!(
                "fov_degrees must be in [1, 180), got {}",
                self.camera.fov_degrees
            )));
        }
        Ok(())
    }
}
