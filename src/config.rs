//! Viewer configuration
//!
//! Defaults reproduce the stock viewer. A TOML file may override any field;
//! missing fields fall back to the defaults.

use crate::camera::CameraConfig;
use crate::constants;
use crate::error::{ViewerError, ViewerResult};
use crate::renderer::SplitPolicy;
use anyhow::Result;
use cgmath::Point3;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main viewer configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,

    /// Directory asset paths are resolved against
    pub asset_root: PathBuf,
    pub model_path: String,
    pub atlas_path: String,
    pub atlas_tile_count: u32,

    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub camera_position: [f32; 3],

    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,

    /// 0xRRGGBB
    pub left_background: u32,
    pub right_background: u32,

    pub light_sky_color: u32,
    pub light_ground_color: u32,
    pub light_intensity: f32,
    pub light_position: [f32; 3],

    pub model_offset: [f32; 3],

    pub split_policy: SplitPolicy,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: constants::window::TITLE.to_string(),
            window_width: constants::window::WIDTH,
            window_height: constants::window::HEIGHT,
            asset_root: PathBuf::from(constants::assets::ASSET_ROOT),
            model_path: constants::assets::MODEL_PATH.to_string(),
            atlas_path: constants::assets::ATLAS_PATH.to_string(),
            atlas_tile_count: constants::assets::ATLAS_TILE_COUNT,
            fov_degrees: constants::camera::FOV_DEGREES,
            near_plane: constants::camera::NEAR_PLANE,
            far_plane: constants::camera::FAR_PLANE,
            camera_position: constants::camera::INITIAL_POSITION,
            rotate_speed: constants::controls::ROTATE_SPEED,
            enable_zoom: constants::controls::ENABLE_ZOOM,
            enable_pan: constants::controls::ENABLE_PAN,
            left_background: constants::scene::LEFT_BACKGROUND,
            right_background: constants::scene::RIGHT_BACKGROUND,
            light_sky_color: constants::scene::LIGHT_SKY_COLOR,
            light_ground_color: constants::scene::LIGHT_GROUND_COLOR,
            light_intensity: constants::scene::LIGHT_INTENSITY,
            light_position: constants::scene::LIGHT_POSITION,
            model_offset: constants::scene::MODEL_OFFSET,
            split_policy: SplitPolicy::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> ViewerResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> ViewerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ViewerError::IoError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let config: Self = toml::from_str(&text).map_err(|e| ViewerError::ConfigParse {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        log::info!("[ViewerConfig::load] Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.atlas_tile_count == 0 {
            return Err(invalid("atlas_tile_count", "0", "must be at least 1").into());
        }

        if self.window_width < constants::window::MIN_WIDTH
            || self.window_height < constants::window::MIN_HEIGHT
        {
            return Err(anyhow::anyhow!(
                "ViewerConfig: Window dimensions too small (min {}x{})",
                constants::window::MIN_WIDTH,
                constants::window::MIN_HEIGHT
            ));
        }

        if self.window_width > constants::window::MAX_DIMENSION
            || self.window_height > constants::window::MAX_DIMENSION
        {
            return Err(anyhow::anyhow!(
                "ViewerConfig: Window dimensions too large (max {0}x{0})",
                constants::window::MAX_DIMENSION
            ));
        }

        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid(
                "fov_degrees",
                &self.fov_degrees.to_string(),
                "must be in (0, 180)",
            )
            .into());
        }

        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            return Err(invalid(
                "near_plane/far_plane",
                &format!("{}/{}", self.near_plane, self.far_plane),
                "need 0 < near < far",
            )
            .into());
        }

        if self.camera_position == constants::camera::PIVOT {
            return Err(invalid(
                "camera_position",
                &format!("{:?}", self.camera_position),
                "must differ from the orbit pivot",
            )
            .into());
        }

        if self.rotate_speed == 0.0 || !self.rotate_speed.is_finite() {
            return Err(invalid(
                "rotate_speed",
                &self.rotate_speed.to_string(),
                "must be finite and non-zero",
            )
            .into());
        }

        log::info!("[ViewerConfig] Configuration validated successfully");
        Ok(())
    }

    /// Camera and orbit settings, aspect taken from the window size
    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            initial_position: Point3::from(self.camera_position),
            pivot: Point3::from(constants::camera::PIVOT),
            fov_degrees: self.fov_degrees,
            aspect_ratio: self.window_width as f32 / self.window_height.max(1) as f32,
            near_plane: self.near_plane,
            far_plane: self.far_plane,
            rotate_speed: self.rotate_speed,
            enable_zoom: self.enable_zoom,
            enable_pan: self.enable_pan,
        }
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ViewerError {
    ViewerError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
