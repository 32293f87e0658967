//! Camera data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in camera_operations.rs

use cgmath::Point3;

/// Camera data structure - pure data, no methods
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraData {
    /// Camera position in world space
    pub position: Point3<f32>,

    /// Point the camera orbits and looks at
    pub pivot: Point3<f32>,

    /// Field of view (vertical, radians)
    pub fov_radians: f32,

    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,

    /// Near clipping plane distance
    pub near_plane: f32,

    /// Far clipping plane distance
    pub far_plane: f32,
}

/// Orbit control settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControlsData {
    /// Full turns per element height of drag; negative inverts direction
    pub rotate_speed: f32,

    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,

    /// Polar angle limits (radians from +Y)
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

/// Camera uniform buffer data for GPU
/// Must match shader layout exactly
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// View matrix (4x4, column-major)
    pub view_matrix: [[f32; 4]; 4],

    /// Projection matrix (4x4, column-major, wgpu depth range)
    pub projection_matrix: [[f32; 4]; 4],

    /// View-projection matrix (4x4, column-major)
    pub view_projection_matrix: [[f32; 4]; 4],

    /// Camera position (vec3 + padding)
    pub camera_position: [f32; 4],
}

/// Camera configuration for initialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub initial_position: Point3<f32>,
    pub pivot: Point3<f32>,
    pub fov_degrees: f32,
    pub aspect_ratio: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        use crate::constants::{camera, controls};

        Self {
            initial_position: Point3::from(camera::INITIAL_POSITION),
            pivot: Point3::from(camera::PIVOT),
            fov_degrees: camera::FOV_DEGREES,
            aspect_ratio: 16.0 / 9.0,
            near_plane: camera::NEAR_PLANE,
            far_plane: camera::FAR_PLANE,
            rotate_speed: controls::ROTATE_SPEED,
            enable_zoom: controls::ENABLE_ZOOM,
            enable_pan: controls::ENABLE_PAN,
        }
    }
}
