/// Camera Module - Data-Oriented Programming (DOP) style
///
/// This module follows pure DOP principles:
/// - camera_data.rs: Pure data structures with NO methods
/// - camera_operations.rs: Pure functions that operate on data
///

pub mod camera_data;
pub mod camera_operations;

// Re-export data structures
pub use camera_data::{CameraConfig, CameraData, CameraUniform, OrbitControlsData};

// Re-export all operations
pub use camera_operations::{
    // Initialization
    init_camera_from_config,
    init_controls_from_config,

    // View/projection
    build_view_matrix,
    build_projection_matrix,
    build_camera_uniform,

    // Updates
    update_aspect_ratio,

    // Orbit
    orbit_rotate,
    orbit_zoom,
    orbit_pan,
    spherical_offset,

    // Utilities
    calculate_forward_vector,

    // Diagnostics
    log_camera_context,
};
