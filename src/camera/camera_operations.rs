//! Camera operations - Pure DOP functions
//!
//! All functions are pure: they take data, return new data, no side effects.
//! No methods, no self, just transformations.

use super::camera_data::{CameraConfig, CameraData, CameraUniform, OrbitControlsData};
use crate::constants::controls::{MIN_DISTANCE, POLAR_EPSILON, ZOOM_STEP};
use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Rad, Vector3};
use std::f32::consts::{PI, TAU};

/// Maps GL clip depth [-1, 1] to wgpu clip depth [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize camera from config
pub fn init_camera_from_config(config: &CameraConfig) -> CameraData {
    CameraData {
        position: config.initial_position,
        pivot: config.pivot,
        fov_radians: config.fov_degrees.to_radians(),
        aspect_ratio: config.aspect_ratio,
        near_plane: config.near_plane,
        far_plane: config.far_plane,
    }
}

/// Initialize orbit controls from config
pub fn init_controls_from_config(config: &CameraConfig) -> OrbitControlsData {
    OrbitControlsData {
        rotate_speed: config.rotate_speed,
        enable_rotate: true,
        enable_zoom: config.enable_zoom,
        enable_pan: config.enable_pan,
        min_polar_angle: 0.0,
        max_polar_angle: PI,
    }
}

// ============================================================================
// VIEW/PROJECTION MATRICES
// ============================================================================

/// Build view matrix from camera data
pub fn build_view_matrix(camera: &CameraData) -> Matrix4<f32> {
    Matrix4::look_at_rh(camera.position, camera.pivot, Vector3::unit_y())
}

/// Build projection matrix from camera data
pub fn build_projection_matrix(camera: &CameraData) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
        * cgmath::perspective(
            Rad(camera.fov_radians),
            camera.aspect_ratio,
            camera.near_plane,
            camera.far_plane,
        )
}

/// Build camera uniform for GPU
pub fn build_camera_uniform(camera: &CameraData) -> CameraUniform {
    let view_matrix = build_view_matrix(camera);
    let projection_matrix = build_projection_matrix(camera);
    let view_projection = projection_matrix * view_matrix;

    CameraUniform {
        view_matrix: view_matrix.into(),
        projection_matrix: projection_matrix.into(),
        view_projection_matrix: view_projection.into(),
        camera_position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
    }
}

// ============================================================================
// UPDATES
// ============================================================================

/// Update aspect ratio (e.g., on window resize)
pub fn update_aspect_ratio(camera: &CameraData, width: u32, height: u32) -> CameraData {
    let mut new_camera = *camera;
    if width == 0 || height == 0 {
        return new_camera;
    }
    new_camera.aspect_ratio = width as f32 / height as f32;
    new_camera
}

// ============================================================================
// ORBIT
// ============================================================================

/// Spherical coordinates (radius, theta, phi) of the camera around its pivot.
///
/// theta is measured around +Y from +Z, phi down from +Y.
pub fn spherical_offset(camera: &CameraData) -> (f32, f32, f32) {
    let offset = camera.position - camera.pivot;
    let radius = offset.magnitude();
    if radius == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let theta = offset.x.atan2(offset.z);
    let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
    (radius, theta, phi)
}

/// Offset vector for spherical coordinates
pub fn offset_from_spherical(radius: f32, theta: f32, phi: f32) -> Vector3<f32> {
    let sin_phi_radius = phi.sin() * radius;
    Vector3::new(
        sin_phi_radius * theta.sin(),
        phi.cos() * radius,
        sin_phi_radius * theta.cos(),
    )
}

/// Rotate the camera around its pivot for a pointer drag of (dx, dy) pixels.
///
/// A drag across the full element height turns `rotate_speed` full turns.
/// The radius and pivot never change.
pub fn orbit_rotate(
    camera: &CameraData,
    controls: &OrbitControlsData,
    dx: f32,
    dy: f32,
    element_height: u32,
) -> CameraData {
    if !controls.enable_rotate || element_height == 0 {
        return *camera;
    }

    let height = element_height as f32;
    let rotate_left = TAU * dx * controls.rotate_speed / height;
    let rotate_up = TAU * dy * controls.rotate_speed / height;

    let (radius, theta, phi) = spherical_offset(camera);
    if radius == 0.0 {
        return *camera;
    }

    let min_phi = controls.min_polar_angle.max(POLAR_EPSILON);
    let max_phi = controls.max_polar_angle.min(PI - POLAR_EPSILON);
    let new_theta = theta - rotate_left;
    let new_phi = (phi - rotate_up).clamp(min_phi, max_phi);

    let mut new_camera = *camera;
    new_camera.position = camera.pivot + offset_from_spherical(radius, new_theta, new_phi);
    new_camera
}

/// Dolly towards the pivot by `scroll` wheel lines. Ignored while zoom is
/// disabled. The distance stays between `MIN_DISTANCE` and the far plane.
pub fn orbit_zoom(camera: &CameraData, controls: &OrbitControlsData, scroll: f32) -> CameraData {
    if !controls.enable_zoom || scroll == 0.0 {
        return *camera;
    }

    let offset = camera.position - camera.pivot;
    let distance = offset.magnitude();
    if distance == 0.0 {
        return *camera;
    }

    let target = (distance * ZOOM_STEP.powf(scroll)).clamp(MIN_DISTANCE, camera.far_plane);
    let mut new_camera = *camera;
    new_camera.position = camera.pivot + offset * (target / distance);
    new_camera
}

/// Slide camera and pivot in the view plane. Ignored while pan is disabled.
pub fn orbit_pan(
    camera: &CameraData,
    controls: &OrbitControlsData,
    dx: f32,
    dy: f32,
    element_height: u32,
) -> CameraData {
    if !controls.enable_pan || element_height == 0 {
        return *camera;
    }

    let forward = calculate_forward_vector(camera);
    let right = forward.cross(Vector3::unit_y()).normalize();
    let up = right.cross(forward).normalize();

    // Pan so the point under the cursor follows it at pivot depth
    let distance = (camera.position - camera.pivot).magnitude();
    let world_per_pixel = 2.0 * distance * (camera.fov_radians / 2.0).tan() / element_height as f32;
    let shift = right * (-dx * world_per_pixel) + up * (dy * world_per_pixel);

    let mut new_camera = *camera;
    new_camera.position += shift;
    new_camera.pivot += shift;
    new_camera
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Unit vector from the camera towards the pivot
pub fn calculate_forward_vector(camera: &CameraData) -> Vector3<f32> {
    let forward = camera.pivot - camera.position;
    if forward.magnitude2() == 0.0 {
        return -Vector3::unit_z();
    }
    forward.normalize()
}

/// Log camera context for debugging
pub fn log_camera_context(camera: &CameraData) {
    let (radius, theta, phi) = spherical_offset(camera);
    let pivot = camera.pivot.to_vec();

    log::debug!(
        "[Camera] Position: ({:.3}, {:.3}, {:.3}) | Pivot: ({:.2}, {:.2}, {:.2}) | Radius: {:.3}",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        pivot.x,
        pivot.y,
        pivot.z,
        radius
    );

    log::debug!(
        "[Camera] Theta: {:.1}° | Phi: {:.1}° | FOV: {:.1}° | Aspect: {:.3}",
        theta.to_degrees(),
        phi.to_degrees(),
        camera.fov_radians.to_degrees(),
        camera.aspect_ratio
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{MetricSpace, Point3};

    fn default_rig() -> (CameraData, OrbitControlsData) {
        let config = CameraConfig::default();
        (
            init_camera_from_config(&config),
            init_controls_from_config(&config),
        )
    }

    #[test]
    fn test_default_camera_matches_viewer_defaults() {
        let (camera, controls) = default_rig();
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.01));
        assert!((camera.fov_radians - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.near_plane, 0.1);
        assert_eq!(camera.far_plane, 1000.0);
        assert_eq!(controls.rotate_speed, -0.25);
        assert!(!controls.enable_zoom);
        assert!(!controls.enable_pan);
    }

    #[test]
    fn test_update_aspect_ratio() {
        let (camera, _) = default_rig();
        let resized = update_aspect_ratio(&camera, 1920, 1080);
        assert!((resized.aspect_ratio - 1920.0 / 1080.0).abs() < 1e-6);

        let unchanged = update_aspect_ratio(&resized, 800, 0);
        assert_eq!(unchanged.aspect_ratio, resized.aspect_ratio);
    }

    #[test]
    fn test_rotation_keeps_radius_and_pivot() {
        let (camera, controls) = default_rig();
        let rotated = orbit_rotate(&camera, &controls, 123.0, -45.0, 720);

        assert_ne!(rotated.position, camera.position);
        assert_eq!(rotated.pivot, camera.pivot);
        let radius = rotated.position.distance(rotated.pivot);
        assert!((radius - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_rightward_drag_is_inverted() {
        let (camera, controls) = default_rig();
        let (_, theta_before, _) = spherical_offset(&camera);

        // A quarter of the height at speed -0.25 turns theta by +pi/8
        let rotated = orbit_rotate(&camera, &controls, 180.0, 0.0, 720);
        let (_, theta_after, _) = spherical_offset(&rotated);
        assert!((theta_after - theta_before - PI / 8.0).abs() < 1e-4);

        // camera swings towards +X, so the view turns left
        assert!(rotated.position.x > 0.0);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let (camera, controls) = default_rig();
        let rotated = orbit_rotate(&camera, &controls, 0.0, 100_000.0, 100);
        let (_, _, phi) = spherical_offset(&rotated);
        assert!(phi > 0.0 && phi < PI);
        assert!(build_view_matrix(&rotated).x.x.is_finite());
    }

    #[test]
    fn test_zoom_and_pan_disabled() {
        let (camera, controls) = default_rig();
        assert_eq!(orbit_zoom(&camera, &controls, 5.0), camera);
        assert_eq!(orbit_pan(&camera, &controls, 10.0, 10.0, 720), camera);
    }

    #[test]
    fn test_zoom_and_pan_when_enabled() {
        let (camera, mut controls) = default_rig();
        controls.enable_zoom = true;
        controls.enable_pan = true;

        let zoomed = orbit_zoom(&camera, &controls, 1.0);
        assert!(zoomed.position.distance(zoomed.pivot) < 0.01);

        let panned = orbit_pan(&camera, &controls, 10.0, 0.0, 720);
        assert_ne!(panned.pivot, camera.pivot);
        let before = camera.position - camera.pivot;
        let after = panned.position - panned.pivot;
        assert!((before - after).magnitude() < 1e-6);
    }

    #[test]
    fn test_zoom_is_bounded() {
        let (camera, mut controls) = default_rig();
        controls.enable_zoom = true;

        let close = orbit_zoom(&camera, &controls, 1000.0);
        assert!((close.position.distance(close.pivot) - MIN_DISTANCE).abs() < 1e-6);

        let far = orbit_zoom(&camera, &controls, -1000.0);
        assert!((far.position.distance(far.pivot) - camera.far_plane).abs() < 1e-2);
        assert!(far.position.z > 0.0);
    }

    #[test]
    fn test_projection_maps_near_plane_to_zero_depth() {
        let (camera, _) = default_rig();
        let projection = build_projection_matrix(&camera);
        let near = projection * cgmath::Vector4::new(0.0, 0.0, -camera.near_plane, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        let far = projection * cgmath::Vector4::new(0.0, 0.0, -camera.far_plane, 1.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_uniform_is_deterministic() {
        let (camera, _) = default_rig();
        assert_eq!(build_camera_uniform(&camera), build_camera_uniform(&camera));
    }
}
