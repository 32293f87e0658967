//! Constants for Twin Viewport
//!
//! Every tunable value the viewer starts with. `ViewerConfig::default()` is
//! assembled from these.

/// Camera defaults
pub mod camera {
    /// Vertical field of view in degrees
    pub const FOV_DEGREES: f32 = 75.0;
    pub const NEAR_PLANE: f32 = 0.1;
    pub const FAR_PLANE: f32 = 1000.0;

    /// Camera sits just in front of the pivot so it can rotate in place
    pub const INITIAL_POSITION: [f32; 3] = [0.0, 0.0, 0.01];
    pub const PIVOT: [f32; 3] = [0.0, 0.0, 0.0];
}

/// Orbit control defaults
pub mod controls {
    /// Negative speed inverts rotation relative to drag direction
    pub const ROTATE_SPEED: f32 = -0.25;
    pub const ENABLE_ZOOM: bool = false;
    pub const ENABLE_PAN: bool = false;

    /// Minimum distance of the polar angle from either pole, in radians
    pub const POLAR_EPSILON: f32 = 0.001;

    /// Distance scale per wheel line
    pub const ZOOM_STEP: f32 = 0.95;
    /// Closest the camera may dolly to its pivot
    pub const MIN_DISTANCE: f32 = 0.001;
    pub const PIXELS_PER_SCROLL_LINE: f64 = 40.0;
}

/// Scene defaults
pub mod scene {
    pub const LEFT_BACKGROUND: u32 = 0xbcd48f;
    pub const RIGHT_BACKGROUND: u32 = 0x8fbcd4;

    pub const LIGHT_SKY_COLOR: u32 = 0xffffff;
    pub const LIGHT_GROUND_COLOR: u32 = 0x444444;
    pub const LIGHT_INTENSITY: f32 = 3.0;
    pub const LIGHT_POSITION: [f32; 3] = [-2.0, 2.0, 2.0];

    pub const MODEL_OFFSET: [f32; 3] = [0.75, 0.0, -1.0];

    /// Edge length of the skybox cube
    pub const SKYBOX_SIZE: f32 = 1.0;
}

/// Asset defaults
pub mod assets {
    pub const ASSET_ROOT: &str = ".";
    pub const MODEL_PATH: &str = "static/models/Sword/sword.glb";
    pub const ATLAS_PATH: &str = "static/images/sun_temple_stripe.jpg";

    /// One tile per cube face
    pub const ATLAS_TILE_COUNT: u32 = 6;
}

/// Window defaults and limits
pub mod window {
    pub const TITLE: &str = "Twin Viewport";
    pub const WIDTH: u32 = 1280;
    pub const HEIGHT: u32 = 720;

    pub const MIN_WIDTH: u32 = 2;
    pub const MIN_HEIGHT: u32 = 1;
    pub const MAX_DIMENSION: u32 = 16384;
}

/// Convert a packed 0xRRGGBB colour into linear-space RGBA floats.
///
/// Colours are authored in sRGB like CSS hex colours, the render targets
/// are sRGB so shaders work in linear space.
pub fn hex_to_linear_rgba(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| -> f32 {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), 1.0]
}
