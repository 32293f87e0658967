//! Model data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in model_operations.rs

use glam::Mat4;
use image::RgbaImage;

/// How a material's alpha channel is used
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    /// Fragments below the cutoff are discarded
    Mask { cutoff: f32 },
    Blend,
}

/// Texture addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// One drawable primitive of a decoded model
#[derive(Debug, Clone)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,

    /// Linear RGBA multiplier
    pub base_color: [f32; 4],
    pub base_color_texture: Option<RgbaImage>,
    /// Sampler wrap of the base colour texture, [u, v]
    pub wrap: [WrapMode; 2],

    pub alpha_mode: AlphaMode,
    /// Back faces are drawn too
    pub double_sided: bool,

    /// Node transform accumulated from the model root
    pub local_transform: Mat4,
}

/// A decoded model, positioned at its own origin
#[derive(Debug, Clone)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshData>,
}
