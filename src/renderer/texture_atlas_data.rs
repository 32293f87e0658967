//! Texture Atlas Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in texture_atlas_operations.rs

use crate::assets::AssetLoad;
use image::RgbaImage;

/// Index into `AtlasTextureStore::textures`
pub type TextureId = usize;

/// How texel values are to be interpreted when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Linear,
    Srgb,
}

/// One square tile cut from an atlas strip
#[derive(Debug, Clone)]
pub struct AtlasTextureData {
    /// Position in the strip, 0 is leftmost
    pub tile_index: u32,

    /// Side length in pixels, 0 while still a placeholder
    pub size: u32,

    pub color_space: ColorSpace,

    /// Set when pixels changed and the GPU copy is stale
    pub dirty: bool,

    pub pixels: Option<RgbaImage>,
}

/// Every atlas texture of the session; never shrinks
#[derive(Debug, Default)]
pub struct AtlasTextureStore {
    pub textures: Vec<AtlasTextureData>,
}

/// Placeholder handles handed out by `slice_atlas` plus the pending decode
#[derive(Debug)]
pub struct AtlasSlices {
    pub ids: Vec<TextureId>,
    pub load: AssetLoad<Vec<RgbaImage>>,
}
