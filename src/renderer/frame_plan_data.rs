//! Frame plan data - Pure DOP
//!
//! Everything a frame draws, decided before any GPU work happens. Two plans
//! built from the same inputs compare equal.

use super::texture_atlas_data::TextureId;
use super::viewport_data::{ScissorRect, ViewportSide};
use crate::camera::CameraUniform;
use crate::scene::GeometryGroup;

/// Pipeline state a model primitive needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LitVariant {
    /// No back-face culling
    pub double_sided: bool,
    /// Alpha blended without depth writes
    pub blended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawItem {
    /// One skybox face, drawn unlit with its atlas tile
    SkyboxFace {
        drawable: usize,
        group: GeometryGroup,
        texture: TextureId,
    },
    /// One primitive of a placed model, drawn lit
    ModelMesh {
        drawable: usize,
        mesh: usize,
        variant: LitVariant,
    },
}

/// One scissored half of the surface
#[derive(Debug, Clone, PartialEq)]
pub struct HalfPlan {
    pub side: ViewportSide,
    pub scissor: ScissorRect,
    pub background: [f32; 4],
    pub scene_revision: u64,
    pub draws: Vec<DrawItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub surface_width: u32,
    pub surface_height: u32,

    /// Shared by both halves
    pub camera: CameraUniform,

    /// Left first; halves without pixels are absent
    pub halves: Vec<HalfPlan>,
}
