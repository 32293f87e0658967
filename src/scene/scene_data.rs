//! Scene data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in scene_operations.rs and box_geometry.rs

use crate::model::ModelData;
use crate::renderer::texture_atlas_data::TextureId;
use crate::renderer::vertex::TexturedVertex;
use glam::{Mat4, Vec3};

/// Index range drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

/// Box with one group per face: +X, -X, +Y, -Y, +Z, -Z
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGeometryData {
    pub vertices: Vec<TexturedVertex>,
    pub indices: Vec<u16>,
    pub groups: Vec<GeometryGroup>,
}

/// Inward-facing cube, face `k` sampling `materials[k]`
#[derive(Debug, Clone)]
pub struct SkyboxData {
    pub geometry: BoxGeometryData,
    pub materials: Vec<TextureId>,
}

/// A decoded model at its place in the world
#[derive(Debug, Clone)]
pub struct PlacedModelData {
    pub model: ModelData,
    pub transform: Mat4,
}

#[derive(Debug, Clone)]
pub enum Drawable {
    Skybox(SkyboxData),
    Model(PlacedModelData),
}

/// Sky/ground gradient light; `position` gives the sky direction
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereLightData {
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    pub intensity: f32,
    pub position: Vec3,
}

/// One independent scene: background, drawables, its own light
#[derive(Debug, Clone)]
pub struct SceneData {
    pub label: String,

    /// Linear RGBA
    pub background: [f32; 4],

    pub drawables: Vec<Drawable>,
    pub light: HemisphereLightData,

    /// Bumped on every content change so GPU copies can be resynced
    pub revision: u64,
}
