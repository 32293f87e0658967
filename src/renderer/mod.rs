/// Renderer Module - Data-Oriented Programming (DOP) style
///
/// - texture_atlas_*: slicing the skybox strip into per-face textures
/// - viewport_*: split and scissor math
/// - frame_plan_*: per-frame draw lists, no GPU involved
/// - renderer_*: GPU resources and the render pass
///

pub mod frame_plan_data;
pub mod frame_plan_operations;
pub mod pipelines;
pub mod renderer_data;
pub mod renderer_operations;
pub mod texture_atlas_data;
pub mod texture_atlas_operations;
pub mod vertex;
pub mod viewport_data;
pub mod viewport_operations;

pub use frame_plan_data::{DrawItem, FramePlan, HalfPlan, LitVariant};
pub use frame_plan_operations::{half, lit_variant, plan_frame, plan_scene};
pub use renderer_data::RendererData;
pub use renderer_operations::{init_renderer, render_frame, resize_surface};
pub use texture_atlas_data::{AtlasSlices, AtlasTextureData, AtlasTextureStore, ColorSpace, TextureId};
pub use texture_atlas_operations::{
    apply_atlas_result, dirty_textures, get_texture, populated_count, register_placeholders,
    slice_atlas, slice_tiles,
};
pub use vertex::{MeshVertex, TexturedVertex};
pub use viewport_data::{ScissorRect, SplitPolicy, ViewportSide, ViewportSplit};
pub use viewport_operations::{compute_split, resize_split, scissor_rect, scissor_rects};
