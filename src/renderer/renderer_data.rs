//! Renderer Data - Pure DOP
//!
//! NO METHODS. Just data.
//! GPU handles live here, everything that touches them is in
//! renderer_operations.rs and pipelines.rs.

use static_assertions::const_assert_eq;

/// Per-half background colour
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BackgroundUniform {
    pub color: [f32; 4],
}

/// Hemisphere light; `direction[3]` carries the intensity
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    pub direction: [f32; 4],
}

/// World placement and material of one model primitive
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    /// x: alpha cutoff (0 when not masked), y: 1 to force opaque output
    pub alpha: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<BackgroundUniform>(), 16);
const_assert_eq!(std::mem::size_of::<LightUniform>(), 48);
const_assert_eq!(std::mem::size_of::<MeshUniform>(), 160);

/// Bind group layouts, pipelines and the shared sampler
pub struct PipelineSet {
    pub camera_layout: wgpu::BindGroupLayout,
    pub background_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub light_layout: wgpu::BindGroupLayout,
    pub mesh_layout: wgpu::BindGroupLayout,

    pub background: wgpu::RenderPipeline,
    pub unlit: wgpu::RenderPipeline,
    /// Indexed by `lit_pipeline_index`
    pub lit: [wgpu::RenderPipeline; 4],

    /// Clamped sampler for atlas tiles
    pub sampler: wgpu::Sampler,

    /// MSAA samples every pipeline was built for
    pub sample_count: u32,
}

/// GPU copy of one atlas tile
pub struct GpuTextureData {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub size: (u32, u32),
}

pub struct GpuMeshData {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

pub enum GpuDrawableData {
    Skybox {
        vertex_buffer: wgpu::Buffer,
        index_buffer: wgpu::Buffer,
    },
    Model {
        meshes: Vec<GpuMeshData>,
    },
}

/// GPU resources of one scene
pub struct SceneGpuData {
    pub background_buffer: wgpu::Buffer,
    pub background_bind_group: wgpu::BindGroup,
    pub light_buffer: wgpu::Buffer,
    pub light_bind_group: wgpu::BindGroup,
    pub drawables: Vec<GpuDrawableData>,

    /// Scene revision the drawables were built from
    pub synced_revision: Option<u64>,
}

/// An offscreen attachment sized to the surface
pub struct RenderTargetData {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Everything the render thread owns on the GPU side
pub struct RendererData {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub depth: RenderTargetData,
    /// Multisampled colour target, resolved into the surface; absent at 1x
    pub msaa: Option<RenderTargetData>,
    pub pipelines: PipelineSet,

    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,

    /// Indexed by `TextureId`
    pub textures: Vec<Option<GpuTextureData>>,

    /// [left, right]
    pub scenes: [SceneGpuData; 2],

    pub frame_count: u64,
}
