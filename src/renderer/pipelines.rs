//! Render pipelines
//!
//! Three pipelines share one camera bind group at group 0 (the background
//! pipeline uses group 0 for its colour instead):
//! - background: fullscreen triangle, solid colour, never writes depth
//! - unlit: textured skybox faces
//! - lit: model primitives under the hemisphere light, one pipeline per
//!   `LitVariant`
//!
//! All of them render into a multisampled target when the adapter allows it.

use super::frame_plan_data::LitVariant;
use super::renderer_data::PipelineSet;
use super::vertex::{mesh_vertex_layout, textured_vertex_layout};
use crate::error::{ViewerError, ViewerResult};
use crate::model::WrapMode;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Preferred MSAA sample count
pub const MSAA_SAMPLE_COUNT: u32 = 4;

/// Every lit variant, in pipeline slot order
pub const LIT_VARIANTS: [LitVariant; 4] = [
    LitVariant {
        double_sided: false,
        blended: false,
    },
    LitVariant {
        double_sided: true,
        blended: false,
    },
    LitVariant {
        double_sided: false,
        blended: true,
    },
    LitVariant {
        double_sided: true,
        blended: true,
    },
];

pub const BACKGROUND_SHADER: &str = include_str!("../shaders/render/background.wgsl");
pub const UNLIT_SHADER: &str = include_str!("../shaders/render/unlit.wgsl");
pub const LIT_SHADER: &str = include_str!("../shaders/render/lit.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Binding slots, mirrored in the WGSL sources
pub mod bindings {
    pub const CAMERA_GROUP: u32 = 0;
    pub const LIGHT_GROUP: u32 = 1;
    pub const TEXTURE_GROUP: u32 = 1;
    pub const MESH_GROUP: u32 = 2;
    pub const BACKGROUND_GROUP: u32 = 0;
}

/// Check that `entry_point` is declared as a `stage` function in `source`
pub fn validate_shader_entry_point(
    name: &str,
    source: &str,
    entry_point: &str,
    stage: &str,
) -> ViewerResult<()> {
    let fn_pattern = format!("fn {}(", entry_point);
    let lines: Vec<&str> = source.lines().collect();

    let Some(line_index) = lines.iter().position(|line| line.contains(&fn_pattern)) else {
        return Err(ViewerError::ShaderValidation {
            shader: name.to_string(),
            message: format!("entry point '{}' not found", entry_point),
        });
    };

    let annotated = lines[..line_index]
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty() && !line.starts_with("//"))
        .map_or(false, |line| line.contains(stage));

    if !annotated {
        return Err(ViewerError::ShaderValidation {
            shader: name.to_string(),
            message: format!("entry point '{}' is missing {}", entry_point, stage),
        });
    }

    Ok(())
}

/// Slot of `variant` in `PipelineSet::lit`
pub fn lit_pipeline_index(variant: LitVariant) -> usize {
    variant.double_sided as usize | (variant.blended as usize) << 1
}

/// `MSAA_SAMPLE_COUNT` if both the colour and depth formats support it, else 1
pub fn choose_sample_count(
    color: wgpu::TextureFormatFeatureFlags,
    depth: wgpu::TextureFormatFeatureFlags,
) -> u32 {
    if color.sample_count_supported(MSAA_SAMPLE_COUNT)
        && depth.sample_count_supported(MSAA_SAMPLE_COUNT)
    {
        MSAA_SAMPLE_COUNT
    } else {
        1
    }
}

pub fn address_mode(mode: WrapMode) -> wgpu::AddressMode {
    match mode {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

/// Linear sampler with the given wrap on u and v
pub fn create_sampler(device: &wgpu::Device, label: &str, wrap: [WrapMode; 2]) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode(wrap[0]),
        address_mode_v: address_mode(wrap[1]),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

fn validate_render_shader(name: &str, source: &str) -> ViewerResult<()> {
    validate_shader_entry_point(name, source, VERTEX_ENTRY, "@vertex")?;
    validate_shader_entry_point(name, source, FRAGMENT_ENTRY, "@fragment")
}

fn create_shader(device: &wgpu::Device, name: &str, source: &str) -> ViewerResult<wgpu::ShaderModule> {
    validate_render_shader(name, source)?;
    log::debug!(
        "[pipelines::create_shader] Creating {} ({} chars)",
        name,
        source.len()
    );

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn depth_state(compare: wgpu::CompareFunction, write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    layouts: &'a [&'a wgpu::BindGroupLayout],
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    cull_mode: Option<wgpu::Face>,
    depth: wgpu::DepthStencilState,
    blend: wgpu::BlendState,
}

fn create_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
    desc: PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: VERTEX_ENTRY,
            buffers: desc.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: FRAGMENT_ENTRY,
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(desc.depth),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Build every layout and pipeline for a surface of `surface_format`
pub fn create_pipeline_set(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
) -> ViewerResult<PipelineSet> {
    log::info!(
        "[pipelines::create_pipeline_set] Creating pipelines for {:?} at {}x MSAA",
        surface_format,
        sample_count
    );

    let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Camera Bind Group Layout"),
        entries: &[uniform_entry(
            0,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        )],
    });
    let background_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Background Bind Group Layout"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
    });
    let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Texture Bind Group Layout"),
        entries: &[texture_entry(0), sampler_entry(1)],
    });
    let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Light Bind Group Layout"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
    });
    let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Mesh Bind Group Layout"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            texture_entry(1),
            sampler_entry(2),
        ],
    });

    let background_shader = create_shader(device, "background.wgsl", BACKGROUND_SHADER)?;
    let unlit_shader = create_shader(device, "unlit.wgsl", UNLIT_SHADER)?;
    let lit_shader = create_shader(device, "lit.wgsl", LIT_SHADER)?;

    let background = create_pipeline(
        device,
        surface_format,
        sample_count,
        PipelineDesc {
            label: "Background Pipeline",
            shader: &background_shader,
            layouts: &[&background_layout],
            buffers: &[],
            cull_mode: None,
            depth: depth_state(wgpu::CompareFunction::Always, false),
            blend: wgpu::BlendState::REPLACE,
        },
    );

    let unlit = create_pipeline(
        device,
        surface_format,
        sample_count,
        PipelineDesc {
            label: "Unlit Pipeline",
            shader: &unlit_shader,
            layouts: &[&camera_layout, &texture_layout],
            buffers: &[textured_vertex_layout()],
            cull_mode: Some(wgpu::Face::Back),
            depth: depth_state(wgpu::CompareFunction::Less, true),
            blend: wgpu::BlendState::REPLACE,
        },
    );

    let lit = LIT_VARIANTS.map(|variant| {
        let label = format!(
            "Lit Pipeline (double_sided={}, blended={})",
            variant.double_sided, variant.blended
        );
        create_pipeline(
            device,
            surface_format,
            sample_count,
            PipelineDesc {
                label: &label,
                shader: &lit_shader,
                layouts: &[&camera_layout, &light_layout, &mesh_layout],
                buffers: &[mesh_vertex_layout()],
                cull_mode: (!variant.double_sided).then_some(wgpu::Face::Back),
                depth: depth_state(wgpu::CompareFunction::Less, !variant.blended),
                blend: if variant.blended {
                    wgpu::BlendState::ALPHA_BLENDING
                } else {
                    wgpu::BlendState::REPLACE
                },
            },
        )
    });

    let sampler = create_sampler(device, "Atlas Sampler", [WrapMode::ClampToEdge; 2]);

    Ok(PipelineSet {
        camera_layout,
        background_layout,
        texture_layout,
        light_layout,
        mesh_layout,
        background,
        unlit,
        lit,
        sampler,
        sample_count,
    })
}
