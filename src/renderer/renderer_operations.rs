//! Renderer Operations - DOP functions over `RendererData`
//!
//! One render pass per frame. Each half sets its scissor, paints its
//! background and draws its scene with the shared camera uniform. The pass
//! renders into a multisampled target that resolves into the surface.

use super::frame_plan_data::{DrawItem, FramePlan, HalfPlan};
use super::pipelines::{
    bindings, choose_sample_count, create_pipeline_set, create_sampler, lit_pipeline_index,
    DEPTH_FORMAT,
};
use super::renderer_data::{
    BackgroundUniform, GpuDrawableData, GpuMeshData, GpuTextureData, LightUniform, MeshUniform,
    PipelineSet, RenderTargetData, RendererData, SceneGpuData,
};
use super::texture_atlas_data::{AtlasTextureStore, ColorSpace, TextureId};
use super::texture_atlas_operations::{dirty_textures, get_texture, get_texture_mut, mark_uploaded};
use super::vertex::MeshVertex;
use super::viewport_data::ViewportSide;
use crate::camera::CameraUniform;
use crate::error::{OptionExt, ViewerError, ViewerResult};
use crate::model::{AlphaMode, MeshData};
use crate::scene::{light_direction, Drawable, HemisphereLightData, SceneData};
use glam::Mat4;
use image::RgbaImage;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

const BLACK_PIXEL: [u8; 4] = [0, 0, 0, 255];
const WHITE_PIXEL: [u8; 4] = [255, 255, 255, 255];

pub fn side_index(side: ViewportSide) -> usize {
    match side {
        ViewportSide::Left => 0,
        ViewportSide::Right => 1,
    }
}

pub fn texture_format(color_space: ColorSpace) -> wgpu::TextureFormat {
    match color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

pub fn build_background_uniform(color: [f32; 4]) -> BackgroundUniform {
    BackgroundUniform { color }
}

pub fn build_light_uniform(light: &HemisphereLightData) -> LightUniform {
    let direction = light_direction(light);
    LightUniform {
        sky_color: light.sky_color,
        ground_color: light.ground_color,
        direction: [direction.x, direction.y, direction.z, light.intensity],
    }
}

/// World matrix is `placement * mesh.local_transform`
pub fn build_mesh_uniform(placement: Mat4, mesh: &MeshData) -> MeshUniform {
    let model = placement * mesh.local_transform;
    let alpha = match mesh.alpha_mode {
        AlphaMode::Opaque => [0.0, 1.0, 0.0, 0.0],
        AlphaMode::Mask { cutoff } => [cutoff, 1.0, 0.0, 0.0],
        AlphaMode::Blend => [0.0; 4],
    };
    MeshUniform {
        model: model.to_cols_array_2d(),
        normal_matrix: model.inverse().transpose().to_cols_array_2d(),
        base_color: mesh.base_color,
        alpha,
    }
}

/// Interleave the attribute streams of a mesh
pub fn build_mesh_vertices(mesh: &MeshData) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| MeshVertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

/// Create the surface, device, pipelines and scene resources for `window`
pub fn init_renderer(window: Arc<Window>) -> ViewerResult<RendererData> {
    pollster::block_on(init_renderer_async(window))
}

async fn init_renderer_async(window: Arc<Window>) -> ViewerResult<RendererData> {
    let size = window.inner_size();
    log::info!(
        "[Renderer::init] Creating renderer for {}x{} window",
        size.width,
        size.height
    );

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let surface = instance.create_surface(Arc::clone(&window))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_viewer(|| ViewerError::DeviceNotFound)?;

    log::info!("[Renderer::init] Using adapter {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Twin Viewport Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
            },
            None,
        )
        .await?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .copied()
        .or_else(|| surface_caps.formats.first().copied())
        .ok_or_viewer(|| ViewerError::SurfaceCreation {
            error: "surface reports no supported formats".to_string(),
        })?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    let sample_count = choose_sample_count(
        adapter.get_texture_format_features(surface_format).flags,
        adapter.get_texture_format_features(DEPTH_FORMAT).flags,
    );
    let pipelines = create_pipeline_set(&device, surface_format, sample_count)?;
    let (depth, msaa) = create_render_targets(&device, &surface_config, sample_count);

    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Camera Buffer"),
        size: std::mem::size_of::<CameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Camera Bind Group"),
        layout: &pipelines.camera_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: camera_buffer.as_entire_binding(),
        }],
    });

    let scenes = [
        create_scene_gpu(&device, &pipelines, "left"),
        create_scene_gpu(&device, &pipelines, "right"),
    ];

    log::info!(
        "[Renderer::init] Surface {:?} {}x{}",
        surface_format,
        surface_config.width,
        surface_config.height
    );

    Ok(RendererData {
        surface,
        device,
        queue,
        surface_config,
        depth,
        msaa,
        pipelines,
        camera_buffer,
        camera_bind_group,
        textures: Vec::new(),
        scenes,
        frame_count: 0,
    })
}

fn create_render_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> RenderTargetData {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    RenderTargetData { texture, view }
}

/// Depth target plus, above 1x, the multisampled colour target
pub fn create_render_targets(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> (RenderTargetData, Option<RenderTargetData>) {
    let depth = create_render_target(
        device,
        "Depth Texture",
        DEPTH_FORMAT,
        config.width,
        config.height,
        sample_count,
    );
    let msaa = (sample_count > 1).then(|| {
        create_render_target(
            device,
            "MSAA Color Texture",
            config.format,
            config.width,
            config.height,
            sample_count,
        )
    });
    (depth, msaa)
}

fn create_scene_gpu(device: &wgpu::Device, pipelines: &PipelineSet, label: &str) -> SceneGpuData {
    let background_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{} Background Buffer", label)),
        size: std::mem::size_of::<BackgroundUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let background_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{} Background Bind Group", label)),
        layout: &pipelines.background_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: background_buffer.as_entire_binding(),
        }],
    });

    let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{} Light Buffer", label)),
        size: std::mem::size_of::<LightUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{} Light Bind Group", label)),
        layout: &pipelines.light_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
    });

    SceneGpuData {
        background_buffer,
        background_bind_group,
        light_buffer,
        light_bind_group,
        drawables: Vec::new(),
        synced_revision: None,
    }
}

/// Reconfigure the surface and render targets; zero sizes are ignored
pub fn resize_surface(renderer: &mut RendererData, width: u32, height: u32) {
    if width == 0 || height == 0 {
        log::debug!("[Renderer::resize] Ignoring {}x{}", width, height);
        return;
    }

    log::info!("[Renderer::resize] Resizing to {}x{}", width, height);
    renderer.surface_config.width = width;
    renderer.surface_config.height = height;
    renderer
        .surface
        .configure(&renderer.device, &renderer.surface_config);
    let (depth, msaa) = create_render_targets(
        &renderer.device,
        &renderer.surface_config,
        renderer.pipelines.sample_count,
    );
    renderer.depth = depth;
    renderer.msaa = msaa;
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    pixels: &RgbaImage,
    color_space: ColorSpace,
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: pixels.width(),
        height: pixels.height(),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: texture_format(color_space),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels.as_raw(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * pixels.width()),
            rows_per_image: Some(pixels.height()),
        },
        size,
    );

    texture
}

fn create_tile_texture(
    renderer: &RendererData,
    store: &AtlasTextureStore,
    id: TextureId,
) -> ViewerResult<GpuTextureData> {
    let tile = get_texture(store, id)?;
    let placeholder;
    let (pixels, color_space) = match &tile.pixels {
        Some(pixels) => (pixels, tile.color_space),
        None => {
            placeholder = RgbaImage::from_pixel(1, 1, image::Rgba(BLACK_PIXEL));
            (&placeholder, ColorSpace::Linear)
        }
    };

    let label = format!("Atlas Tile {}", tile.tile_index);
    let texture = upload_rgba(&renderer.device, &renderer.queue, &label, pixels, color_space);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = renderer
        .device
        .create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout: &renderer.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&renderer.pipelines.sampler),
                },
            ],
        });

    Ok(GpuTextureData {
        texture,
        view,
        bind_group,
        size: (pixels.width(), pixels.height()),
    })
}

/// Refresh GPU copies of textures that are new or dirty. Returns how many
/// were uploaded.
pub fn upload_dirty_textures(
    renderer: &mut RendererData,
    store: &mut AtlasTextureStore,
) -> ViewerResult<usize> {
    let mut pending = dirty_textures(store);
    pending.extend(
        (renderer.textures.len()..store.textures.len()).filter(|id| !store.textures[*id].dirty),
    );

    if pending.is_empty() {
        return Ok(0);
    }

    if renderer.textures.len() < store.textures.len() {
        renderer.textures.resize_with(store.textures.len(), || None);
    }

    for &id in &pending {
        let gpu_texture = create_tile_texture(renderer, store, id)?;
        log::debug!(
            "[Renderer::upload_dirty_textures] Uploaded texture {} ({}x{})",
            id,
            gpu_texture.size.0,
            gpu_texture.size.1
        );
        renderer.textures[id] = Some(gpu_texture);
        mark_uploaded(get_texture_mut(store, id)?);
    }

    Ok(pending.len())
}

fn create_mesh_gpu(renderer: &RendererData, placement: Mat4, mesh: &MeshData) -> GpuMeshData {
    let device = &renderer.device;

    let vertices = build_mesh_vertices(mesh);
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Vertex Buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Index Buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Uniform Buffer"),
        contents: bytemuck::bytes_of(&build_mesh_uniform(placement, mesh)),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let white;
    let pixels = match &mesh.base_color_texture {
        Some(pixels) => pixels,
        None => {
            white = RgbaImage::from_pixel(1, 1, image::Rgba(WHITE_PIXEL));
            &white
        }
    };
    let texture = upload_rgba(
        device,
        &renderer.queue,
        "Mesh Base Color",
        pixels,
        ColorSpace::Srgb,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = create_sampler(device, "Mesh Sampler", mesh.wrap);

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Mesh Bind Group"),
        layout: &renderer.pipelines.mesh_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    GpuMeshData {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
        uniform_buffer,
        bind_group,
    }
}

fn create_drawable_gpu(renderer: &RendererData, drawable: &Drawable) -> GpuDrawableData {
    match drawable {
        Drawable::Skybox(skybox) => GpuDrawableData::Skybox {
            vertex_buffer: renderer
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Skybox Vertex Buffer"),
                    contents: bytemuck::cast_slice(&skybox.geometry.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            index_buffer: renderer
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Skybox Index Buffer"),
                    contents: bytemuck::cast_slice(&skybox.geometry.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
        },
        Drawable::Model(placed) => GpuDrawableData::Model {
            meshes: placed
                .model
                .meshes
                .iter()
                .map(|mesh| create_mesh_gpu(renderer, placed.transform, mesh))
                .collect(),
        },
    }
}

/// Rebuild the GPU copy of a scene when its revision moved
pub fn sync_scene_gpu(renderer: &mut RendererData, side: ViewportSide, scene: &SceneData) {
    let index = side_index(side);
    if renderer.scenes[index].synced_revision == Some(scene.revision) {
        return;
    }

    log::info!(
        "[Renderer::sync_scene_gpu] Syncing {} scene at revision {} ({} drawables)",
        scene.label,
        scene.revision,
        scene.drawables.len()
    );

    let drawables: Vec<GpuDrawableData> = scene
        .drawables
        .iter()
        .map(|drawable| create_drawable_gpu(renderer, drawable))
        .collect();

    let scene_gpu = &mut renderer.scenes[index];
    renderer.queue.write_buffer(
        &scene_gpu.background_buffer,
        0,
        bytemuck::bytes_of(&build_background_uniform(scene.background)),
    );
    renderer.queue.write_buffer(
        &scene_gpu.light_buffer,
        0,
        bytemuck::bytes_of(&build_light_uniform(&scene.light)),
    );
    scene_gpu.drawables = drawables;
    scene_gpu.synced_revision = Some(scene.revision);
}

fn draw_half<'a>(
    pass: &mut wgpu::RenderPass<'a>,
    renderer: &'a RendererData,
    half: &HalfPlan,
) {
    let width = renderer.surface_config.width;
    let height = renderer.surface_config.height;
    let x = half.scissor.x.min(width);
    let scissor_width = half.scissor.width.min(width - x);
    let scissor_height = half.scissor.height.min(height);
    if scissor_width == 0 || scissor_height == 0 {
        return;
    }
    pass.set_scissor_rect(x, half.scissor.y, scissor_width, scissor_height);

    let scene_gpu = &renderer.scenes[side_index(half.side)];

    pass.set_pipeline(&renderer.pipelines.background);
    pass.set_bind_group(bindings::BACKGROUND_GROUP, &scene_gpu.background_bind_group, &[]);
    pass.draw(0..3, 0..1);

    for item in &half.draws {
        match *item {
            DrawItem::SkyboxFace {
                drawable,
                group,
                texture,
            } => {
                let Some(GpuDrawableData::Skybox {
                    vertex_buffer,
                    index_buffer,
                }) = scene_gpu.drawables.get(drawable)
                else {
                    continue;
                };
                let Some(Some(gpu_texture)) = renderer.textures.get(texture) else {
                    continue;
                };

                pass.set_pipeline(&renderer.pipelines.unlit);
                pass.set_bind_group(bindings::CAMERA_GROUP, &renderer.camera_bind_group, &[]);
                pass.set_bind_group(bindings::TEXTURE_GROUP, &gpu_texture.bind_group, &[]);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(group.start..group.start + group.count, 0, 0..1);
            }
            DrawItem::ModelMesh {
                drawable,
                mesh,
                variant,
            } => {
                let Some(GpuDrawableData::Model { meshes }) = scene_gpu.drawables.get(drawable)
                else {
                    continue;
                };
                let Some(gpu_mesh) = meshes.get(mesh) else {
                    continue;
                };

                pass.set_pipeline(&renderer.pipelines.lit[lit_pipeline_index(variant)]);
                pass.set_bind_group(bindings::CAMERA_GROUP, &renderer.camera_bind_group, &[]);
                pass.set_bind_group(bindings::LIGHT_GROUP, &scene_gpu.light_bind_group, &[]);
                pass.set_bind_group(bindings::MESH_GROUP, &gpu_mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
            }
        }
    }
}

/// Sync GPU state with the scenes and draw one frame.
///
/// A lost or outdated surface is reconfigured and the frame skipped. Only
/// running out of memory is reported as an error.
pub fn render_frame(
    renderer: &mut RendererData,
    plan: &FramePlan,
    left: &SceneData,
    right: &SceneData,
    store: &mut AtlasTextureStore,
) -> ViewerResult<()> {
    upload_dirty_textures(renderer, store)?;
    sync_scene_gpu(renderer, ViewportSide::Left, left);
    sync_scene_gpu(renderer, ViewportSide::Right, right);

    let output = match renderer.surface.get_current_texture() {
        Ok(output) => output,
        Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
            log::warn!(
                "[Renderer::render_frame] {}; reconfiguring",
                ViewerError::SurfaceLost
            );
            renderer
                .surface
                .configure(&renderer.device, &renderer.surface_config);
            return Ok(());
        }
        Err(wgpu::SurfaceError::OutOfMemory) => return Err(ViewerError::SurfaceOutOfMemory),
        Err(wgpu::SurfaceError::Timeout) => {
            log::warn!("[Renderer::render_frame] Surface timeout, skipping frame");
            return Ok(());
        }
    };

    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    renderer
        .queue
        .write_buffer(&renderer.camera_buffer, 0, bytemuck::bytes_of(&plan.camera));

    let mut encoder = renderer
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Twin Viewport Encoder"),
        });

    {
        let (target, resolve_target) = match &renderer.msaa {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Twin Viewport Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &renderer.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for half in &plan.halves {
            draw_half(&mut pass, renderer, half);
        }
    }

    renderer.queue.submit(std::iter::once(encoder.finish()));
    output.present();
    renderer.frame_count += 1;

    Ok(())
}
