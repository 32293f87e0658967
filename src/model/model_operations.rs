//! Model operations
//!
//! Decodes binary glTF into CPU meshes. Every triangle primitive of the
//! default scene becomes one `MeshData` with its node transforms folded into
//! `local_transform`.

use super::model_data::{AlphaMode, MeshData, ModelData, WrapMode};
use super::PrimitiveError;
use crate::assets::{spawn_load, AssetLoad, AssetSource};
use crate::error::{ViewerError, ViewerResult};
use glam::{Mat4, Vec3};
use image::RgbaImage;
use std::sync::Arc;

/// Start loading the model at `url` in the background
pub fn load_model(source: Arc<dyn AssetSource>, url: &str) -> AssetLoad<ModelData> {
    spawn_load(source, url, |path, bytes| decode_gltf(path, &bytes))
}

/// Decode a self-contained glTF (`.glb` or embedded `.gltf`)
pub fn decode_gltf(path: &str, bytes: &[u8]) -> ViewerResult<ModelData> {
    let (document, buffers, images) =
        gltf::import_slice(bytes).map_err(|e| ViewerError::ModelDecode {
            path: path.to_string(),
            error: e.to_string(),
        })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ViewerError::EmptyModel {
            path: path.to_string(),
        })?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &images, &mut meshes);
    }

    if meshes.is_empty() {
        return Err(ViewerError::EmptyModel {
            path: path.to_string(),
        });
    }

    let model = ModelData {
        name: scene.name().unwrap_or(path).to_string(),
        meshes,
    };

    log::info!(
        "[model_operations::decode_gltf] {}: {} meshes, {} triangles",
        path,
        model.meshes.len(),
        triangle_count(&model)
    );

    Ok(model)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    out: &mut Vec<MeshData>,
) {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "[model_operations::collect_node] Skipping {:?} primitive in mesh {}",
                    primitive.mode(),
                    mesh.index()
                );
                continue;
            }
            match read_primitive(&primitive, transform, buffers, images) {
                Ok(data) => out.push(data),
                Err(e) => log::warn!(
                    "[model_operations::collect_node] Skipping primitive {} of mesh {}: {}",
                    primitive.index(),
                    mesh.index(),
                    e
                ),
            }
        }
    }

    for child in node.children() {
        collect_node(&child, transform, buffers, images, out);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<MeshData, PrimitiveError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or(PrimitiveError::MissingPositions)?
        .collect();
    if positions.is_empty() {
        return Err(PrimitiveError::MissingPositions);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    validate_indices(&indices, positions.len())?;

    let normals = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => compute_vertex_normals(&positions, &indices),
    };

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();
    let color_info = pbr.base_color_texture();

    let tex_coord = color_info.as_ref().map_or(0, |info| info.tex_coord());
    let uvs = match reader.read_tex_coords(tex_coord) {
        Some(uvs) => uvs.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    let (base_color_texture, wrap) = match &color_info {
        Some(info) => {
            let texture = info.texture();
            let sampler = texture.sampler();
            (
                images.get(texture.source().index()).and_then(image_to_rgba),
                [wrap_mode(sampler.wrap_s()), wrap_mode(sampler.wrap_t())],
            )
        }
        None => (None, [WrapMode::default(); 2]),
    };

    Ok(MeshData {
        positions,
        normals,
        uvs,
        indices,
        base_color: pbr.base_color_factor(),
        base_color_texture,
        wrap,
        alpha_mode: alpha_mode(&material),
        double_sided: material.double_sided(),
        local_transform: transform,
    })
}

fn alpha_mode(material: &gltf::Material) -> AlphaMode {
    match material.alpha_mode() {
        gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
        gltf::material::AlphaMode::Mask => AlphaMode::Mask {
            cutoff: material.alpha_cutoff().unwrap_or(0.5),
        },
        gltf::material::AlphaMode::Blend => AlphaMode::Blend,
    }
}

fn wrap_mode(mode: gltf::texture::WrappingMode) -> WrapMode {
    match mode {
        gltf::texture::WrappingMode::Repeat => WrapMode::Repeat,
        gltf::texture::WrappingMode::MirroredRepeat => WrapMode::MirroredRepeat,
        gltf::texture::WrappingMode::ClampToEdge => WrapMode::ClampToEdge,
    }
}

/// Indices must form whole triangles and stay inside the vertex range
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), PrimitiveError> {
    if indices.len() % 3 != 0 {
        return Err(PrimitiveError::NotTriangleList {
            index_count: indices.len(),
        });
    }

    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(PrimitiveError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    Ok(())
}

/// Convert decoded glTF image data to RGBA8
pub fn image_to_rgba(data: &gltf::image::Data) -> Option<RgbaImage> {
    use gltf::image::Format;

    let pixels: Vec<u8> = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            log::warn!(
                "[model_operations::image_to_rgba] Unsupported texture format {:?}, using base colour only",
                other
            );
            return None;
        }
    };

    RgbaImage::from_raw(data.width, data.height, pixels)
}

/// Area-weighted smooth normals
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let pb = Vec3::from(positions[b]);
        let pc = Vec3::from(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    accumulated
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

pub fn triangle_count(model: &ModelData) -> usize {
    model.meshes.iter().map(|m| m.indices.len() / 3).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wrap a JSON document and its binary chunk into a GLB container
    fn glb(json: &str, mut bin_chunk: Vec<u8>) -> Vec<u8> {
        let mut json_chunk = json.as_bytes().to_vec();
        while json_chunk.len() % 4 != 0 {
            json_chunk.push(b' ');
        }
        while bin_chunk.len() % 4 != 0 {
            bin_chunk.push(0);
        }

        let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json_chunk);
        glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin_chunk);
        glb
    }

    /// Positions of one triangle followed by its u16 indices, padded to 44 bytes
    fn triangle_bytes() -> Vec<u8> {
        let mut bin = Vec::new();
        for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
            bin.extend_from_slice(&v.to_le_bytes());
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin.extend_from_slice(&[0, 0]);
        bin
    }

    /// A one-triangle GLB with a translated node and no normals
    fn triangle_glb() -> Vec<u8> {
        let json = r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"name":"tri","nodes":[0]}],"nodes":[{"mesh":0,"translation":[1.0,0.0,0.0]}],"meshes":[{"primitives":[{"attributes":{"POSITION":0},"indices":1}]}],"buffers":[{"byteLength":44}],"bufferViews":[{"buffer":0,"byteOffset":0,"byteLength":36},{"buffer":0,"byteOffset":36,"byteLength":6}],"accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]},{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}]}"#;
        glb(json, triangle_bytes())
    }

    /// A textured blade: double sided, alpha masked, repeating texture read
    /// through the second UV set
    fn blade_glb() -> Vec<u8> {
        let mut bin = triangle_bytes();
        for v in [0.0f32, 0.0, 2.0, 0.0, 0.0, 2.0] {
            bin.extend_from_slice(&v.to_le_bytes());
        }

        let pixels = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        pixels
            .write_to(&mut png, image::ImageOutputFormat::Png)
            .unwrap();
        let png = png.into_inner();
        let png_offset = bin.len();
        bin.extend_from_slice(&png);

        let json = r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{"mesh":0}],"meshes":[{"primitives":[{"attributes":{"POSITION":0,"TEXCOORD_1":2},"indices":1,"material":0}]}],"materials":[{"doubleSided":true,"alphaMode":"MASK","alphaCutoff":0.25,"pbrMetallicRoughness":{"baseColorTexture":{"index":0,"texCoord":1}}}],"textures":[{"sampler":0,"source":0}],"samplers":[{"wrapS":10497,"wrapT":33648}],"images":[{"bufferView":3,"mimeType":"image/png"}],"buffers":[{"byteLength":BUFFER_LEN}],"bufferViews":[{"buffer":0,"byteOffset":0,"byteLength":36},{"buffer":0,"byteOffset":36,"byteLength":6},{"buffer":0,"byteOffset":44,"byteLength":24},{"buffer":0,"byteOffset":PNG_OFFSET,"byteLength":PNG_LEN}],"accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]},{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"},{"bufferView":2,"componentType":5126,"count":3,"type":"VEC2"}]}"#
            .replace("BUFFER_LEN", &bin.len().to_string())
            .replace("PNG_OFFSET", &png_offset.to_string())
            .replace("PNG_LEN", &png.len().to_string());

        glb(&json, bin)
    }

    #[test]
    fn test_decode_triangle_glb() {
        let model = decode_gltf("tri.glb", &triangle_glb()).unwrap();

        assert_eq!(model.name, "tri");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(triangle_count(&model), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.uvs.len(), 3);
        assert_eq!(mesh.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert!(mesh.base_color_texture.is_none());
        assert_eq!(mesh.alpha_mode, AlphaMode::Opaque);
        assert_eq!(mesh.wrap, [WrapMode::Repeat; 2]);
        assert!(!mesh.double_sided);
        for normal in &mesh.normals {
            assert!((Vec3::from(*normal) - Vec3::Z).length() < 1e-6);
        }

        let origin = mesh.local_transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_decode_keeps_material_and_sampler_settings() {
        let model = decode_gltf("blade.glb", &blade_glb()).unwrap();
        let mesh = &model.meshes[0];

        assert!(mesh.double_sided);
        assert_eq!(mesh.alpha_mode, AlphaMode::Mask { cutoff: 0.25 });
        assert_eq!(mesh.wrap, [WrapMode::Repeat, WrapMode::MirroredRepeat]);
        assert_eq!(mesh.uvs, vec![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]);

        let texture = mesh.base_color_texture.as_ref().unwrap();
        assert_eq!(texture.dimensions(), (2, 2));
        assert_eq!(texture.get_pixel(1, 1).0, [200, 100, 50, 255]);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(matches!(
            decode_gltf("junk.glb", b"definitely not gltf"),
            Err(ViewerError::ModelDecode { .. })
        ));
    }

    #[test]
    fn test_vertex_normals_of_quad() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, -1.0], [0.0, 0.0, -1.0]];
        let normals = compute_vertex_normals(&positions, &[0, 1, 2, 0, 2, 3]);
        for n in normals {
            assert!((Vec3::from(n) - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_rgb_image_gets_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let rgba = image_to_rgba(&data).unwrap();
        assert_eq!(rgba.get_pixel(1, 0).0, [40, 50, 60, 255]);
    }

    #[test]
    fn test_index_validation() {
        assert!(validate_indices(&[0, 1, 2], 3).is_ok());
        assert!(matches!(
            validate_indices(&[0, 1], 3),
            Err(PrimitiveError::NotTriangleList { index_count: 2 })
        ));
        assert!(matches!(
            validate_indices(&[0, 1, 3], 3),
            Err(PrimitiveError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        ));
    }
}
