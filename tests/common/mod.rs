//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use twin_viewport::assets::{insert_memory_asset, AssetSource, MemorySource};
use twin_viewport::viewer::{loads_settled, poll_assets};
use twin_viewport::{ViewerConfig, ViewerContext};

pub const ATLAS: &str = "atlas.png";
pub const MODEL: &str = "model.glb";

/// Strip of `tiles` squares of side `size`; tile `i` is filled with grey `i * 40`
pub fn stripe_png(tiles: u32, size: u32) -> Vec<u8> {
    let strip = image::RgbaImage::from_fn(tiles * size, size, |x, _| {
        let v = ((x / size) * 40) as u8;
        image::Rgba([v, v, v, 255])
    });
    let mut encoded = Cursor::new(Vec::new());
    strip
        .write_to(&mut encoded, image::ImageOutputFormat::Png)
        .expect("png encode");
    encoded.into_inner()
}

/// One triangle in the XY plane, no normals, no material
pub fn triangle_glb() -> Vec<u8> {
    let json = r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"name":"tri","nodes":[0]}],"nodes":[{"mesh":0}],"meshes":[{"primitives":[{"attributes":{"POSITION":0},"indices":1}]}],"buffers":[{"byteLength":44}],"bufferViews":[{"buffer":0,"byteOffset":0,"byteLength":36},{"buffer":0,"byteOffset":36,"byteLength":6}],"accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]},{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}]}"#;

    let mut json_chunk = json.as_bytes().to_vec();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }

    let mut bin_chunk = Vec::new();
    for v in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bin_chunk.extend_from_slice(&v.to_le_bytes());
    }
    for i in [0u16, 1, 2] {
        bin_chunk.extend_from_slice(&i.to_le_bytes());
    }
    bin_chunk.extend_from_slice(&[0, 0]);

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

pub fn config() -> ViewerConfig {
    ViewerConfig {
        atlas_path: ATLAS.to_string(),
        model_path: MODEL.to_string(),
        ..Default::default()
    }
}

pub fn source_with(atlas: Option<Vec<u8>>, model: Option<Vec<u8>>) -> Arc<dyn AssetSource> {
    let mut source = MemorySource::default();
    if let Some(bytes) = atlas {
        insert_memory_asset(&mut source, ATLAS, bytes);
    }
    if let Some(bytes) = model {
        insert_memory_asset(&mut source, MODEL, bytes);
    }
    Arc::new(source)
}

pub fn settle(ctx: &mut ViewerContext) {
    for _ in 0..2000 {
        poll_assets(ctx);
        if loads_settled(ctx) {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("loads did not settle");
}
