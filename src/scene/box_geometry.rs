//! Box geometry
//!
//! Faces are emitted as +X, -X, +Y, -Y, +Z, -Z, each a quad of two
//! counter-clockwise triangles facing outwards. UV v runs down the image.

use super::scene_data::{BoxGeometryData, GeometryGroup};
use crate::renderer::vertex::TexturedVertex;

const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

/// Build an axis-aligned box centred on the origin
pub fn build_box_geometry(width: f32, height: f32, depth: f32) -> BoxGeometryData {
    let mut geometry = BoxGeometryData {
        vertices: Vec::with_capacity(24),
        indices: Vec::with_capacity(36),
        groups: Vec::with_capacity(6),
    };

    build_face(&mut geometry, [Z, Y, X], -1.0, -1.0, [depth, height, width], 0);
    build_face(&mut geometry, [Z, Y, X], 1.0, -1.0, [depth, height, -width], 1);
    build_face(&mut geometry, [X, Z, Y], 1.0, 1.0, [width, depth, height], 2);
    build_face(&mut geometry, [X, Z, Y], 1.0, -1.0, [width, depth, -height], 3);
    build_face(&mut geometry, [X, Y, Z], 1.0, -1.0, [width, height, depth], 4);
    build_face(&mut geometry, [X, Y, Z], -1.0, -1.0, [width, height, -depth], 5);

    geometry
}

/// One face in the plane spanned by axes `u`, `v`, offset along `w`
fn build_face(
    geometry: &mut BoxGeometryData,
    [u, v, w]: [usize; 3],
    u_dir: f32,
    v_dir: f32,
    [face_width, face_height, face_depth]: [f32; 3],
    material_index: usize,
) {
    let base = geometry.vertices.len() as u16;
    let start = geometry.indices.len() as u32;

    for iy in 0..2u16 {
        let y = iy as f32 * face_height - face_height / 2.0;
        for ix in 0..2u16 {
            let x = ix as f32 * face_width - face_width / 2.0;

            let mut position = [0.0f32; 3];
            position[u] = x * u_dir;
            position[v] = y * v_dir;
            position[w] = face_depth / 2.0;

            geometry.vertices.push(TexturedVertex {
                position,
                uv: [ix as f32, iy as f32],
            });
        }
    }

    // corners: 0 = (0,0), 1 = (1,0), 2 = (0,1), 3 = (1,1)
    geometry
        .indices
        .extend_from_slice(&[base, base + 2, base + 1, base + 2, base + 3, base + 1]);

    geometry.groups.push(GeometryGroup {
        start,
        count: 6,
        material_index,
    });
}

/// Scale every vertex; a negative factor turns the faces inside out
pub fn scale_geometry(geometry: &mut BoxGeometryData, scale: [f32; 3]) {
    for vertex in &mut geometry.vertices {
        for axis in [X, Y, Z] {
            vertex.position[axis] *= scale[axis];
        }
    }
}
