/// Model Module - Data-Oriented Programming (DOP) style
///
/// - model_data.rs: decoded meshes
/// - model_operations.rs: glTF decoding and background loading
///

pub mod model_data;
pub mod model_operations;

pub use model_data::{AlphaMode, MeshData, ModelData, WrapMode};

pub use model_operations::{
    compute_vertex_normals, decode_gltf, load_model, triangle_count, validate_indices,
};

/// Why a single primitive was left out of a model
#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    #[error("primitive has no positions")]
    MissingPositions,

    #[error("{index_count} indices do not form a triangle list")]
    NotTriangleList { index_count: usize },

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
