/// Scene Module - Data-Oriented Programming (DOP) style
///
/// - scene_data.rs: scenes, drawables, lights
/// - box_geometry.rs: skybox cube geometry
/// - scene_operations.rs: building and populating the two scenes
///

pub mod box_geometry;
pub mod scene_data;
pub mod scene_operations;

pub use scene_data::{
    BoxGeometryData, Drawable, GeometryGroup, HemisphereLightData, PlacedModelData, SceneData,
    SkyboxData,
};

pub use scene_operations::{
    add_drawable, apply_model_result, build_scenes, create_hemisphere_light, create_scene,
    create_skybox, insert_model, light_direction,
};
