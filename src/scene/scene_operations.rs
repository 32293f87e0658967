//! Scene operations
//!
//! Builds the two scenes of the viewer. The left scene holds the skybox, the
//! right scene starts empty and receives the model once it loads.

use super::box_geometry::{build_box_geometry, scale_geometry};
use super::scene_data::{Drawable, HemisphereLightData, PlacedModelData, SceneData, SkyboxData};
use crate::assets::{poll_load, AssetLoad, AssetState, LoadStatus};
use crate::config::ViewerConfig;
use crate::constants::{self, hex_to_linear_rgba};
use crate::model::ModelData;
use crate::renderer::texture_atlas_data::TextureId;
use glam::{Mat4, Vec3};

pub fn create_hemisphere_light(
    sky_hex: u32,
    ground_hex: u32,
    intensity: f32,
    position: Vec3,
) -> HemisphereLightData {
    HemisphereLightData {
        sky_color: hex_to_linear_rgba(sky_hex),
        ground_color: hex_to_linear_rgba(ground_hex),
        intensity,
        position,
    }
}

/// Unit direction towards the sky colour
pub fn light_direction(light: &HemisphereLightData) -> Vec3 {
    light.position.try_normalize().unwrap_or(Vec3::Y)
}

pub fn create_scene(label: &str, background_hex: u32, light: HemisphereLightData) -> SceneData {
    SceneData {
        label: label.to_string(),
        background: hex_to_linear_rgba(background_hex),
        drawables: Vec::new(),
        light,
        revision: 0,
    }
}

/// Unit cube turned inside out, one texture per face in tile order
pub fn create_skybox(face_textures: &[TextureId]) -> SkyboxData {
    let size = constants::scene::SKYBOX_SIZE;
    let mut geometry = build_box_geometry(size, size, size);
    scale_geometry(&mut geometry, [1.0, 1.0, -1.0]);

    if face_textures.len() < geometry.groups.len() {
        log::warn!(
            "[scene_operations::create_skybox] {} textures for {} faces; the rest stay undrawn",
            face_textures.len(),
            geometry.groups.len()
        );
    }

    SkyboxData {
        geometry,
        materials: face_textures.to_vec(),
    }
}

/// Build (left, right) scenes. Each receives its own clone of the light.
pub fn build_scenes(config: &ViewerConfig, face_textures: &[TextureId]) -> (SceneData, SceneData) {
    let light = create_hemisphere_light(
        config.light_sky_color,
        config.light_ground_color,
        config.light_intensity,
        Vec3::from(config.light_position),
    );

    let mut left = create_scene("left", config.left_background, light.clone());
    add_drawable(&mut left, Drawable::Skybox(create_skybox(face_textures)));

    let right = create_scene("right", config.right_background, light.clone());

    log::info!(
        "[scene_operations::build_scenes] Left: {} drawables, right: {} drawables",
        left.drawables.len(),
        right.drawables.len()
    );

    (left, right)
}

pub fn add_drawable(scene: &mut SceneData, drawable: Drawable) {
    scene.drawables.push(drawable);
    scene.revision += 1;
}

/// Place a model at `offset` and add it to the scene
pub fn insert_model(scene: &mut SceneData, model: ModelData, offset: Vec3) {
    log::info!(
        "[scene_operations::insert_model] Adding {} to {} scene at {:?}",
        model.name,
        scene.label,
        offset
    );

    add_drawable(
        scene,
        Drawable::Model(PlacedModelData {
            model,
            transform: Mat4::from_translation(offset),
        }),
    );
}

/// Poll a model load; inserts on success, logs and leaves the scene as is on failure
pub fn apply_model_result(
    scene: &mut SceneData,
    load: &mut AssetLoad<ModelData>,
    offset: Vec3,
) -> LoadStatus {
    match poll_load(load) {
        AssetState::Pending => LoadStatus::Pending,
        AssetState::Ready(model) => {
            insert_model(scene, model, offset);
            LoadStatus::Ready
        }
        AssetState::Failed(e) => {
            log::error!(
                "[scene_operations::apply_model_result] Model {} failed, {} scene stays empty: {}",
                load.label,
                scene.label,
                e
            );
            LoadStatus::Failed
        }
    }
}
