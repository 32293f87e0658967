//! Frame plan operations

use super::frame_plan_data::{DrawItem, FramePlan, HalfPlan, LitVariant};
use super::viewport_data::{ViewportSide, ViewportSplit};
use super::viewport_operations::scissor_rects;
use crate::camera::{build_camera_uniform, CameraData};
use crate::model::{AlphaMode, MeshData};
use crate::scene::{Drawable, SceneData};

/// Decide what the next frame draws.
///
/// Both halves get the same camera uniform; they differ only in scissor
/// rect and scene content.
pub fn plan_frame(
    split: &ViewportSplit,
    camera: &CameraData,
    left: &SceneData,
    right: &SceneData,
) -> FramePlan {
    let halves = scissor_rects(split)
        .into_iter()
        .filter_map(|(side, rect)| {
            let scene = match side {
                ViewportSide::Left => left,
                ViewportSide::Right => right,
            };
            rect.map(|scissor| HalfPlan {
                side,
                scissor,
                background: scene.background,
                scene_revision: scene.revision,
                draws: plan_scene(scene),
            })
        })
        .collect();

    FramePlan {
        surface_width: split.width,
        surface_height: split.height,
        camera: build_camera_uniform(camera),
        halves,
    }
}

/// Pipeline state for one model primitive
pub fn lit_variant(mesh: &MeshData) -> LitVariant {
    LitVariant {
        double_sided: mesh.double_sided,
        blended: mesh.alpha_mode == AlphaMode::Blend,
    }
}

/// Draw list of one scene in drawable order, blended primitives last
pub fn plan_scene(scene: &SceneData) -> Vec<DrawItem> {
    let mut draws = Vec::new();
    let mut blended = Vec::new();

    for (drawable_index, drawable) in scene.drawables.iter().enumerate() {
        match drawable {
            Drawable::Skybox(skybox) => {
                for group in &skybox.geometry.groups {
                    // faces without a material are not drawn
                    if let Some(&texture) = skybox.materials.get(group.material_index) {
                        draws.push(DrawItem::SkyboxFace {
                            drawable: drawable_index,
                            group: *group,
                            texture,
                        });
                    }
                }
            }
            Drawable::Model(placed) => {
                for (mesh_index, mesh) in placed.model.meshes.iter().enumerate() {
                    let variant = lit_variant(mesh);
                    let item = DrawItem::ModelMesh {
                        drawable: drawable_index,
                        mesh: mesh_index,
                        variant,
                    };
                    if variant.blended {
                        blended.push(item);
                    } else {
                        draws.push(item);
                    }
                }
            }
        }
    }

    draws.extend(blended);
    draws
}

pub fn half(plan: &FramePlan, side: ViewportSide) -> Option<&HalfPlan> {
    plan.halves.iter().find(|h| h.side == side)
}
