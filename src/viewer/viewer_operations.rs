//! Viewer operations
//!
//! Window-independent half of the viewer: everything the event loop does
//! except touching the GPU. Each function takes the context explicitly.

use super::viewer_data::{ViewerContext, ViewerPhase};
use crate::assets::{AssetSource, LoadStatus};
use crate::camera::{
    init_camera_from_config, init_controls_from_config, log_camera_context, orbit_pan,
    orbit_rotate, orbit_zoom, update_aspect_ratio, CameraData,
};
use crate::config::ViewerConfig;
use crate::error::{ViewerError, ViewerResult};
use crate::input::{
    handle_pointer_button, handle_pointer_left, handle_pointer_move, scroll_lines, DragMode,
};
use crate::model::load_model;
use crate::renderer::{
    apply_atlas_result, compute_split, plan_frame, resize_split, slice_atlas, AtlasTextureStore,
    FramePlan,
};
use crate::scene::{apply_model_result, build_scenes};
use glam::Vec3;
use std::sync::Arc;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Build both scenes and start loading the atlas and the model.
///
/// The skybox is bound to placeholder tiles right away; the right scene
/// stays empty until the model arrives.
pub fn create_context(config: ViewerConfig, source: Arc<dyn AssetSource>) -> ViewerContext {
    let camera_config = config.camera_config();
    let camera = init_camera_from_config(&camera_config);
    let controls = init_controls_from_config(&camera_config);

    let mut textures = AtlasTextureStore::default();
    let atlas = slice_atlas(
        &mut textures,
        Arc::clone(&source),
        &config.atlas_path,
        config.atlas_tile_count,
    );
    let (left, right) = build_scenes(&config, &atlas.ids);
    let model_load = load_model(Arc::clone(&source), &config.model_path);

    log::info!(
        "[ViewerContext::create] Loading {} and {}",
        config.atlas_path,
        config.model_path
    );

    ViewerContext {
        split: compute_split(config.window_width, config.window_height),
        config,
        source,
        camera,
        controls,
        pointer: Default::default(),
        left,
        right,
        textures,
        atlas: Some(atlas),
        model_load: Some(model_load),
        atlas_status: LoadStatus::Pending,
        model_status: LoadStatus::Pending,
        phase: ViewerPhase::Uninitialized,
    }
}

/// Capture the real surface size and enter the running phase.
///
/// The split midpoint is taken from this size and, under the default
/// policy, kept for the rest of the session.
pub fn start(ctx: &mut ViewerContext, width: u32, height: u32) -> ViewerResult<()> {
    if ctx.phase != ViewerPhase::Uninitialized {
        return Err(ViewerError::StateError {
            expected: format!("{:?}", ViewerPhase::Uninitialized),
            actual: format!("{:?}", ctx.phase),
        });
    }

    ctx.split = compute_split(width, height);
    ctx.camera = update_aspect_ratio(&ctx.camera, width, height);
    ctx.phase = ViewerPhase::Running;

    log::info!(
        "[ViewerContext::start] Surface {}x{}, split at x={}",
        width,
        height,
        ctx.split.mid
    );
    log_camera_context(&ctx.camera);
    Ok(())
}

/// Follow a surface resize. Zero sizes (minimised windows) are ignored.
pub fn handle_resize(ctx: &mut ViewerContext, width: u32, height: u32) {
    if width == 0 || height == 0 {
        return;
    }

    ctx.camera = update_aspect_ratio(&ctx.camera, width, height);
    ctx.split = resize_split(&ctx.split, ctx.config.split_policy, width, height);
}

/// Returns true if the button changed the drag state
pub fn handle_button(ctx: &mut ViewerContext, state: ElementState, button: MouseButton) -> bool {
    handle_pointer_button(&mut ctx.pointer, state, button)
}

/// Feed a cursor position; returns true when the camera moved.
///
/// Drags anywhere on the surface move the one shared camera, the
/// element height being the full surface height.
pub fn handle_cursor_moved(ctx: &mut ViewerContext, x: f64, y: f64) -> bool {
    let Some(delta) = handle_pointer_move(&mut ctx.pointer, x, y) else {
        return false;
    };

    let height = ctx.split.height;
    let moved = match delta.mode {
        DragMode::Rotate => orbit_rotate(&ctx.camera, &ctx.controls, delta.dx, delta.dy, height),
        DragMode::Pan => orbit_pan(&ctx.camera, &ctx.controls, delta.dx, delta.dy, height),
    };
    replace_camera(ctx, moved)
}

/// Returns true when the wheel zoomed the camera
pub fn handle_wheel(ctx: &mut ViewerContext, delta: MouseScrollDelta) -> bool {
    let zoomed = orbit_zoom(&ctx.camera, &ctx.controls, scroll_lines(delta));
    replace_camera(ctx, zoomed)
}

fn replace_camera(ctx: &mut ViewerContext, camera: CameraData) -> bool {
    let moved = camera != ctx.camera;
    ctx.camera = camera;
    moved
}

pub fn handle_cursor_left(ctx: &mut ViewerContext) {
    handle_pointer_left(&mut ctx.pointer);
}

/// Move settled loads into the scenes. Returns true if anything changed.
pub fn poll_assets(ctx: &mut ViewerContext) -> bool {
    let mut changed = false;

    if let Some(atlas) = ctx.atlas.as_mut() {
        let status = apply_atlas_result(&mut ctx.textures, atlas);
        if status != LoadStatus::Pending {
            ctx.atlas_status = status;
            ctx.atlas = None;
            changed = true;
        }
    }

    if let Some(load) = ctx.model_load.as_mut() {
        let offset = Vec3::from(ctx.config.model_offset);
        let status = apply_model_result(&mut ctx.right, load, offset);
        if status != LoadStatus::Pending {
            ctx.model_status = status;
            ctx.model_load = None;
            changed = true;
        }
    }

    changed
}

/// True once neither load is in flight
pub fn loads_settled(ctx: &ViewerContext) -> bool {
    ctx.atlas.is_none() && ctx.model_load.is_none()
}

/// Plan the next frame from the current state
pub fn prepare_frame(ctx: &ViewerContext) -> ViewerResult<FramePlan> {
    if ctx.phase != ViewerPhase::Running {
        return Err(ViewerError::StateError {
            expected: format!("{:?}", ViewerPhase::Running),
            actual: format!("{:?}", ctx.phase),
        });
    }

    Ok(plan_frame(&ctx.split, &ctx.camera, &ctx.left, &ctx.right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySource;
    use crate::renderer::{half, populated_count, ViewportSide};
    use std::time::Duration;

    fn empty_context() -> ViewerContext {
        create_context(ViewerConfig::default(), Arc::new(MemorySource::default()))
    }

    fn settle(ctx: &mut ViewerContext) {
        for _ in 0..2000 {
            poll_assets(ctx);
            if loads_settled(ctx) {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("loads did not settle");
    }

    #[test]
    fn test_frames_require_start() {
        let mut ctx = empty_context();
        assert!(matches!(
            prepare_frame(&ctx),
            Err(ViewerError::StateError { .. })
        ));

        start(&mut ctx, 1280, 720).unwrap();
        assert!(prepare_frame(&ctx).is_ok());
        assert!(start(&mut ctx, 1280, 720).is_err());
    }

    #[test]
    fn test_start_captures_surface_size() {
        let mut ctx = empty_context();
        start(&mut ctx, 1000, 500).unwrap();

        assert_eq!(ctx.split.mid, 500);
        assert_eq!(ctx.camera.aspect_ratio, 2.0);
    }

    #[test]
    fn test_resize_updates_aspect_but_keeps_captured_split() {
        let mut ctx = empty_context();
        start(&mut ctx, 1280, 720).unwrap();

        handle_resize(&mut ctx, 1920, 1080);
        assert!((ctx.camera.aspect_ratio - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(ctx.split.mid, 640);
        assert_eq!(ctx.split.width, 1920);

        handle_resize(&mut ctx, 0, 0);
        assert_eq!(ctx.split.width, 1920);
    }

    #[test]
    fn test_drag_moves_the_shared_camera() {
        let mut ctx = empty_context();
        start(&mut ctx, 1280, 720).unwrap();
        let before = prepare_frame(&ctx).unwrap();

        handle_cursor_moved(&mut ctx, 300.0, 300.0);
        handle_button(&mut ctx, ElementState::Pressed, MouseButton::Left);
        assert!(handle_cursor_moved(&mut ctx, 340.0, 300.0));
        handle_button(&mut ctx, ElementState::Released, MouseButton::Left);
        assert!(!handle_cursor_moved(&mut ctx, 400.0, 300.0));

        let after = prepare_frame(&ctx).unwrap();
        assert_ne!(before.camera, after.camera);

        // orbiting keeps the distance to the pivot
        let initial = init_camera_from_config(&ctx.config.camera_config());
        let r0 = crate::camera::spherical_offset(&initial).0;
        let r1 = crate::camera::spherical_offset(&ctx.camera).0;
        assert!((r0 - r1).abs() < 1e-6);
    }

    #[test]
    fn test_wheel_and_right_drag_follow_config() {
        let mut ctx = empty_context();
        start(&mut ctx, 1280, 720).unwrap();
        let initial = ctx.camera;

        assert!(!handle_wheel(&mut ctx, MouseScrollDelta::LineDelta(0.0, 3.0)));
        handle_cursor_moved(&mut ctx, 100.0, 100.0);
        handle_button(&mut ctx, ElementState::Pressed, MouseButton::Right);
        assert!(!handle_cursor_moved(&mut ctx, 150.0, 120.0));
        handle_button(&mut ctx, ElementState::Released, MouseButton::Right);
        assert_eq!(ctx.camera, initial);

        let config = ViewerConfig {
            enable_zoom: true,
            enable_pan: true,
            ..Default::default()
        };
        let mut ctx = create_context(config, Arc::new(MemorySource::default()));
        start(&mut ctx, 1280, 720).unwrap();

        assert!(handle_wheel(&mut ctx, MouseScrollDelta::LineDelta(0.0, 3.0)));
        let r = crate::camera::spherical_offset(&ctx.camera).0;
        assert!(r < 0.01);

        handle_cursor_moved(&mut ctx, 100.0, 100.0);
        handle_button(&mut ctx, ElementState::Pressed, MouseButton::Right);
        assert!(handle_cursor_moved(&mut ctx, 150.0, 120.0));
        assert_ne!(ctx.camera.pivot, initial.pivot);
        assert!((crate::camera::spherical_offset(&ctx.camera).0 - r).abs() < 1e-6);
    }

    #[test]
    fn test_missing_assets_leave_scenes_blank() {
        let mut ctx = empty_context();
        start(&mut ctx, 1280, 720).unwrap();
        settle(&mut ctx);

        assert_eq!(ctx.atlas_status, LoadStatus::Failed);
        assert_eq!(ctx.model_status, LoadStatus::Failed);
        assert_eq!(populated_count(&ctx.textures), 0);

        let plan = prepare_frame(&ctx).unwrap();
        assert_eq!(half(&plan, ViewportSide::Left).unwrap().draws.len(), 6);
        assert!(half(&plan, ViewportSide::Right).unwrap().draws.is_empty());
    }
}
