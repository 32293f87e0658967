//! Viewer data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in viewer_operations.rs

use crate::assets::{AssetLoad, AssetSource, LoadStatus};
use crate::camera::{CameraData, OrbitControlsData};
use crate::config::ViewerConfig;
use crate::input::PointerData;
use crate::model::ModelData;
use crate::renderer::{AtlasSlices, AtlasTextureStore, ViewportSplit};
use crate::scene::SceneData;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    /// Scenes built and loads started, no surface yet
    Uninitialized,
    /// Surface size captured, frames may be planned
    Running,
}

/// CPU-side state of the viewer, owned by the render thread
pub struct ViewerContext {
    pub config: ViewerConfig,
    pub source: Arc<dyn AssetSource>,

    /// One camera for both halves
    pub camera: CameraData,
    pub controls: OrbitControlsData,
    pub pointer: PointerData,

    pub split: ViewportSplit,

    pub left: SceneData,
    pub right: SceneData,
    pub textures: AtlasTextureStore,

    /// In flight until settled, then dropped
    pub atlas: Option<AtlasSlices>,
    pub model_load: Option<AssetLoad<ModelData>>,

    pub atlas_status: LoadStatus,
    pub model_status: LoadStatus,

    pub phase: ViewerPhase,
}
