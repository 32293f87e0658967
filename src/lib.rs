// Twin Viewport - Data-Oriented Programming (DOP) Architecture
//
// One window split down the middle: a skybox scene on the left and a loaded
// glTF model on the right, both seen through one shared orbit camera.
// - *_data.rs modules hold plain data
// - *_operations.rs modules hold the functions that transform it

// Constants module
pub mod constants;

// Core modules
pub mod config;
pub mod error;

// Systems
pub mod assets;
pub mod camera;
pub mod input;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod viewer;

use anyhow::Result;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use winit::window::WindowBuilder;

pub use assets::{AssetSource, FileSystemSource, MemorySource};
pub use camera::{CameraData, CameraUniform};
pub use config::ViewerConfig;
pub use error::{ErrorContext, OptionExt, ViewerError, ViewerResult};
pub use renderer::{FramePlan, SplitPolicy};
pub use viewer::{ViewerContext, ViewerPhase};

// Re-export wgpu for callers that need GPU types
pub use wgpu;

/// Window, event loop and asset source of one viewer session
pub struct Viewer {
    config: ViewerConfig,
    event_loop: Option<EventLoop<()>>,
    source: Arc<dyn AssetSource>,
}

impl Viewer {
    /// Validate `config` and create the event loop. Assets are read from
    /// `config.asset_root` unless replaced with `with_source`.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        log::debug!("[Viewer::new] Starting viewer initialization");

        if let Err(e) = config.validate() {
            log::error!("[Viewer::new] Configuration validation failed: {}", e);
            return Err(e);
        }

        // Force X11 backend for WSL compatibility
        #[cfg(target_os = "linux")]
        let event_loop = {
            log::debug!("[Viewer::new] Creating X11 event loop for Linux...");
            use winit::platform::x11::EventLoopBuilderExtX11;
            EventLoopBuilder::new()
                .with_x11()
                .build()
                .map_err(ViewerError::from)?
        };

        #[cfg(not(target_os = "linux"))]
        let event_loop = {
            log::debug!("[Viewer::new] Creating default event loop...");
            EventLoopBuilder::new().build().map_err(ViewerError::from)?
        };

        log::info!("[Viewer::new] Event loop created");

        let source: Arc<dyn AssetSource> =
            Arc::new(assets::filesystem_source(&config.asset_root));

        Ok(Self {
            config,
            event_loop: Some(event_loop),
            source,
        })
    }

    /// Read assets from `source` instead of the filesystem
    pub fn with_source(mut self, source: Arc<dyn AssetSource>) -> Self {
        self.source = source;
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Open the window and run until it is closed
    pub fn run(mut self) -> Result<()> {
        log::info!("[Viewer::run] Starting viewer run method");

        let event_loop = self.event_loop.take().ok_or_viewer(|| ViewerError::StateError {
            expected: "event loop available".to_string(),
            actual: "event loop already taken".to_string(),
        })?;

        let window = Arc::new(
            WindowBuilder::new()
                .with_title(self.config.window_title.clone())
                .with_inner_size(PhysicalSize::new(
                    self.config.window_width,
                    self.config.window_height,
                ))
                .build(&event_loop)
                .map_err(ViewerError::from)?,
        );

        let mut gpu = renderer::init_renderer(Arc::clone(&window))?;
        let mut ctx = viewer::create_context(self.config, Arc::clone(&self.source));

        let size = window.inner_size();
        viewer::start(&mut ctx, size.width, size.height)?;

        let window_id = window.id();
        let result = event_loop.run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { window_id: id, event } if id == window_id => match event {
                    WindowEvent::CloseRequested => {
                        log::info!("[Viewer::run] Close requested");
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => {
                        renderer::resize_surface(&mut gpu, size.width, size.height);
                        viewer::handle_resize(&mut ctx, size.width, size.height);
                        window.request_redraw();
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        viewer::handle_button(&mut ctx, state, button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        if viewer::handle_cursor_moved(&mut ctx, position.x, position.y) {
                            window.request_redraw();
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        if viewer::handle_wheel(&mut ctx, delta) {
                            window.request_redraw();
                        }
                    }
                    WindowEvent::CursorLeft { .. } => viewer::handle_cursor_left(&mut ctx),
                    WindowEvent::RedrawRequested => {
                        let plan = match viewer::prepare_frame(&ctx) {
                            Ok(plan) => plan,
                            Err(e) => {
                                log::error!("[Viewer::run] {}", e);
                                return;
                            }
                        };

                        match renderer::render_frame(
                            &mut gpu,
                            &plan,
                            &ctx.left,
                            &ctx.right,
                            &mut ctx.textures,
                        ) {
                            Ok(()) => {}
                            Err(ViewerError::SurfaceOutOfMemory) => {
                                log::error!("[Viewer::run] Surface out of memory, exiting");
                                elwt.exit();
                            }
                            Err(e) => log::error!("[Viewer::run] Frame failed: {}", e),
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    viewer::poll_assets(&mut ctx);
                    window.request_redraw();
                }
                _ => {}
            }
        });

        match &result {
            Ok(_) => log::info!("[Viewer::run] Event loop finished"),
            Err(e) => log::error!("[Viewer::run] Event loop error: {}", e),
        }

        result.map_err(|e| ViewerError::from(e).into())
    }
}
