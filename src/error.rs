//! Error handling for Twin Viewport
//!
//! A single error type covers every failure the viewer can observe. None of
//! these are fatal at runtime: asset failures leave the affected element
//! blank, surface failures skip a frame.

use std::error::Error as StdError;
use std::fmt;

/// Main error type for Twin Viewport
#[derive(Debug)]
pub enum ViewerError {
    // Asset Errors
    AssetFetch {
        path: String,
        error: String,
    },
    ImageDecode {
        path: String,
        error: String,
    },
    ModelDecode {
        path: String,
        error: String,
    },
    EmptyModel {
        path: String,
    },
    MalformedAtlas {
        width: u32,
        height: u32,
        tile_count: u32,
        reason: String,
    },
    TextureNotFound {
        id: usize,
    },

    // GPU Errors
    DeviceNotFound,
    DeviceRequest {
        error: String,
    },
    SurfaceCreation {
        error: String,
    },
    SurfaceLost,
    SurfaceOutOfMemory,
    ShaderValidation {
        shader: String,
        message: String,
    },

    // Window Errors
    WindowCreation {
        error: String,
    },
    EventLoop {
        error: String,
    },

    // Configuration Errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
    ConfigParse {
        path: String,
        error: String,
    },

    // System Errors
    IoError {
        path: String,
        error: String,
    },
    ChannelClosed {
        name: String,
    },
    StateError {
        expected: String,
        actual: String,
    },

    // Generic fallback for unexpected errors
    Internal {
        message: String,
    },
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::AssetFetch { path, error } => {
                write!(f, "Asset fetch failed for {}: {}", path, error)
            }
            ViewerError::ImageDecode { path, error } => {
                write!(f, "Image decode failed for {}: {}", path, error)
            }
            ViewerError::ModelDecode { path, error } => {
                write!(f, "Model decode failed for {}: {}", path, error)
            }
            ViewerError::EmptyModel { path } => {
                write!(f, "Model {} contains no mesh primitives", path)
            }
            ViewerError::MalformedAtlas {
                width,
                height,
                tile_count,
                reason,
            } => write!(
                f,
                "Malformed atlas {}x{} for {} tiles: {}",
                width, height, tile_count, reason
            ),
            ViewerError::TextureNotFound { id } => write!(f, "Texture not found: {}", id),

            ViewerError::DeviceNotFound => write!(f, "GPU device not found"),
            ViewerError::DeviceRequest { error } => {
                write!(f, "GPU device request failed: {}", error)
            }
            ViewerError::SurfaceCreation { error } => {
                write!(f, "Surface creation failed: {}", error)
            }
            ViewerError::SurfaceLost => write!(f, "Surface lost"),
            ViewerError::SurfaceOutOfMemory => write!(f, "Surface out of memory"),
            ViewerError::ShaderValidation { shader, message } => {
                write!(f, "Shader {} failed validation: {}", shader, message)
            }

            ViewerError::WindowCreation { error } => {
                write!(f, "Window creation failed: {}", error)
            }
            ViewerError::EventLoop { error } => write!(f, "Event loop error: {}", error),

            ViewerError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),
            ViewerError::ConfigParse { path, error } => {
                write!(f, "Config parse error for {}: {}", path, error)
            }

            ViewerError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),
            ViewerError::ChannelClosed { name } => write!(f, "Channel closed: {}", name),
            ViewerError::StateError { expected, actual } => {
                write!(f, "State error: expected {}, actual {}", expected, actual)
            }

            ViewerError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl StdError for ViewerError {}

/// Type alias for Results in Twin Viewport
pub type ViewerResult<T> = Result<T, ViewerError>;

// Conversion traits for common error types

impl From<std::io::Error> for ViewerError {
    fn from(error: std::io::Error) -> Self {
        ViewerError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<image::ImageError> for ViewerError {
    fn from(error: image::ImageError) -> Self {
        ViewerError::ImageDecode {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(error: gltf::Error) -> Self {
        ViewerError::ModelDecode {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<wgpu::CreateSurfaceError> for ViewerError {
    fn from(error: wgpu::CreateSurfaceError) -> Self {
        ViewerError::SurfaceCreation {
            error: error.to_string(),
        }
    }
}

impl From<wgpu::RequestDeviceError> for ViewerError {
    fn from(error: wgpu::RequestDeviceError) -> Self {
        ViewerError::DeviceRequest {
            error: error.to_string(),
        }
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(error: winit::error::OsError) -> Self {
        ViewerError::WindowCreation {
            error: error.to_string(),
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(error: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop {
            error: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ViewerError {
    fn from(error: toml::de::Error) -> Self {
        ViewerError::ConfigParse {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

// Helper functions for common error patterns

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_viewer<F>(self, f: F) -> ViewerResult<T>
    where
        F: FnOnce() -> ViewerError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_viewer<F>(self, f: F) -> ViewerResult<T>
    where
        F: FnOnce() -> ViewerError,
    {
        self.ok_or_else(f)
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> ViewerResult<T>;
    fn with_context<F>(self, f: F) -> ViewerResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn context(self, msg: &str) -> ViewerResult<T> {
        self.map_err(|e| ViewerError::Internal {
            message: format!("{}: {}", msg, e),
        })
    }

    fn with_context<F>(self, f: F) -> ViewerResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ViewerError::Internal {
            message: format!("{}: {}", f(), e),
        })
    }
}
