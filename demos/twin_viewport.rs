//! Twin viewport demo
//!
//! Usage: twin_viewport [config.toml]
//!
//! Without a config file the stock layout is used and assets are read from
//! the current directory (static/images/..., static/models/...).

use anyhow::Result;
use twin_viewport::{ErrorContext, Viewer, ViewerConfig};

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load(std::path::Path::new(&path))
            .with_context(|| format!("loading viewer config {}", path))?,
        None => ViewerConfig::default(),
    };

    println!(
        "Left: skybox from {} | Right: {}",
        config.atlas_path, config.model_path
    );
    println!("Drag with the left mouse button to orbit both views.");

    Viewer::new(config)?.run()
}
