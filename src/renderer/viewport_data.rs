//! Viewport split data - Pure DOP

use serde::Deserialize;

/// Horizontal split of the surface; left is `[0, mid)`, right is `[mid, width)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSplit {
    pub width: u32,
    pub height: u32,
    pub mid: u32,
}

/// Pixel rectangle handed to `set_scissor_rect`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSide {
    Left,
    Right,
}

/// What happens to the split when the surface is resized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Keep the midpoint captured from the startup width
    #[default]
    CapturedAtStartup,
    /// Recentre the midpoint on every resize
    FollowSurface,
}
