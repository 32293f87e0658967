//! Viewport split operations
//!
//! The split midpoint and the surface size are tracked separately: with
//! `SplitPolicy::CapturedAtStartup` the midpoint keeps its startup value
//! while the surface grows or shrinks underneath it.

use super::viewport_data::{ScissorRect, SplitPolicy, ViewportSide, ViewportSplit};

/// Split a surface down the middle
pub fn compute_split(width: u32, height: u32) -> ViewportSplit {
    ViewportSplit {
        width,
        height,
        mid: width / 2,
    }
}

/// Apply a resize to the split according to `policy`
pub fn resize_split(
    split: &ViewportSplit,
    policy: SplitPolicy,
    width: u32,
    height: u32,
) -> ViewportSplit {
    match policy {
        SplitPolicy::FollowSurface => compute_split(width, height),
        SplitPolicy::CapturedAtStartup => {
            let resized = ViewportSplit {
                width,
                height,
                mid: split.mid,
            };
            if is_split_off_centre(&resized) {
                log::warn!(
                    "[viewport_operations::resize_split] Split stays at x={} while surface is {}px wide",
                    resized.mid,
                    width
                );
            }
            resized
        }
    }
}

/// True when the midpoint no longer halves the surface
pub fn is_split_off_centre(split: &ViewportSplit) -> bool {
    split.mid != split.width / 2
}

/// Scissor rect for one side, clamped to the surface.
///
/// `None` when that side has no pixels on the current surface.
pub fn scissor_rect(split: &ViewportSplit, side: ViewportSide) -> Option<ScissorRect> {
    let mid = split.mid.min(split.width);
    let (x, width) = match side {
        ViewportSide::Left => (0, mid),
        ViewportSide::Right => (mid, split.width - mid),
    };

    if width == 0 || split.height == 0 {
        return None;
    }

    Some(ScissorRect {
        x,
        y: 0,
        width,
        height: split.height,
    })
}

/// Both scissor rects, left first
pub fn scissor_rects(split: &ViewportSplit) -> [(ViewportSide, Option<ScissorRect>); 2] {
    [
        (ViewportSide::Left, scissor_rect(split, ViewportSide::Left)),
        (ViewportSide::Right, scissor_rect(split, ViewportSide::Right)),
    ]
}
