//! Pointer data - Pure DOP

/// What a held button does to the orbit camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Left button
    Rotate,
    /// Right button
    Pan,
}

/// Drag tracking for the orbit buttons
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerData {
    pub drag: Option<DragMode>,
    pub last_position: Option<(f64, f64)>,
}

/// Pixels moved since the previous pointer event while dragging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragDelta {
    pub mode: DragMode,
    pub dx: f32,
    pub dy: f32,
}
