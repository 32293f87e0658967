/// Viewer Module - Data-Oriented Programming (DOP) style
///
/// - viewer_data.rs: the CPU-side viewer context
/// - viewer_operations.rs: lifecycle, input, asset polling and frame planning
///

pub mod viewer_data;
pub mod viewer_operations;

pub use viewer_data::{ViewerContext, ViewerPhase};

pub use viewer_operations::{
    create_context, handle_button, handle_cursor_left, handle_cursor_moved, handle_resize,
    handle_wheel, loads_settled, poll_assets, prepare_frame, start,
};
