//! Input Module - pointer and wheel handling for the orbit camera

pub mod pointer_data;
pub mod pointer_operations;

pub use pointer_data::{DragDelta, DragMode, PointerData};
pub use pointer_operations::{
    handle_pointer_button, handle_pointer_left, handle_pointer_move, scroll_lines,
};
