//! Pointer operations
//!
//! Turns raw cursor, button and wheel events into orbit camera input.

use super::pointer_data::{DragDelta, DragMode, PointerData};
use crate::constants::controls::PIXELS_PER_SCROLL_LINE;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

fn drag_mode(button: MouseButton) -> Option<DragMode> {
    match button {
        MouseButton::Left => Some(DragMode::Rotate),
        MouseButton::Right => Some(DragMode::Pan),
        _ => None,
    }
}

/// Handle mouse button input
/// Returns true if the event was consumed
pub fn handle_pointer_button(
    pointer: &mut PointerData,
    state: ElementState,
    button: MouseButton,
) -> bool {
    let Some(mode) = drag_mode(button) else {
        return false;
    };

    match state {
        ElementState::Pressed => pointer.drag = Some(mode),
        ElementState::Released if pointer.drag == Some(mode) => pointer.drag = None,
        ElementState::Released => {}
    }
    true
}

/// Handle cursor movement; yields a delta only while dragging
pub fn handle_pointer_move(pointer: &mut PointerData, x: f64, y: f64) -> Option<DragDelta> {
    let delta = match (pointer.drag, pointer.last_position) {
        (Some(mode), Some((last_x, last_y))) => Some(DragDelta {
            mode,
            dx: (x - last_x) as f32,
            dy: (y - last_y) as f32,
        }),
        _ => None,
    };
    pointer.last_position = Some((x, y));
    delta.filter(|d| d.dx != 0.0 || d.dy != 0.0)
}

/// Cursor left the window; the next entry must not produce a jump
pub fn handle_pointer_left(pointer: &mut PointerData) {
    pointer.last_position = None;
    pointer.drag = None;
}

/// Wheel movement in lines, positive when scrolled away from the user
pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_SCROLL_LINE) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut pointer = PointerData::default();
        assert_eq!(handle_pointer_move(&mut pointer, 10.0, 10.0), None);
        assert_eq!(handle_pointer_move(&mut pointer, 20.0, 10.0), None);
    }

    #[test]
    fn test_drag_reports_deltas() {
        let mut pointer = PointerData::default();
        handle_pointer_move(&mut pointer, 100.0, 50.0);
        assert!(handle_pointer_button(
            &mut pointer,
            ElementState::Pressed,
            MouseButton::Left
        ));

        let delta = handle_pointer_move(&mut pointer, 130.0, 40.0).unwrap();
        assert_eq!(
            delta,
            DragDelta {
                mode: DragMode::Rotate,
                dx: 30.0,
                dy: -10.0
            }
        );

        handle_pointer_button(&mut pointer, ElementState::Released, MouseButton::Left);
        assert_eq!(handle_pointer_move(&mut pointer, 150.0, 40.0), None);
    }

    #[test]
    fn test_right_button_pans() {
        let mut pointer = PointerData::default();
        handle_pointer_move(&mut pointer, 0.0, 0.0);
        assert!(handle_pointer_button(
            &mut pointer,
            ElementState::Pressed,
            MouseButton::Right
        ));

        let delta = handle_pointer_move(&mut pointer, 5.0, 0.0).unwrap();
        assert_eq!(delta.mode, DragMode::Pan);

        // releasing the other button keeps the pan going
        handle_pointer_button(&mut pointer, ElementState::Released, MouseButton::Left);
        assert_eq!(pointer.drag, Some(DragMode::Pan));
    }

    #[test]
    fn test_other_buttons_do_not_drag() {
        let mut pointer = PointerData::default();
        assert!(!handle_pointer_button(
            &mut pointer,
            ElementState::Pressed,
            MouseButton::Middle
        ));
        assert_eq!(pointer.drag, None);
    }

    #[test]
    fn test_leaving_resets_drag() {
        let mut pointer = PointerData::default();
        handle_pointer_button(&mut pointer, ElementState::Pressed, MouseButton::Left);
        handle_pointer_move(&mut pointer, 1.0, 1.0);
        handle_pointer_left(&mut pointer);
        assert_eq!(pointer, PointerData::default());
    }

    #[test]
    fn test_scroll_lines() {
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -PIXELS_PER_SCROLL_LINE));
        assert_eq!(scroll_lines(pixels), -1.0);
    }
}
