//! Pointer input for the viewer.
//!
//! Turns raw winit events into the two things the viewer cares about: a
//! *click* (advance to the next shape) and a *drag* or *scroll* (orbit the
//! camera). A left press that is released without travelling more than
//! [`CLICK_SLOP`] pixels counts as a click; anything longer is a drag.
//!
//! A single-finger touch goes through the same press/move/release path, and a
//! trackpad pinch is folded into the scroll delta.
//!
//! Per-frame state (`clicked`, deltas) is cleared by `begin_frame`.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

/// Maximum pointer travel, in pixels, for a press/release to count as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Scroll lines per unit of pinch magnification.
pub const PINCH_LINES: f32 = 20.0;

/// Pointer state tracked across frames.
#[derive(Debug, Default)]
pub struct Input {
    held: bool,
    press_travel: f32,
    clicked: bool,
    has_position: bool,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: f32,
    // Finger currently acting as the pointer
    touch_id: Option<u64>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Left button released this frame without dragging.
    pub fn clicked(&self) -> bool {
        self.clicked
    }

    /// Left button currently held and the pointer has moved past the click slop.
    pub fn dragging(&self) -> bool {
        self.held && self.press_travel > CLICK_SLOP
    }

    /// Left button currently held.
    pub fn held(&self) -> bool {
        self.held
    }

    /// Pointer position in window pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Pointer movement this frame, in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll this frame, in lines. Positive is away from the user.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Clear per-frame state. Call after the frame has consumed it.
    pub fn begin_frame(&mut self) {
        self.clicked = false;
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.button(*state == ElementState::Pressed),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => {
                self.held = false;
                self.has_position = false;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }
            WindowEvent::PinchGesture { delta, .. } => self.pinch(*delta),
            WindowEvent::Touch(touch) => self.touch(
                touch.id,
                touch.phase,
                Vec2::new(touch.location.x as f32, touch.location.y as f32),
            ),
            _ => {}
        }
    }

    fn button(&mut self, pressed: bool) {
        if pressed {
            self.held = true;
            self.press_travel = 0.0;
        } else {
            if self.held && self.press_travel <= CLICK_SLOP {
                self.clicked = true;
            }
            self.held = false;
        }
    }

    /// Positive `delta` magnifies, which zooms in like scrolling away.
    fn pinch(&mut self, delta: f64) {
        self.scroll_delta += delta as f32 * PINCH_LINES;
    }

    /// Only the first finger down drives the pointer; others are ignored.
    fn touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) {
        match phase {
            TouchPhase::Started => {
                if self.touch_id.is_some() {
                    return;
                }
                self.touch_id = Some(id);
                // Jumping to the finger is not a drag
                self.has_position = false;
                self.cursor_moved(position);
                self.button(true);
            }
            _ if self.touch_id != Some(id) => {}
            TouchPhase::Moved => self.cursor_moved(position),
            TouchPhase::Ended => {
                self.cursor_moved(position);
                self.button(false);
                self.touch_id = None;
            }
            TouchPhase::Cancelled => {
                self.held = false;
                self.touch_id = None;
            }
        }
    }

    fn cursor_moved(&mut self, position: Vec2) {
        if self.has_position {
            let delta = position - self.mouse_position;
            self.mouse_delta += delta;
            if self.held {
                self.press_travel += delta.length();
            }
        }
        self.mouse_position = position;
        self.has_position = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_is_click() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(100.0, 100.0));
        input.button(true);
        input.cursor_moved(Vec2::new(102.0, 101.0));
        input.button(false);
        assert!(input.clicked());

        // Click only lasts one frame
        input.begin_frame();
        assert!(!input.clicked());
    }

    #[test]
    fn test_tap_is_click() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(10.0, 10.0));
        input.touch(3, TouchPhase::Started, Vec2::new(500.0, 400.0));
        assert!(input.held());
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        input.touch(3, TouchPhase::Moved, Vec2::new(501.0, 402.0));
        input.touch(3, TouchPhase::Ended, Vec2::new(501.0, 402.0));
        assert!(input.clicked());
        assert!(!input.held());
    }

    #[test]
    fn test_touch_drag_orbits_and_extra_fingers_are_ignored() {
        let mut input = Input::new();
        input.touch(1, TouchPhase::Started, Vec2::new(100.0, 100.0));
        input.touch(2, TouchPhase::Started, Vec2::new(300.0, 300.0));
        input.touch(2, TouchPhase::Moved, Vec2::new(350.0, 300.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.touch(1, TouchPhase::Moved, Vec2::new(120.0, 100.0));
        assert!(input.dragging());
        assert_eq!(input.mouse_delta(), Vec2::new(20.0, 0.0));

        input.touch(1, TouchPhase::Cancelled, Vec2::new(120.0, 100.0));
        assert!(!input.held());
        assert!(!input.clicked());
    }

    #[test]
    fn test_pinch_feeds_zoom() {
        let mut input = Input::new();
        input.pinch(0.05);
        assert!((input.scroll_delta() - 1.0).abs() < 1e-5);
        input.pinch(-0.1);
        assert!((input.scroll_delta() + 1.0).abs() < 1e-5);
        input.begin_frame();
        assert_eq!(input.scroll_delta(), 0.0);
    }

    #[test]
    fn test_drag_is_not_click() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(100.0, 100.0));
        input.button(true);
        input.cursor_moved(Vec2::new(130.0, 100.0));
        assert!(input.dragging());
        assert_eq!(input.mouse_delta(), Vec2::new(30.0, 0.0));
        input.button(false);
        assert!(!input.clicked());
        assert!(!input.dragging());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut input = Input::new();
        input.button(false);
        assert!(!input.clicked());
    }

    #[test]
    fn test_first_move_has_no_delta() {
        let mut input = Input::new();
        input.cursor_moved(Vec2::new(400.0, 300.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), Vec2::new(400.0, 300.0));
    }
}
