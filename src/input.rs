//! Pointer input tracking.
//!
//! The [`Pointer`] struct folds raw window events (mouse and touch) into the
//! x/y/pressed state the simulation reads each tick. The cursor leaving the
//! surface is treated the same as a release, so a press held while exiting
//! the window cannot leave the field stuck in attraction.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};

/// Pointer state read by the particle field every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub position: Vec2,
    pub pressed: bool,
}

impl Default for Pointer {
    fn default() -> Self {
        // Start far off-surface so no particle is inside the interaction
        // radius before the first pointer event arrives.
        Self {
            position: Vec2::new(-1000.0, -1000.0),
            pressed: false,
        }
    }
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a window event into the pointer state.
    ///
    /// Unrecognized events are ignored; touch input maps to the same state
    /// as the mouse.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.move_to(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.set_pressed(*state == ElementState::Pressed);
            }
            WindowEvent::CursorLeft { .. } => self.leave(),
            WindowEvent::Touch(Touch {
                phase, location, ..
            }) => {
                self.move_to(Vec2::new(location.x as f32, location.y as f32));
                match phase {
                    TouchPhase::Started => self.set_pressed(true),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.set_pressed(false),
                    TouchPhase::Moved => {}
                }
            }
            _ => {}
        }
    }

    /// Update the tracked position. Applies unconditionally, even while the
    /// pointer is outside the canvas.
    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// The pointer left the surface: treated identically to a release.
    pub fn leave(&mut self) {
        self.pressed = false;
    }
}
