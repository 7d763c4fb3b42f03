//! Drawing state management for the watermark canvas.
//!
//! This module provides the state machine that tracks the current transform,
//! fill style and text style while drawing, plus the save/restore stack that
//! keeps one draw call's settings from leaking into the next.

use crate::config::Rgb;
use tiny_skia::Transform;

/// Horizontal text anchor relative to the drawing origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Text starts at the origin
    #[default]
    Start,
    /// Text is centered on the origin
    Center,
    /// Text ends at the origin
    End,
}

/// Vertical text anchor relative to the drawing origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// Origin sits on the alphabetic baseline
    #[default]
    Alphabetic,
    /// Origin sits at the top of the em box
    Top,
    /// Origin sits in the middle of the em box
    Middle,
    /// Origin sits at the bottom of the em box
    Bottom,
}

/// Drawing state parameters.
///
/// Tracks everything that affects how the next fill is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    /// Current transform (local space to surface pixels)
    pub transform: Transform,
    /// Fill color
    pub fill_color: Rgb,
    /// Global alpha multiplied into every fill, 0.0 to 1.0
    pub global_alpha: f32,
    /// Font size in pixels
    pub font_size: f32,
    /// Requested font family
    pub font_family: String,
    /// Horizontal text anchor
    pub text_align: TextAlign,
    /// Vertical text anchor
    pub text_baseline: TextBaseline,
}

impl DrawState {
    /// Create a new drawing state with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use watermark_oxide::rendering::{DrawState, TextAlign};
    ///
    /// let state = DrawState::new();
    /// assert_eq!(state.font_size, 10.0);
    /// assert_eq!(state.global_alpha, 1.0);
    /// assert_eq!(state.text_align, TextAlign::Start);
    /// ```
    pub fn new() -> Self {
        Self {
            transform: Transform::identity(),
            fill_color: Rgb::BLACK,
            global_alpha: 1.0,
            font_size: 10.0,
            font_family: "sans-serif".to_string(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
        }
    }
}

impl Default for DrawState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of drawing states for save/restore operations.
///
/// `save` pushes a copy of the current state, `restore` pops it again, so a
/// temporary transform or style can always be reverted.
#[derive(Debug, Clone)]
pub struct DrawStateStack {
    stack: Vec<DrawState>,
}

impl DrawStateStack {
    /// Create a new stack holding only the initial state.
    ///
    /// # Examples
    ///
    /// ```
    /// use watermark_oxide::rendering::DrawStateStack;
    ///
    /// let stack = DrawStateStack::new();
    /// assert_eq!(stack.depth(), 1);
    /// ```
    pub fn new() -> Self {
        Self {
            stack: vec![DrawState::new()],
        }
    }

    /// Get a reference to the current drawing state.
    pub fn current(&self) -> &DrawState {
        // The bottom state is never popped
        &self.stack[self.stack.len() - 1]
    }

    /// Get a mutable reference to the current drawing state.
    pub fn current_mut(&mut self) -> &mut DrawState {
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    /// Save the current drawing state.
    ///
    /// Pushes a copy of the current state onto the stack.
    pub fn save(&mut self) {
        let state = self.current().clone();
        self.stack.push(state);
    }

    /// Restore the previous drawing state.
    ///
    /// Pops the current state from the stack. If only the initial state
    /// remains, this operation has no effect.
    ///
    /// # Examples
    ///
    /// ```
    /// use watermark_oxide::rendering::DrawStateStack;
    ///
    /// let mut stack = DrawStateStack::new();
    /// stack.save();
    /// stack.current_mut().global_alpha = 0.25;
    /// stack.restore();
    /// assert_eq!(stack.current().global_alpha, 1.0);
    /// stack.restore(); // No effect, can't pop last state
    /// assert_eq!(stack.depth(), 1);
    /// ```
    pub fn restore(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Get the current stack depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drop every saved state and return to the initial state.
    pub fn reset(&mut self) {
        self.stack.truncate(1);
        self.stack[0] = DrawState::new();
    }
}

impl Default for DrawStateStack {
    fn default() -> Self {
        Self::new()
    }
}
