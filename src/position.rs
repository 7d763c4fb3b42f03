//! Interactive position mapping.
//!
//! Pointer coordinates arrive in on-screen pixels over a displayed (possibly
//! zoomed) surface. They are mapped to the normalized `[0, 100] x [0, 100]`
//! anchor space of [`WatermarkConfig`] and written through a
//! [`PositionTarget`].
//!
//! The drag handling is an explicit state machine:
//!
//! ```text
//! Idle --press--> Dragging --move--> Dragging --release/leave--> Idle
//! ```
//!
//! A press applies the position immediately, so a plain click (press and
//! release with no move) also repositions the watermark.

use crate::config::{clamp_percent, WatermarkConfig, WatermarkPatch};

use std::fmt;

/// Normalized watermark anchor, both axes in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Horizontal percentage of the surface width
    pub x: f32,
    /// Vertical percentage of the surface height
    pub y: f32,
}

impl Position {
    /// Create a position, clamping both axes into [0, 100].
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }
}

impl From<Position> for WatermarkPatch {
    fn from(position: Position) -> Self {
        WatermarkPatch::position(position.x, position.y)
    }
}

/// On-screen rectangle of the displayed surface, in pointer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Displayed width
    pub width: f32,
    /// Displayed height
    pub height: f32,
}

impl SurfaceBounds {
    /// Create bounds from an origin and size.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// True when the rectangle has a usable, finite, positive area.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.width <= 0.0 || self.height <= 0.0
    }
}

/// Map a pointer location over `bounds` to a normalized position.
///
/// The offset inside the rectangle is divided by its size and scaled to
/// percent. Pointers outside the rectangle clamp to the nearest edge.
/// Returns `None` for degenerate bounds (zero, negative or non-finite size),
/// where no meaningful mapping exists.
///
/// # Examples
///
/// ```
/// use watermark_oxide::position::{pointer_to_position, Position, SurfaceBounds};
///
/// let bounds = SurfaceBounds::new(100.0, 50.0, 400.0, 200.0);
/// assert_eq!(pointer_to_position((300.0, 100.0), &bounds), Some(Position { x: 50.0, y: 25.0 }));
/// assert_eq!(pointer_to_position((-20.0, 900.0), &bounds), Some(Position { x: 0.0, y: 100.0 }));
/// ```
pub fn pointer_to_position(pointer: (f32, f32), bounds: &SurfaceBounds) -> Option<Position> {
    if bounds.is_degenerate() {
        return None;
    }
    let x = (pointer.0 - bounds.left) / bounds.width * 100.0;
    let y = (pointer.1 - bounds.top) / bounds.height * 100.0;
    Some(Position::new(x, y))
}

/// Something that holds a watermark anchor and accepts new positions.
pub trait PositionTarget {
    /// Store `position` as the watermark anchor.
    fn apply_position(&mut self, position: Position);
}

impl PositionTarget for WatermarkConfig {
    fn apply_position(&mut self, position: Position) {
        self.apply(&position.into());
    }
}

/// Drag session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No pointer is held
    #[default]
    Idle,
    /// Pointer pressed over the surface; moves reposition
    Dragging,
}

/// Pointer drag session over a displayed surface.
///
/// # Examples
///
/// ```
/// use watermark_oxide::config::WatermarkConfig;
/// use watermark_oxide::position::{DragSession, SurfaceBounds};
///
/// let bounds = SurfaceBounds::new(0.0, 0.0, 200.0, 100.0);
/// let mut config = WatermarkConfig::default();
/// let mut drag = DragSession::new();
///
/// drag.press((20.0, 10.0), &bounds, &mut config);
/// drag.move_to((100.0, 50.0), &bounds, &mut config);
/// drag.release();
/// drag.move_to((200.0, 100.0), &bounds, &mut config);
///
/// assert_eq!((config.x, config.y), (50.0, 50.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    state: DragState,
    last: Option<Position>,
}

impl DragSession {
    /// New idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// True while a drag is active.
    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Last position this session applied.
    pub fn last_position(&self) -> Option<Position> {
        self.last
    }

    /// Pointer pressed: apply the position and start dragging.
    ///
    /// With degenerate bounds nothing is applied and the session stays idle.
    pub fn press<T: PositionTarget + ?Sized>(
        &mut self,
        pointer: (f32, f32),
        bounds: &SurfaceBounds,
        target: &mut T,
    ) -> Option<Position> {
        let position = pointer_to_position(pointer, bounds)?;
        target.apply_position(position);
        self.last = Some(position);
        self.state = DragState::Dragging;
        log::debug!("Drag started at ({:.1}, {:.1})", position.x, position.y);
        Some(position)
    }

    /// Pointer moved: apply the position while dragging, else do nothing.
    pub fn move_to<T: PositionTarget + ?Sized>(
        &mut self,
        pointer: (f32, f32),
        bounds: &SurfaceBounds,
        target: &mut T,
    ) -> Option<Position> {
        if self.state != DragState::Dragging {
            return None;
        }
        let position = pointer_to_position(pointer, bounds)?;
        target.apply_position(position);
        self.last = Some(position);
        Some(position)
    }

    /// Pointer released: end the session.
    pub fn release(&mut self) {
        self.end("release");
    }

    /// Pointer left the tracking surface: end the session.
    pub fn leave(&mut self) {
        self.end("leave");
    }

    fn end(&mut self, reason: &str) {
        if self.state == DragState::Dragging {
            log::debug!("Drag ended on {}", reason);
        }
        self.state = DragState::Idle;
    }
}

/// Tolerance, in percent, for treating the anchor as sitting on a preset.
pub const PRESET_TOLERANCE: f32 = 5.0;

/// Nine-point quick position grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PositionPreset {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl PositionPreset {
    /// All presets in grid order, row by row.
    pub const ALL: [PositionPreset; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::Center,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Anchor for this preset.
    pub fn position(self) -> Position {
        let (x, y) = match self {
            Self::TopLeft => (10.0, 10.0),
            Self::TopCenter => (50.0, 10.0),
            Self::TopRight => (90.0, 10.0),
            Self::MiddleLeft => (10.0, 50.0),
            Self::Center => (50.0, 50.0),
            Self::MiddleRight => (90.0, 50.0),
            Self::BottomLeft => (10.0, 90.0),
            Self::BottomCenter => (50.0, 90.0),
            Self::BottomRight => (90.0, 90.0),
        };
        Position { x, y }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::TopLeft => "Top left",
            Self::TopCenter => "Top center",
            Self::TopRight => "Top right",
            Self::MiddleLeft => "Middle left",
            Self::Center => "Center",
            Self::MiddleRight => "Middle right",
            Self::BottomLeft => "Bottom left",
            Self::BottomCenter => "Bottom center",
            Self::BottomRight => "Bottom right",
        }
    }

    /// Move the anchor of `target` to this preset.
    pub fn apply<T: PositionTarget + ?Sized>(self, target: &mut T) {
        target.apply_position(self.position());
    }

    /// Whether `config`'s anchor is within [`PRESET_TOLERANCE`] of this preset on both axes.
    pub fn is_active(self, config: &WatermarkConfig) -> bool {
        let p = self.position();
        (config.x - p.x).abs() <= PRESET_TOLERANCE && (config.y - p.y).abs() <= PRESET_TOLERANCE
    }

    /// The preset `config` currently sits on, if any.
    pub fn active_for(config: &WatermarkConfig) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.is_active(config))
    }
}

impl fmt::Display for PositionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Preview zoom factor.
///
/// Zoom only scales the displayed rectangle about its center. Pointer
/// mapping goes through [`PreviewZoom::display_bounds`], so the same
/// surface point maps to the same normalized position at every zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewZoom {
    factor: f32,
}

impl PreviewZoom {
    /// Smallest zoom factor.
    pub const MIN: f32 = 0.5;
    /// Largest zoom factor.
    pub const MAX: f32 = 3.0;
    /// Zoom step per in/out action.
    pub const STEP: f32 = 0.2;

    /// Unzoomed (1.0).
    pub fn new() -> Self {
        Self { factor: 1.0 }
    }

    /// Zoom at `factor`, clamped into range. NaN gives 1.0.
    pub fn with_factor(factor: f32) -> Self {
        if factor.is_nan() {
            return Self::new();
        }
        Self {
            factor: round_tenth(factor.clamp(Self::MIN, Self::MAX)),
        }
    }

    /// Current factor.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Factor as a whole percentage, e.g. `120` for 1.2.
    pub fn percent(&self) -> u32 {
        (self.factor * 100.0).round() as u32
    }

    /// Increase by one step, up to [`Self::MAX`].
    pub fn zoom_in(&mut self) -> f32 {
        self.factor = round_tenth((self.factor + Self::STEP).min(Self::MAX));
        self.factor
    }

    /// Decrease by one step, down to [`Self::MIN`].
    pub fn zoom_out(&mut self) -> f32 {
        self.factor = round_tenth((self.factor - Self::STEP).max(Self::MIN));
        self.factor
    }

    /// On-screen rectangle of a surface laid out at `layout` once scaled
    /// about its center by this zoom.
    pub fn display_bounds(&self, layout: &SurfaceBounds) -> SurfaceBounds {
        let width = layout.width * self.factor;
        let height = layout.height * self.factor;
        SurfaceBounds {
            left: layout.left + (layout.width - width) / 2.0,
            top: layout.top + (layout.height - height) / 2.0,
            width,
            height,
        }
    }
}

impl Default for PreviewZoom {
    fn default() -> Self {
        Self::new()
    }
}

// Keeps repeated steps from drifting (1.0 + 0.2 * 10 lands on 3.0)
fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
