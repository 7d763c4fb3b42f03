//! Watermark configuration.
//!
//! [`WatermarkConfig`] is the value type handed to the compositor on every
//! render. It is owned by the caller; the compositor only reads it.
//! Partial updates arrive as a [`WatermarkPatch`] and are merged with
//! [`WatermarkConfig::apply`], which clamps every field into its valid range.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower/upper bound of the percentage position axes.
pub const POSITION_RANGE: (f32, f32) = (0.0, 100.0);

/// Lower/upper bound of the rotation in degrees.
pub const ROTATION_RANGE: (i32, i32) = (-180, 180);

/// Smallest font size a patch can store.
pub const MIN_FONT_SIZE: f32 = 1.0;

/// Placeholder text used by the default configuration.
pub const DEFAULT_TEXT: &str = "示例水印";

/// An opaque RGB fill color.
///
/// Parses `#RRGGBB` and the short `#RGB` form (case-insensitive, the leading
/// `#` is optional) and always displays as upper-case `#RRGGBB`.
///
/// # Examples
///
/// ```
/// use watermark_oxide::config::Rgb;
///
/// let red: Rgb = "#ff0000".parse().unwrap();
/// assert_eq!(red, Rgb::new(255, 0, 0));
/// assert_eq!(red.to_string(), "#FF0000");
///
/// let short = Rgb::from_hex("#0f0").unwrap();
/// assert_eq!(short, Rgb::new(0, 255, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Black, the default watermark color.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string.
    pub fn from_hex(input: &str) -> Result<Self> {
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || Error::InvalidColor(input.to_string());

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
                Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
            },
            3 => {
                // #abc expands to #aabbcc
                let channel = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| invalid())
                };
                Ok(Self::new(channel(0)?, channel(1)?, channel(2)?))
            },
            _ => Err(invalid()),
        }
    }

    /// Channels as an array.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

/// Watermark configuration.
///
/// Field names serialize in camelCase (`fontSize`, `fontFamily`, ...) so a
/// configuration can be exchanged with a UI layer as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatermarkConfig {
    /// Watermark text; empty text draws nothing
    pub text: String,
    /// Glyph height in pixels at 1.0 scale
    pub font_size: f32,
    /// Font family name; unknown families fall back to sans-serif
    pub font_family: String,
    /// Fill color
    pub color: Rgb,
    /// Global alpha in [0, 1]
    pub opacity: f32,
    /// Rotation in degrees, clockwise-positive, in [-180, 180]
    pub rotation: i32,
    /// Anchor x as a percentage of surface width, in [0, 100]
    pub x: f32,
    /// Anchor y as a percentage of surface height, in [0, 100]
    pub y: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            font_size: 24.0,
            font_family: "Arial".to_string(),
            color: Rgb::BLACK,
            opacity: 0.5,
            rotation: 0,
            x: 50.0,
            y: 50.0,
        }
    }
}

impl WatermarkConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the watermark text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the font size in pixels.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = clamp_font_size(size);
        self
    }

    /// Set the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Set the opacity (clamped to [0, 1]).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = clamp_opacity(opacity);
        self
    }

    /// Set the rotation in degrees (clamped to [-180, 180]).
    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = clamp_rotation(degrees);
        self
    }

    /// Set the anchor position in percent (clamped to [0, 100]).
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = clamp_percent(x);
        self.y = clamp_percent(y);
        self
    }

    /// Whether a render with this configuration draws anything on top of the
    /// source pixels.
    pub fn has_overlay(&self) -> bool {
        !self.text.is_empty()
    }

    /// Merge a partial update into this configuration.
    ///
    /// Fields present in `patch` are clamped and stored; absent fields are
    /// left untouched. Returns `true` when any field changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use watermark_oxide::config::{WatermarkConfig, WatermarkPatch};
    ///
    /// let mut config = WatermarkConfig::default();
    /// let changed = config.apply(&WatermarkPatch::position(73.0, 12.0));
    /// assert!(changed);
    /// assert_eq!((config.x, config.y), (73.0, 12.0));
    ///
    /// config.apply(&WatermarkPatch { opacity: Some(4.0), ..Default::default() });
    /// assert_eq!(config.opacity, 1.0);
    /// ```
    pub fn apply(&mut self, patch: &WatermarkPatch) -> bool {
        let before = self.clone();

        if let Some(text) = &patch.text {
            self.text.clone_from(text);
        }
        if let Some(size) = patch.font_size {
            self.font_size = clamp_font_size(size);
        }
        if let Some(family) = &patch.font_family {
            self.font_family.clone_from(family);
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_opacity(opacity);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = clamp_rotation(rotation);
        }
        if let Some(x) = patch.x {
            self.x = clamp_percent(x);
        }
        if let Some(y) = patch.y {
            self.y = clamp_percent(y);
        }

        *self != before
    }

    /// Copy of this configuration with every field forced into range.
    ///
    /// Fields edited directly (bypassing [`apply`](Self::apply)) may be out of
    /// range; the compositor reads through this so it never draws with them.
    pub fn clamped(&self) -> Self {
        Self {
            text: self.text.clone(),
            font_size: clamp_font_size(self.font_size),
            font_family: self.font_family.clone(),
            color: self.color,
            opacity: clamp_opacity(self.opacity),
            rotation: clamp_rotation(self.rotation),
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
        }
    }
}

/// Partial watermark configuration.
///
/// Every field is optional; `None` leaves the current value in place.
///
/// ```
/// use watermark_oxide::config::WatermarkPatch;
///
/// let patch: WatermarkPatch = serde_json::from_str(r#"{"x":73,"fontSize":30}"#).unwrap();
/// assert_eq!(patch.x, Some(73.0));
/// assert_eq!(patch.font_size, Some(30.0));
/// assert!(patch.y.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatermarkPatch {
    /// New text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New font size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// New font family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// New fill color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    /// New opacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// New rotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<i32>,
    /// New anchor x
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    /// New anchor y
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
}

impl WatermarkPatch {
    /// Patch that only moves the anchor.
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Patch that only replaces the text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// True when the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Clamp a percentage into [0, 100]. NaN maps to 0.
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        return POSITION_RANGE.0;
    }
    value.clamp(POSITION_RANGE.0, POSITION_RANGE.1)
}

/// Clamp an opacity into [0, 1]. NaN maps to 0.
pub fn clamp_opacity(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Clamp a rotation into [-180, 180].
pub fn clamp_rotation(degrees: i32) -> i32 {
    degrees.clamp(ROTATION_RANGE.0, ROTATION_RANGE.1)
}

fn clamp_font_size(size: f32) -> f32 {
    if size.is_finite() {
        size.max(MIN_FONT_SIZE)
    } else {
        MIN_FONT_SIZE
    }
}
