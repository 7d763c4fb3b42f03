//! Watermark rendering.
//!
//! This module turns a source image plus a [`WatermarkConfig`] into a
//! [`RenderedSurface`] using the pure-Rust `tiny-skia` rasterizer, with text
//! shaped by `rustybuzz` from faces found through `fontdb`.
//!
//! ## Example
//!
//! ```ignore
//! use watermark_oxide::rendering::Compositor;
//!
//! let compositor = Compositor::with_system_fonts();
//! let surface = compositor.render(&source, &config)?;
//! ```
//!
//! ## Architecture
//!
//! The rendering pipeline:
//!
//! 1. Copy the source pixels verbatim into the output buffer
//! 2. Translate to the anchor point and rotate (inside a saved drawing state)
//! 3. Shape and rasterize the text into a transparent overlay layer
//! 4. Restore the drawing state and blend the layer source-over onto the copy
//!
//! [`WatermarkConfig`]: crate::config::WatermarkConfig

mod canvas;
mod compositor;
mod draw_state;
mod fonts;
mod preview;
mod text_rasterizer;

pub use canvas::Canvas;
pub use compositor::{anchor_point, Compositor, RenderedSurface};
pub use draw_state::{DrawState, DrawStateStack, TextAlign, TextBaseline};
pub use fonts::FontBook;
pub use preview::Preview;
pub use text_rasterizer::{ShapedText, TextRasterizer, BLOCK_ADVANCE, BLOCK_ASCENT, BLOCK_DESCENT};

use tiny_skia::{Color, Paint};

/// Create a Paint configured for fill operations from drawing state.
///
/// Global alpha becomes the paint color's alpha.
pub(crate) fn create_fill_paint(state: &DrawState) -> Paint<'static> {
    let [r, g, b] = state.fill_color.to_array();
    let mut paint = Paint::default();
    paint.set_color(
        Color::from_rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            crate::config::clamp_opacity(state.global_alpha),
        )
        .unwrap_or(Color::BLACK),
    );
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rgb;

    #[test]
    fn test_fill_paint_uses_global_alpha() {
        let mut state = DrawState::new();
        state.fill_color = Rgb::new(255, 0, 0);
        state.global_alpha = 0.5;
        let paint = create_fill_paint(&state);
        assert!(paint.anti_alias);
        match paint.shader {
            tiny_skia::Shader::SolidColor(color) => {
                assert_eq!(color.red(), 1.0);
                assert_eq!(color.green(), 0.0);
                assert_eq!(color.alpha(), 0.5);
            },
            _ => panic!("expected a solid color shader"),
        }
    }
}
