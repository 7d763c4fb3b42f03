//! Text rasterizer - turns a text run into a fillable path.
//!
//! Text is shaped with `rustybuzz` against a face from the [`FontBook`] and
//! each glyph outline is appended to a single `tiny-skia` path in local
//! coordinates (y down), already offset for the requested alignment and
//! baseline. When the book has no usable face, every non-whitespace
//! character becomes a solid block so output stays deterministic.

use super::draw_state::{TextAlign, TextBaseline};
use super::fonts::FontBook;
use crate::error::{Error, Result};

use rustybuzz::ttf_parser::{GlyphId, OutlineBuilder};
use rustybuzz::{Face, UnicodeBuffer};
use tiny_skia::{Path, PathBuilder, Rect};

/// Block glyph advance, in em.
pub const BLOCK_ADVANCE: f32 = 0.6;
/// Block glyph height above the baseline, in em.
pub const BLOCK_ASCENT: f32 = 0.8;
/// Block glyph depth below the baseline, in em.
pub const BLOCK_DESCENT: f32 = 0.2;

/// A shaped, positioned text run.
#[derive(Debug, Clone)]
pub struct ShapedText {
    /// Glyph outlines in local coordinates; `None` when nothing is inked
    pub path: Option<Path>,
    /// Total advance width in pixels
    pub width: f32,
    /// True when block glyphs were used instead of a font face
    pub used_fallback: bool,
}

/// Vertical metrics in pixels, ascent positive, descent negative.
#[derive(Debug, Clone, Copy)]
struct LineMetrics {
    ascent: f32,
    descent: f32,
}

impl LineMetrics {
    /// Distance from the origin down to the alphabetic baseline.
    fn baseline_offset(&self, baseline: TextBaseline) -> f32 {
        match baseline {
            TextBaseline::Alphabetic => 0.0,
            TextBaseline::Top => self.ascent,
            TextBaseline::Middle => (self.ascent + self.descent) / 2.0,
            TextBaseline::Bottom => self.descent,
        }
    }
}

fn align_offset(align: TextAlign, width: f32) -> f32 {
    match align {
        TextAlign::Start => 0.0,
        TextAlign::Center => -width / 2.0,
        TextAlign::End => -width,
    }
}

/// Rasterizer for watermark text.
pub struct TextRasterizer {
    // Stateless for now; faces are looked up per call
}

impl TextRasterizer {
    /// Create a new text rasterizer.
    pub fn new() -> Self {
        Self {}
    }

    /// Shape `text` and lay it out around the local origin.
    pub fn shape(
        &self,
        fonts: &FontBook,
        text: &str,
        font_size: f32,
        font_family: &str,
        align: TextAlign,
        baseline: TextBaseline,
    ) -> Result<ShapedText> {
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(Error::Surface(format!("invalid font size {}", font_size)));
        }

        if let Some(id) = fonts.resolve(font_family) {
            let shaped = fonts
                .with_face_data(id, |data, index| {
                    shape_with_face(data, index, text, font_size, align, baseline)
                })
                .flatten();
            if let Some(shaped) = shaped {
                return Ok(shaped);
            }
            log::warn!("Font face for '{}' could not be parsed, using block glyphs", font_family);
        }

        Ok(shape_blocks(text, font_size, align, baseline))
    }
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends glyph outlines to a path, mapping font units (y up) to local
/// pixels (y down).
struct GlyphPathSink {
    builder: PathBuilder,
    scale: f32,
    dx: f32,
    dy: f32,
}

impl GlyphPathSink {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.dx + x * self.scale, self.dy - y * self.scale)
    }
}

impl OutlineBuilder for GlyphPathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn shape_with_face(
    data: &[u8],
    index: u32,
    text: &str,
    font_size: f32,
    align: TextAlign,
    baseline: TextBaseline,
) -> Option<ShapedText> {
    let face = Face::from_slice(data, index)?;
    let units_per_em = face.units_per_em();
    if units_per_em == 0 {
        return None;
    }
    let scale = font_size / units_per_em as f32;

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    let glyphs = rustybuzz::shape(&face, &[], buffer);

    let advance: i32 = glyphs.glyph_positions().iter().map(|p| p.x_advance).sum();
    let width = advance as f32 * scale;

    let metrics = LineMetrics {
        ascent: face.ascender() as f32 * scale,
        descent: face.descender() as f32 * scale,
    };
    let baseline_y = metrics.baseline_offset(baseline);

    let mut sink = GlyphPathSink {
        builder: PathBuilder::new(),
        scale,
        dx: 0.0,
        dy: 0.0,
    };
    let mut pen_x = align_offset(align, width);

    for (info, pos) in glyphs.glyph_infos().iter().zip(glyphs.glyph_positions()) {
        sink.dx = pen_x + pos.x_offset as f32 * scale;
        sink.dy = baseline_y - pos.y_offset as f32 * scale;
        // Glyphs without outlines (spaces) just advance the pen
        let _ = face.outline_glyph(GlyphId(info.glyph_id as u16), &mut sink);
        pen_x += pos.x_advance as f32 * scale;
    }

    Some(ShapedText {
        path: sink.builder.finish(),
        width,
        used_fallback: false,
    })
}

fn shape_blocks(text: &str, font_size: f32, align: TextAlign, baseline: TextBaseline) -> ShapedText {
    let cell = BLOCK_ADVANCE * font_size;
    let width = text.chars().count() as f32 * cell;

    let metrics = LineMetrics {
        ascent: BLOCK_ASCENT * font_size,
        descent: -BLOCK_DESCENT * font_size,
    };
    let baseline_y = metrics.baseline_offset(baseline);
    let top = baseline_y - metrics.ascent;
    let bottom = baseline_y - metrics.descent;
    let origin_x = align_offset(align, width);

    // Consecutive inked cells merge into one rectangle so no seams appear
    // between neighbouring glyphs.
    let mut builder = PathBuilder::new();
    let mut run_start: Option<usize> = None;
    let push_run = |builder: &mut PathBuilder, start: usize, end: usize| {
        let left = origin_x + start as f32 * cell;
        let right = origin_x + end as f32 * cell;
        if let Some(rect) = Rect::from_ltrb(left, top, right, bottom) {
            builder.push_rect(rect);
        }
    };

    let count = text.chars().count();
    for (i, ch) in text.chars().enumerate() {
        match (ch.is_whitespace(), run_start) {
            (false, None) => run_start = Some(i),
            (true, Some(start)) => {
                push_run(&mut builder, start, i);
                run_start = None;
            },
            _ => {},
        }
    }
    if let Some(start) = run_start {
        push_run(&mut builder, start, count);
    }

    ShapedText {
        path: builder.finish(),
        width,
        used_fallback: true,
    }
}
