//! Drawing context used by the compositor.
//!
//! A [`Canvas`] owns a transparent overlay layer the size of the target
//! surface and a [`DrawStateStack`]. Watermark text is rasterized into the
//! layer; [`Canvas::composite_onto`] then blends the layer over the source
//! pixels. Pixels the layer never touched are left bit-identical.

use super::create_fill_paint;
use super::draw_state::{DrawState, DrawStateStack, TextAlign, TextBaseline};
use super::fonts::FontBook;
use super::text_rasterizer::TextRasterizer;
use crate::config::Rgb;
use crate::error::{Error, Result};

use image::{Rgba, RgbaImage};
use tiny_skia::{Color, FillRule, Pixmap, PremultipliedColorU8, Transform};

/// Drawing context with an overlay layer and save/restore state.
pub struct Canvas {
    layer: Pixmap,
    states: DrawStateStack,
    rasterizer: TextRasterizer,
}

impl Canvas {
    /// Create a canvas of the given pixel size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            layer: allocate(width, height)?,
            states: DrawStateStack::new(),
            rasterizer: TextRasterizer::new(),
        })
    }

    /// Layer width in pixels.
    pub fn width(&self) -> u32 {
        self.layer.width()
    }

    /// Layer height in pixels.
    pub fn height(&self) -> u32 {
        self.layer.height()
    }

    /// Prepare the canvas for a new frame of the given size.
    ///
    /// The layer is cleared (and reallocated only when the size changed) and
    /// the state stack returns to its initial state.
    pub fn reset(&mut self, width: u32, height: u32) -> Result<()> {
        if self.layer.width() != width || self.layer.height() != height {
            self.layer = allocate(width, height)?;
        } else {
            self.layer.fill(Color::TRANSPARENT);
        }
        self.states.reset();
        Ok(())
    }

    /// Current drawing state.
    pub fn state(&self) -> &DrawState {
        self.states.current()
    }

    /// Number of states on the stack (1 when nothing is saved).
    pub fn depth(&self) -> usize {
        self.states.depth()
    }

    /// Push a copy of the current state.
    pub fn save(&mut self) {
        self.states.save();
    }

    /// Pop back to the last saved state.
    pub fn restore(&mut self) {
        self.states.restore();
    }

    /// Run `f` between a `save` and a `restore`.
    ///
    /// The restore happens on every exit path, including when `f` returns an
    /// error, so no transform or style outlives the call.
    ///
    /// # Examples
    ///
    /// ```
    /// use watermark_oxide::rendering::Canvas;
    /// use watermark_oxide::Error;
    ///
    /// let mut canvas = Canvas::new(8, 8).unwrap();
    /// let result: Result<(), Error> = canvas.scoped(|c| {
    ///     c.set_global_alpha(0.3);
    ///     Err(Error::Surface("boom".into()))
    /// });
    /// assert!(result.is_err());
    /// assert_eq!(canvas.state().global_alpha, 1.0);
    /// assert_eq!(canvas.depth(), 1);
    /// ```
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let depth = self.states.depth();
        self.states.save();
        let result = f(self);
        // Also unwinds any unbalanced saves made inside `f`
        while self.states.depth() > depth {
            self.states.restore();
        }
        result
    }

    /// Move the origin by `(dx, dy)` in the current local space.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        let state = self.states.current_mut();
        state.transform = state.transform.pre_translate(dx, dy);
    }

    /// Rotate the local space by `degrees`, clockwise on the y-down surface.
    pub fn rotate(&mut self, degrees: f32) {
        let state = self.states.current_mut();
        state.transform = state.transform.pre_concat(Transform::from_rotate(degrees));
    }

    /// Set font size (pixels) and family.
    pub fn set_font(&mut self, size: f32, family: &str) {
        let state = self.states.current_mut();
        state.font_size = size;
        state.font_family = family.to_string();
    }

    /// Set the fill color.
    pub fn set_fill_color(&mut self, color: Rgb) {
        self.states.current_mut().fill_color = color;
    }

    /// Set the global alpha (clamped to [0, 1]).
    pub fn set_global_alpha(&mut self, alpha: f32) {
        self.states.current_mut().global_alpha = crate::config::clamp_opacity(alpha);
    }

    /// Set the horizontal text anchor.
    pub fn set_text_align(&mut self, align: TextAlign) {
        self.states.current_mut().text_align = align;
    }

    /// Set the vertical text anchor.
    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.states.current_mut().text_baseline = baseline;
    }

    /// Fill `text` at local `(x, y)` with the current state.
    pub fn fill_text(&mut self, fonts: &FontBook, text: &str, x: f32, y: f32) -> Result<()> {
        let state = self.states.current();
        let shaped = self.rasterizer.shape(
            fonts,
            text,
            state.font_size,
            &state.font_family,
            state.text_align,
            state.text_baseline,
        )?;

        let Some(path) = shaped.path else {
            return Ok(());
        };

        let paint = create_fill_paint(state);
        let transform = state.transform.pre_translate(x, y);
        self.layer.fill_path(&path, &paint, FillRule::Winding, transform, None);
        Ok(())
    }

    /// The overlay layer (premultiplied RGBA).
    pub fn layer(&self) -> &Pixmap {
        &self.layer
    }

    /// Blend the overlay layer source-over onto `target`.
    ///
    /// `target` holds straight (non-premultiplied) RGBA and must match the
    /// canvas size.
    pub fn composite_onto(&self, target: &mut RgbaImage) -> Result<()> {
        if target.width() != self.width() || target.height() != self.height() {
            return Err(Error::Surface(format!(
                "target is {}x{}, canvas is {}x{}",
                target.width(),
                target.height(),
                self.width(),
                self.height()
            )));
        }

        for (dst, src) in target.pixels_mut().zip(self.layer.pixels()) {
            if src.alpha() > 0 {
                source_over(dst, *src);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("depth", &self.depth())
            .finish()
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| Error::Surface(format!("Failed to create pixmap {}x{}", width, height)))
}

/// Porter-Duff source-over of a premultiplied pixel onto a straight one.
fn source_over(dst: &mut Rgba<u8>, src: PremultipliedColorU8) {
    let sa = src.alpha() as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let src_rgb = [src.red(), src.green(), src.blue()];
    for (i, sc) in src_rgb.iter().enumerate() {
        let premul = *sc as f32 / 255.0 + (dst[i] as f32 / 255.0) * da * (1.0 - sa);
        dst[i] = (premul / out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
