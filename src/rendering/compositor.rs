//! Watermark compositor - renders a source image with its text overlay.

use super::canvas::Canvas;
use super::draw_state::{TextAlign, TextBaseline};
use super::fonts::FontBook;
use crate::config::WatermarkConfig;
use crate::error::Result;
use crate::source::SourceImage;

use image::RgbaImage;

/// A rendered pixel buffer, always the size of its source image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSurface {
    image: RgbaImage,
}

impl RenderedSurface {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at `(x, y)` as straight RGBA, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    /// Borrow the underlying image.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Renders `(source image, watermark config)` pairs into surfaces.
///
/// The compositor holds only fonts; it never keeps a surface between calls,
/// so preview and export renders cannot interfere with each other.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use watermark_oxide::config::{Rgb, WatermarkConfig};
/// use watermark_oxide::rendering::{Compositor, FontBook};
/// use watermark_oxide::source::SourceImage;
///
/// let source = SourceImage::from_rgba(RgbaImage::from_pixel(80, 60, Rgba([255; 4]))).unwrap();
/// let config = WatermarkConfig::default()
///     .with_text("HI")
///     .with_color(Rgb::new(255, 0, 0))
///     .with_opacity(1.0);
///
/// let compositor = Compositor::new(FontBook::empty());
/// let surface = compositor.render(&source, &config).unwrap();
/// assert_eq!((surface.width(), surface.height()), (80, 60));
/// assert_eq!(surface.pixel(40, 30), Some([255, 0, 0, 255]));
/// ```
#[derive(Debug)]
pub struct Compositor {
    fonts: FontBook,
}

impl Compositor {
    /// Create a compositor drawing with the given fonts.
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }

    /// Create a compositor using the system's installed fonts.
    pub fn with_system_fonts() -> Self {
        Self::new(FontBook::system())
    }

    /// Fonts used for watermark text.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Mutable access to the fonts, e.g. to load a bundled face.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Render `source` with the watermark described by `config`.
    ///
    /// The output has exactly the source's dimensions. With empty text the
    /// output is a verbatim copy of the source pixels.
    pub fn render(&self, source: &SourceImage, config: &WatermarkConfig) -> Result<RenderedSurface> {
        self.render_with(source, config, Canvas::new)
    }

    /// Render with a canvas from `make_canvas`, called only when there is
    /// text to draw.
    fn render_with(
        &self,
        source: &SourceImage,
        config: &WatermarkConfig,
        make_canvas: impl FnOnce(u32, u32) -> Result<Canvas>,
    ) -> Result<RenderedSurface> {
        if !config.has_overlay() {
            log::debug!("Empty watermark text, copying source {}", source.id());
            return Ok(RenderedSurface {
                image: source.pixels().clone(),
            });
        }
        let mut canvas = make_canvas(source.width(), source.height())?;
        self.render_on(&mut canvas, source, config)
    }

    /// Render using a caller-owned canvas.
    ///
    /// Live preview keeps one canvas across frames; it is reset first, and
    /// every transform and style set for the watermark is restored before
    /// this returns.
    pub fn render_on(
        &self,
        canvas: &mut Canvas,
        source: &SourceImage,
        config: &WatermarkConfig,
    ) -> Result<RenderedSurface> {
        let (width, height) = (source.width(), source.height());
        log::debug!("Rendering {}x{} surface (source {})", width, height, source.id());

        let mut image = source.pixels().clone();

        if config.has_overlay() {
            canvas.reset(width, height)?;
            self.draw_watermark(canvas, &config.clamped(), width, height)?;
            canvas.composite_onto(&mut image)?;
        }

        Ok(RenderedSurface { image })
    }

    fn draw_watermark(
        &self,
        canvas: &mut Canvas,
        config: &WatermarkConfig,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let (ax, ay) = anchor_point(config, width, height);

        canvas.scoped(|c| {
            c.translate(ax, ay);
            c.rotate(config.rotation as f32);
            c.set_font(config.font_size, &config.font_family);
            c.set_fill_color(config.color);
            c.set_global_alpha(config.opacity);
            c.set_text_align(TextAlign::Center);
            c.set_text_baseline(TextBaseline::Middle);
            c.fill_text(&self.fonts, &config.text, 0.0, 0.0)
        })
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::with_system_fonts()
    }
}

/// Watermark anchor in surface pixels: `x%` of the width, `y%` of the height.
pub fn anchor_point(config: &WatermarkConfig, width: u32, height: u32) -> (f32, f32) {
    (config.x / 100.0 * width as f32, config.y / 100.0 * height as f32)
}

#[cfg(test)]
pub(crate) fn solid_source(width: u32, height: u32, rgba: [u8; 4]) -> Result<SourceImage> {
    SourceImage::from_rgba(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
}
