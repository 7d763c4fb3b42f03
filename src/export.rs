//! Export encoder - renders at native resolution and encodes the result.
//!
//! Export always renders through a fresh [`Compositor::render`] call at the
//! source's own pixel size, so it shares no surface with a live preview and
//! never sees a display zoom.

use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::rendering::{Compositor, RenderedSurface};
use crate::source::SourceImage;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::path::Path;

/// Output encoding family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG (lossless, keeps transparency)
    #[default]
    Lossless,
    /// JPEG (lossy, quality-controlled, no alpha)
    Lossy,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Lossless => "png",
            ExportFormat::Lossy => "jpg",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Lossless => "image/png",
            ExportFormat::Lossy => "image/jpeg",
        }
    }
}

/// Options for export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Output format
    pub format: ExportFormat,
    /// Quality in [0, 1]; only used for [`ExportFormat::Lossy`]
    pub quality: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Lossless,
            quality: 0.9,
        }
    }
}

impl ExportOptions {
    /// Lossless output.
    pub fn lossless() -> Self {
        Self::default()
    }

    /// Lossy output at `quality` in [0, 1].
    pub fn lossy(quality: f32) -> Self {
        Self {
            format: ExportFormat::Lossy,
            quality,
        }
    }

    /// Encoder quality (1-100) for lossy output.
    ///
    /// Fails for a non-finite quality. Out-of-range values clamp.
    pub fn jpeg_quality(&self) -> Result<u8> {
        if !self.quality.is_finite() {
            return Err(Error::Encode(format!("quality {} is not a number in [0, 1]", self.quality)));
        }
        Ok((self.quality * 100.0).round().clamp(1.0, 100.0) as u8)
    }
}

/// Encoded export output.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Output format
    pub format: ExportFormat,
}

impl ExportedImage {
    /// Get the image data as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Extension matching the format (`png` or `jpg`).
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// MIME type matching the format.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Download name for the image, e.g. `watermarked-image.png`.
    pub fn suggested_filename(&self) -> String {
        format!("watermarked-image.{}", self.extension())
    }

    /// Encode as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }

    /// Save the image to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.data)?;
        Ok(())
    }
}

/// Export front end bound to a compositor.
#[derive(Debug, Clone, Copy)]
pub struct Exporter<'a> {
    compositor: &'a Compositor,
}

impl<'a> Exporter<'a> {
    /// Create an exporter drawing with `compositor`.
    pub fn new(compositor: &'a Compositor) -> Self {
        Self { compositor }
    }

    /// Render and encode `image` with `options`.
    pub fn export(
        &self,
        image: Option<&SourceImage>,
        config: &WatermarkConfig,
        options: &ExportOptions,
    ) -> Result<ExportedImage> {
        export(self.compositor, image, config, options.format, options.quality)
    }
}

/// Render `image` with `config` at native resolution and encode it.
///
/// Fails with [`Error::NoImage`] when no image is given and with
/// [`Error::Encode`] when encoding fails. No bytes are produced on failure.
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use watermark_oxide::config::WatermarkConfig;
/// use watermark_oxide::export::{export, ExportFormat};
/// use watermark_oxide::rendering::{Compositor, FontBook};
/// use watermark_oxide::source::SourceImage;
/// use watermark_oxide::Error;
///
/// let compositor = Compositor::new(FontBook::empty());
/// let config = WatermarkConfig::default();
///
/// let missing = export(&compositor, None, &config, ExportFormat::Lossless, 1.0);
/// assert!(matches!(missing, Err(Error::NoImage)));
///
/// let source = SourceImage::from_rgba(RgbaImage::from_pixel(16, 16, Rgba([9, 9, 9, 255]))).unwrap();
/// let out = export(&compositor, Some(&source), &config, ExportFormat::Lossy, 0.8).unwrap();
/// assert_eq!(out.suggested_filename(), "watermarked-image.jpg");
/// ```
pub fn export(
    compositor: &Compositor,
    image: Option<&SourceImage>,
    config: &WatermarkConfig,
    format: ExportFormat,
    quality: f32,
) -> Result<ExportedImage> {
    let source = image.ok_or(Error::NoImage)?;
    let options = ExportOptions { format, quality };

    // Validate before rendering so a bad quality costs nothing
    let jpeg_quality = match format {
        ExportFormat::Lossy => Some(options.jpeg_quality()?),
        ExportFormat::Lossless => None,
    };

    let surface = compositor.render(source, config)?;
    let data = match jpeg_quality {
        Some(q) => encode_jpeg(&surface, q)?,
        None => encode_png(&surface)?,
    };

    log::info!(
        "Exported {}x{} {} ({} bytes)",
        surface.width(),
        surface.height(),
        format.extension(),
        data.len()
    );

    Ok(ExportedImage {
        data,
        width: surface.width(),
        height: surface.height(),
        format,
    })
}

/// Encode a surface with the given options.
pub fn encode_surface(surface: &RenderedSurface, options: &ExportOptions) -> Result<Vec<u8>> {
    match options.format {
        ExportFormat::Lossless => encode_png(surface),
        ExportFormat::Lossy => encode_jpeg(surface, options.jpeg_quality()?),
    }
}

fn encode_png(surface: &RenderedSurface) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    PngEncoder::new(&mut output)
        .write_image(surface.as_raw(), surface.width(), surface.height(), ColorType::Rgba8)
        .map_err(|e| Error::Encode(format!("PNG encoding failed: {}", e)))?;
    Ok(output)
}

/// Encode to JPEG. JPEG has no alpha, so pixels are flattened over black.
fn encode_jpeg(surface: &RenderedSurface, quality: u8) -> Result<Vec<u8>> {
    let mut rgb_data = Vec::with_capacity(surface.as_raw().len() / 4 * 3);
    for chunk in surface.as_raw().chunks_exact(4) {
        let alpha = chunk[3] as u32;
        for &c in &chunk[..3] {
            rgb_data.push(((c as u32 * alpha + 127) / 255) as u8);
        }
    }

    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, quality)
        .encode(&rgb_data, surface.width(), surface.height(), ColorType::Rgb8)
        .map_err(|e| Error::Encode(format!("JPEG encoding failed: {}", e)))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::FontBook;
    use image::{Rgba, RgbaImage};

    fn source(rgba: [u8; 4]) -> SourceImage {
        SourceImage::from_rgba(RgbaImage::from_pixel(24, 16, Rgba(rgba))).unwrap()
    }

    #[test]
    fn test_export_options_default() {
        let opts = ExportOptions::default();
        assert_eq!(opts.format, ExportFormat::Lossless);
        assert_eq!(opts.quality, 0.9);
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(ExportOptions::lossy(0.1).jpeg_quality().unwrap(), 10);
        assert_eq!(ExportOptions::lossy(1.0).jpeg_quality().unwrap(), 100);
        assert_eq!(ExportOptions::lossy(0.0).jpeg_quality().unwrap(), 1);
        assert_eq!(ExportOptions::lossy(7.0).jpeg_quality().unwrap(), 100);
        assert!(matches!(ExportOptions::lossy(f32::NAN).jpeg_quality(), Err(Error::Encode(_))));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::Lossless.extension(), "png");
        assert_eq!(ExportFormat::Lossy.extension(), "jpg");
        assert_eq!(ExportFormat::Lossy.mime_type(), "image/jpeg");
        assert_eq!(serde_json::to_string(&ExportFormat::Lossy).unwrap(), "\"lossy\"");
    }

    #[test]
    fn test_lossless_ignores_quality() {
        let compositor = Compositor::new(FontBook::empty());
        let img = source([1, 2, 3, 255]);
        let config = WatermarkConfig::default();
        let a = export(&compositor, Some(&img), &config, ExportFormat::Lossless, f32::NAN).unwrap();
        let b = export(&compositor, Some(&img), &config, ExportFormat::Lossless, 0.1).unwrap();
        assert_eq!(a.data, b.data);
        assert_eq!(a.extension(), "png");
    }

    #[test]
    fn test_lossy_nan_quality_fails() {
        let compositor = Compositor::new(FontBook::empty());
        let img = source([1, 2, 3, 255]);
        let result = export(&compositor, Some(&img), &WatermarkConfig::default(), ExportFormat::Lossy, f32::NAN);
        assert!(matches!(result, Err(Error::Encode(_))));
    }

    #[test]
    fn test_jpeg_flattens_over_black() {
        let compositor = Compositor::new(FontBook::empty());
        let img = source([255, 255, 255, 0]);
        let config = WatermarkConfig::default().with_text("");
        let out = export(&compositor, Some(&img), &config, ExportFormat::Lossy, 1.0).unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgb8();
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c < 8)));
    }

    #[test]
    fn test_data_uri() {
        let out = ExportedImage {
            data: vec![1, 2, 3],
            width: 1,
            height: 1,
            format: ExportFormat::Lossless,
        };
        assert_eq!(out.to_data_uri(), "data:image/png;base64,AQID");
    }
}
