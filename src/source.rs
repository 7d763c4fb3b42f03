//! Source image ingestion.
//!
//! A [`SourceImage`] is a fully decoded RGBA raster. It is decoded once per
//! load event and identified by a content hash ([`SourceId`]), so callers
//! can tell whether a new load actually changed the image.

use crate::error::{Error, Result};
use base64::Engine;
use image::RgbaImage;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Content-addressed identity of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId([u8; 32]);

impl SourceId {
    fn of_bytes(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    fn of_pixels(image: &RgbaImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(image.as_raw());
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A decoded raster image with known, non-zero dimensions.
///
/// Cloning is cheap: the pixel buffer is shared.
#[derive(Debug, Clone)]
pub struct SourceImage {
    id: SourceId,
    pixels: Arc<RgbaImage>,
}

impl SourceImage {
    /// Decode an encoded image (PNG or JPEG).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::ImageDecode("empty input".to_string()));
        }

        let decoded = image::load_from_memory(bytes).map_err(|e| {
            log::warn!("Failed to decode {} byte source: {}", bytes.len(), e);
            Error::ImageDecode(e.to_string())
        })?;

        let pixels = decoded.to_rgba8();
        check_dimensions(&pixels)?;

        log::debug!(
            "Decoded source image {}x{} ({} bytes)",
            pixels.width(),
            pixels.height(),
            bytes.len()
        );

        Ok(Self {
            id: SourceId::of_bytes(bytes),
            pixels: Arc::new(pixels),
        })
    }

    /// Decode a `data:image/...;base64,...` URI.
    ///
    /// Non-image MIME types and non-base64 payloads are rejected before any
    /// decoding is attempted.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidDataUri("missing 'data:' scheme".to_string()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidDataUri("missing ',' separator".to_string()))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default();
        if !mime.to_ascii_lowercase().starts_with("image/") {
            return Err(Error::InvalidDataUri(format!("not an image: '{}'", mime)));
        }
        if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(Error::InvalidDataUri("payload is not base64".to_string()));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidDataUri(format!("bad base64 payload: {}", e)))?;

        Self::decode(&bytes)
    }

    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes)
    }

    /// Wrap an already decoded RGBA buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        check_dimensions(&pixels)?;
        Ok(Self {
            id: SourceId::of_pixels(&pixels),
            pixels: Arc::new(pixels),
        })
    }

    /// Content identity of this image.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Decoded pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

fn check_dimensions(pixels: &RgbaImage) -> Result<()> {
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(Error::ImageDecode(format!(
            "image has no pixels ({}x{})",
            pixels.width(),
            pixels.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let source = SourceImage::decode(&png_bytes(4, 3)).unwrap();
        assert_eq!((source.width(), source.height()), (4, 3));
        assert_eq!(source.pixels().get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_decode_rejects_non_image() {
        let err = SourceImage::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));
        assert!(matches!(SourceImage::decode(&[]), Err(Error::ImageDecode(_))));
    }

    #[test]
    fn test_data_uri() {
        let payload = base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 2));
        let uri = format!("data:image/png;base64,{}", payload);
        let source = SourceImage::from_data_uri(&uri).unwrap();
        assert_eq!(source.width(), 2);
    }

    #[test]
    fn test_data_uri_rejects_other_mime() {
        let err = SourceImage::from_data_uri("data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert!(matches!(err, Error::InvalidDataUri(_)));
        assert!(format!("{}", err).contains("text/plain"));
    }

    #[test]
    fn test_data_uri_malformed() {
        assert!(matches!(
            SourceImage::from_data_uri("image/png;base64,AAAA"),
            Err(Error::InvalidDataUri(_))
        ));
        assert!(matches!(
            SourceImage::from_data_uri("data:image/png;base64"),
            Err(Error::InvalidDataUri(_))
        ));
        assert!(matches!(
            SourceImage::from_data_uri("data:image/png,rawbytes"),
            Err(Error::InvalidDataUri(_))
        ));
        assert!(matches!(
            SourceImage::from_data_uri("data:image/png;base64,@@@"),
            Err(Error::InvalidDataUri(_))
        ));
    }

    #[test]
    fn test_from_rgba_rejects_empty() {
        let err = SourceImage::from_rgba(RgbaImage::new(0, 5)).unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));
    }

    #[test]
    fn test_id_is_content_addressed() {
        let a = SourceImage::decode(&png_bytes(3, 3)).unwrap();
        let b = SourceImage::decode(&png_bytes(3, 3)).unwrap();
        let c = SourceImage::decode(&png_bytes(3, 4)).unwrap();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id().to_string().len(), 16);
    }
}
