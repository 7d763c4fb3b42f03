//! Error types for the watermark library.
//!
//! This module defines all error types that can occur while loading source
//! images, compositing the watermark and encoding the result.

/// Result type alias for watermark library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during watermark processing.
///
/// None of these are transient: retrying with the same input yields the same
/// error, so callers turn them into a user-visible message instead of retrying.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// The source could not be decoded into a raster image
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// A render or export was requested with no source image loaded
    #[error("No image loaded")]
    NoImage,

    /// The composited surface could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Color string is not `#RRGGBB` or `#RGB`
    #[error("Invalid color '{0}': expected #RRGGBB or #RGB")]
    InvalidColor(String),

    /// Malformed data URI, or one that does not carry an image
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// A drawing surface could not be allocated
    #[error("Surface error: {0}")]
    Surface(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_decode_error() {
        let err = Error::ImageDecode("unsupported signature".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Image decode error"));
        assert!(msg.contains("unsupported signature"));
    }

    #[test]
    fn test_no_image_error() {
        let err = Error::NoImage;
        assert_eq!(format!("{}", err), "No image loaded");
    }

    #[test]
    fn test_invalid_color_error() {
        let err = Error::InvalidColor("#12".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("#12"));
        assert!(msg.contains("#RRGGBB"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{}", err).contains("missing.png"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
