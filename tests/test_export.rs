//! Integration tests for the export encoder.

use image::{Rgba, RgbaImage};
use tempfile::tempdir;
use watermark_oxide::config::{Rgb, WatermarkConfig};
use watermark_oxide::export::{export, ExportFormat, ExportOptions, Exporter};
use watermark_oxide::rendering::{Compositor, FontBook};
use watermark_oxide::source::SourceImage;
use watermark_oxide::Error;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn compositor() -> Compositor {
    Compositor::new(FontBook::empty())
}

/// Deterministic noise: hard for JPEG to compress, so quality matters.
fn noisy_source(width: u32, height: u32) -> SourceImage {
    let mut state: u32 = 0x9e37_79b9;
    let img = RgbaImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [a, b, c, _] = state.to_le_bytes();
        Rgba([a, b, c, 255])
    });
    SourceImage::from_rgba(img).unwrap()
}

fn watermark() -> WatermarkConfig {
    WatermarkConfig::default()
        .with_text("SAMPLE")
        .with_color(Rgb::new(255, 255, 255))
        .with_opacity(0.7)
        .with_rotation(-20)
}

mod encoding_tests {
    use super::*;

    #[test]
    fn test_low_quality_is_smaller() {
        init_logging();
        let source = noisy_source(256, 256);
        let c = compositor();
        let low = export(&c, Some(&source), &watermark(), ExportFormat::Lossy, 0.1).unwrap();
        let high = export(&c, Some(&source), &watermark(), ExportFormat::Lossy, 1.0).unwrap();
        assert!(
            low.data.len() < high.data.len(),
            "q0.1 = {} bytes, q1.0 = {} bytes",
            low.data.len(),
            high.data.len()
        );
        assert_eq!(low.extension(), "jpg");
        assert_eq!((low.width, low.height), (256, 256));
    }

    #[test]
    fn test_lossless_without_watermark_matches_source() {
        let source = noisy_source(97, 61);
        let config = watermark().with_opacity(0.0);
        let out = export(&compositor(), Some(&source), &config, ExportFormat::Lossless, 0.3).unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgba8();
        assert_eq!(&decoded, source.pixels());
    }

    #[test]
    fn test_lossless_matches_render_exactly() {
        let source = noisy_source(120, 80);
        let c = compositor();
        let rendered = c.render(&source, &watermark()).unwrap();
        let out = export(&c, Some(&source), &watermark(), ExportFormat::Lossless, 1.0).unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgba8();
        assert_eq!(&decoded, rendered.as_image());
    }

    #[test]
    fn test_lossless_keeps_transparency() {
        let source = SourceImage::from_rgba(RgbaImage::from_pixel(10, 10, Rgba([5, 6, 7, 40]))).unwrap();
        let out = export(&compositor(), Some(&source), &WatermarkConfig::default().with_text(""), ExportFormat::Lossless, 1.0)
            .unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 3), &Rgba([5, 6, 7, 40]));
    }

    #[test]
    fn test_lossy_output_is_jpeg() {
        let out = export(&compositor(), Some(&noisy_source(16, 16)), &watermark(), ExportFormat::Lossy, 0.5).unwrap();
        assert_eq!(&out.data[..2], &[0xFF, 0xD8]);
        assert_eq!(out.mime_type(), "image/jpeg");
    }
}

mod precondition_tests {
    use super::*;

    #[test]
    fn test_no_image() {
        for format in [ExportFormat::Lossless, ExportFormat::Lossy] {
            let result = export(&compositor(), None, &watermark(), format, 0.9);
            assert!(matches!(result, Err(Error::NoImage)));
        }
    }

    #[test]
    fn test_infinite_quality_rejected_for_lossy() {
        let result = export(&compositor(), Some(&noisy_source(4, 4)), &watermark(), ExportFormat::Lossy, f32::INFINITY);
        assert!(matches!(result, Err(Error::Encode(_))));
    }
}

mod output_tests {
    use super::*;

    #[test]
    fn test_suggested_filenames() {
        let c = compositor();
        let exporter = Exporter::new(&c);
        let source = noisy_source(8, 8);
        let png = exporter.export(Some(&source), &watermark(), &ExportOptions::lossless()).unwrap();
        let jpg = exporter.export(Some(&source), &watermark(), &ExportOptions::lossy(0.9)).unwrap();
        assert_eq!(png.suggested_filename(), "watermarked-image.png");
        assert_eq!(jpg.suggested_filename(), "watermarked-image.jpg");
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempdir().unwrap();
        let source = noisy_source(33, 21);
        let out = export(&compositor(), Some(&source), &watermark(), ExportFormat::Lossless, 1.0).unwrap();

        let path = dir.path().join(out.suggested_filename());
        out.save(&path).unwrap();

        let reopened = SourceImage::open(&path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (33, 21));
        assert_eq!(std::fs::read(&path).unwrap(), out.data);
    }

    #[test]
    fn test_data_uri_reloads() {
        let source = noisy_source(12, 12);
        let out = export(&compositor(), Some(&source), &watermark(), ExportFormat::Lossless, 1.0).unwrap();
        let uri = out.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        let reloaded = SourceImage::from_data_uri(&uri).unwrap();
        assert_eq!(reloaded.pixels(), compositor().render(&source, &watermark()).unwrap().as_image());
    }
}
