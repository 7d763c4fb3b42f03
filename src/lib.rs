// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Watermark Oxide
//!
//! Text watermark compositing for raster images, in pure Rust.
//!
//! ## Core Features
//!
//! - **Compositor**: deterministic `(image, config) -> surface` rendering,
//!   shared by live preview and export, built on `tiny-skia` with text shaped
//!   by `rustybuzz`
//! - **Position Mapper**: pointer coordinates over a (zoomed) preview mapped
//!   to clamped percentage anchors, with an explicit drag state machine and
//!   quick-position presets
//! - **Export Encoder**: PNG (lossless) or JPEG (quality 0-1) at the source's
//!   native resolution
//! - **Observable Store**: one configuration plus image with change listeners
//!
//! ## Quick Start
//!
//! ```ignore
//! use watermark_oxide::config::WatermarkPatch;
//! use watermark_oxide::export::ExportOptions;
//! use watermark_oxide::rendering::Compositor;
//! use watermark_oxide::store::WatermarkStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let compositor = Compositor::with_system_fonts();
//! let mut store = WatermarkStore::new();
//! store.load_bytes(&std::fs::read("photo.jpg")?)?;
//! store.set(&WatermarkPatch::text("© 2024"));
//!
//! let out = store.export(&compositor, &ExportOptions::lossy(0.8))?;
//! out.save(out.suggested_filename())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! config + image ──► Compositor ──► RenderedSurface ──► Export Encoder ──► bytes
//!       ▲                                 │
//!       └── Position Mapper ◄── pointer ──┘ (preview)
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Watermark configuration and clamping
pub mod config;

// Image ingestion
pub mod source;

// Compositing
pub mod rendering;

// Pointer mapping, presets and preview zoom
pub mod position;

// Encoding
pub mod export;

// Observable state
pub mod store;

// Re-exports
pub use config::{Rgb, WatermarkConfig, WatermarkPatch};
pub use error::{Error, Result};
pub use export::{export, ExportFormat, ExportOptions, ExportedImage};
pub use rendering::{Compositor, RenderedSurface};
pub use source::SourceImage;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
