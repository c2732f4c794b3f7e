//! # pdf2svg-bridge
//!
//! Convert PDF documents to per-page SVG through an embedded conversion
//! runtime.
//!
//! ## Why this crate?
//!
//! The actual PDF rendering lives in a separately packaged runtime bundle
//! that exposes a single conversion export. Talking to it directly means
//! dealing with its wire conventions (camelCase JSON, zero-based page
//! indices, a flat list of SVG strings) and with its lifecycle (slow to
//! start, must be started once, must be torn down cleanly). This crate is the
//! thin layer in between: it validates options up front, starts the runtime
//! lazily and exactly once, and hands back page-numbered SVG.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    bytes in memory or a local file
//!  ├─ 2. Options  validate + normalise to wire JSON (pages → zero-based)
//!  ├─ 3. Runtime  locate bundle, start once, resolve the export
//!  ├─ 4. Convert  call the export (blocking, spawn_blocking)
//!  └─ 5. Output   reassemble fragments into page-numbered SvgPage entries
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2svg_bridge::{BridgeConfig, Pdf2Svg, RuntimeHost, SvgOptions};
//!
//! async fn run(host: impl RuntimeHost + 'static) -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = Pdf2Svg::new(host, BridgeConfig::default());
//!
//!     let options = SvgOptions::builder()
//!         .pages([1, 3])
//!         .font_strategy("woff")
//!         .build()?;
//!     let output = bridge.convert(std::path::Path::new("document.pdf"), Some(&options)).await?;
//!     for page in &output.pages {
//!         println!("page {}: {} bytes", page.page_number, page.svg.len());
//!     }
//!
//!     bridge.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Runtime hosts
//!
//! The bridge does not execute the bundle itself. A [`RuntimeHost`] does:
//! given the located bundle it creates a [`RuntimeEnvironment`], from which
//! the bridge resolves the [`ConvertExport`] by name
//! ([`DEFAULT_EXPORT_NAME`] unless configured otherwise).
//!
//! The bundle is found via `svg-runtime-locate`: an explicit
//! [`BridgeConfig::runtime_dir`], then `PDF2SVG_RUNTIME_DIR`, then a
//! `runtime/` directory next to the executable, then the per-user data
//! directory.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod runtime;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    BridgeConfig, BridgeConfigBuilder, FontStrategy, SvgOptions, SvgOptionsBuilder,
    DEFAULT_EXPORT_NAME,
};
pub use convert::Pdf2Svg;
pub use error::{HostError, Pdf2SvgError};
pub use output::{ConversionOutput, SvgPage};
pub use pipeline::input::PdfSource;
pub use pipeline::options::{NormalizedRequest, WireOptions};
pub use pipeline::pages::PageSelection;
pub use runtime::{ConvertExport, RuntimeEnvironment, RuntimeHost, RuntimeState};
pub use svg_runtime_locate::RuntimeLocation;
