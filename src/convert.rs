//! Conversion entry points.
//!
//! [`Pdf2Svg`] is the caller-facing handle. It owns the runtime lifecycle
//! (through an internal manager) and composes the pipeline stages:
//!
//! ```text
//! source ─▶ bytes ─┬─ empty? ─▶ empty output (runtime untouched)
//!                  ▼
//!          normalise options ─▶ ensure runtime ready ─▶ export.convert()
//!                                                           │
//!                    ConversionOutput ◀─ reassemble pages ◀─┘
//! ```
//!
//! The handle is cheap to clone; clones share the same runtime.

use crate::config::{BridgeConfig, SvgOptions};
use crate::error::Pdf2SvgError;
use crate::output::ConversionOutput;
use crate::pipeline::input::PdfSource;
use crate::pipeline::options;
use crate::runtime::{RuntimeHost, RuntimeManager, RuntimeState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Bridge between callers and a PDF-to-SVG runtime.
///
/// # Example
/// ```rust,no_run
/// # use pdf2svg_bridge::{Pdf2Svg, BridgeConfig, SvgOptions, RuntimeHost};
/// # async fn demo(host: impl RuntimeHost + 'static) -> Result<(), pdf2svg_bridge::Pdf2SvgError> {
/// let bridge = Pdf2Svg::new(host, BridgeConfig::default());
/// bridge.initialize().await?;
///
/// let options = SvgOptions::builder().pages([1]).font_strategy("woff").build()?;
/// let output = bridge
///     .convert(std::path::Path::new("document.pdf"), Some(&options))
///     .await?;
/// println!("{}", output.pages[0].svg);
///
/// bridge.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Pdf2Svg {
    runtime: Arc<RuntimeManager>,
}

impl Pdf2Svg {
    /// Create a bridge over `host`. Nothing is started until the first
    /// [`initialize`](Self::initialize) or conversion.
    pub fn new(host: impl RuntimeHost + 'static, config: BridgeConfig) -> Self {
        Self::with_host(Arc::new(host), config)
    }

    /// Like [`Pdf2Svg::new`] for an already shared host.
    pub fn with_host(host: Arc<dyn RuntimeHost>, config: BridgeConfig) -> Self {
        Self {
            runtime: Arc::new(RuntimeManager::new(host, &config)),
        }
    }

    /// Start the runtime ahead of the first conversion. Idempotent; concurrent
    /// calls share one bootstrap.
    pub async fn initialize(&self) -> Result<(), Pdf2SvgError> {
        self.runtime.ensure_ready().await.map(drop)
    }

    /// Release the runtime. Idempotent; a later conversion starts it again.
    pub async fn shutdown(&self) {
        self.runtime.teardown().await;
    }

    /// Current lifecycle state of the runtime.
    pub async fn state(&self) -> RuntimeState {
        self.runtime.state().await
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await == RuntimeState::Ready
    }

    /// Number of runtime bootstrap attempts made by this bridge.
    pub fn bootstrap_count(&self) -> u64 {
        self.runtime.bootstrap_count()
    }

    /// Convert a PDF to SVG, one entry per requested page.
    ///
    /// # Arguments
    /// * `source` — PDF bytes or a file path
    /// * `options` — rendering options; `None` converts every page with the
    ///   runtime's defaults
    ///
    /// # Errors
    /// - Validation errors before the runtime is touched (page numbers,
    ///   numeric options, font strategy, unreadable file)
    /// - [`Pdf2SvgError::Bootstrap`] / [`Pdf2SvgError::RuntimeUnavailable`]
    ///   when the runtime cannot be started
    /// - [`Pdf2SvgError::ConversionFailed`] when the export raises
    /// - [`Pdf2SvgError::ResultMismatch`] when the export returns a different
    ///   number of pages than requested
    pub async fn convert(
        &self,
        source: impl Into<PdfSource>,
        options: Option<&SvgOptions>,
    ) -> Result<ConversionOutput, Pdf2SvgError> {
        let start = Instant::now();

        // ── Step 1: Resolve input ────────────────────────────────────────
        let bytes = source.into().into_bytes().await?;
        if bytes.is_empty() {
            debug!("Empty input; skipping conversion");
            return Ok(ConversionOutput::default());
        }

        // ── Step 2: Normalise options ────────────────────────────────────
        let request = options::normalize(options)?;
        let options_json = request.wire_json()?;
        debug!(
            "Normalised options: {:?}, pages: {:?}",
            request.wire,
            request.selection.page_numbers()
        );

        // ── Step 3: Ensure runtime ───────────────────────────────────────
        let context = self.runtime.ensure_ready().await?;

        // ── Step 4: Invoke the export ────────────────────────────────────
        // One call at a time; the turn travels with the blocking task.
        let turn = context.export_turn().await;
        let input_len = bytes.len();
        let fragments = tokio::task::spawn_blocking(move || {
            turn.convert(&bytes, options_json.as_deref())
        })
        .await
        .map_err(|e| Pdf2SvgError::Internal(format!("Conversion task panicked: {e}")))?
        .map_err(Pdf2SvgError::ConversionFailed)?;
        drop(context);

        // ── Step 5: Reassemble ───────────────────────────────────────────
        let pages = request.selection.reassemble(fragments)?;
        let output = ConversionOutput { pages };

        info!(
            "Converted {} bytes into {} SVG pages ({} bytes) in {}ms",
            input_len,
            output.len(),
            output.total_svg_bytes(),
            start.elapsed().as_millis()
        );
        Ok(output)
    }

    /// Convert with options supplied as a JSON payload.
    ///
    /// The payload is parsed into [`SvgOptions`] and then validated exactly
    /// like the structured path. A blank payload means "no options".
    pub async fn convert_with_json_options(
        &self,
        source: impl Into<PdfSource>,
        options_json: &str,
    ) -> Result<ConversionOutput, Pdf2SvgError> {
        if options_json.trim().is_empty() {
            return self.convert(source, None).await;
        }
        let options = SvgOptions::from_json(options_json)?;
        self.convert(source, Some(&options)).await
    }

    /// Convert a PDF and write each page to `<dir>/<stem>_page<N>.svg`.
    ///
    /// Each file is written atomically (temp file + rename). Returns the
    /// written paths in page order.
    pub async fn convert_to_dir(
        &self,
        source: impl Into<PdfSource>,
        options: Option<&SvgOptions>,
        dir: impl AsRef<Path>,
        stem: &str,
    ) -> Result<Vec<PathBuf>, Pdf2SvgError> {
        let output = self.convert(source, options).await?;
        let dir = dir.as_ref();

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Pdf2SvgError::OutputWriteFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let mut written = Vec::with_capacity(output.len());
        for page in &output.pages {
            let path = dir.join(format!("{stem}_page{}.svg", page.page_number));
            write_atomic(&path, &page.svg).await?;
            written.push(path);
        }
        info!("Wrote {} SVG files to {}", written.len(), dir.display());
        Ok(written)
    }
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), Pdf2SvgError> {
    let tmp_path = path.with_extension("svg.tmp");
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| Pdf2SvgError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Pdf2SvgError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
