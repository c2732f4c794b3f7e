//! Error types for the pdf2svg-bridge library.
//!
//! Two error types reflect the two sides of the bridge:
//!
//! * [`Pdf2SvgError`] — every failure returned from the public API, grouped
//!   as input validation, options serialisation, runtime lifecycle,
//!   conversion/reassembly and output errors.
//!
//! * [`HostError`] — raised by a runtime host or by the conversion
//!   capability itself. It is cheap to clone so one bootstrap failure can be
//!   handed to every caller that was waiting on that bootstrap.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// All errors returned by the pdf2svg-bridge library.
#[derive(Debug, Error)]
pub enum Pdf2SvgError {
    // ── Input validation errors ───────────────────────────────────────────
    /// A requested page number was not a positive integer. `value` is the
    /// entry as written (`0`, `-3`, `1.5`).
    #[error("Page numbers must be positive integers. Received {value} at position {position}.")]
    InvalidPageNumber { value: String, position: usize },

    /// A numeric rendering option was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFiniteOption { field: &'static str },

    /// The font strategy is not one of `auto`, `local`, `opentype`, `woff`.
    #[error("Unsupported font strategy: {value}")]
    UnsupportedFontStrategy { value: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Reading the input file failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Options serialisation errors ──────────────────────────────────────
    /// A pre-serialised options payload could not be parsed.
    #[error("Failed to parse conversion options: {0}")]
    OptionsParse(#[source] serde_json::Error),

    /// The normalised options could not be serialised to the wire format.
    #[error("Failed to serialise conversion options: {0}")]
    OptionsSerialize(#[source] serde_json::Error),

    // ── Runtime lifecycle errors ──────────────────────────────────────────
    /// The runtime environment failed to start.
    #[error("Failed to start the conversion runtime: {0}")]
    Bootstrap(#[source] HostError),

    /// The runtime started but does not expose the conversion export.
    #[error("Conversion runtime started but export '{export}' is unavailable")]
    RuntimeUnavailable { export: String },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The conversion capability raised an error.
    #[error("Conversion failed: {0}")]
    ConversionFailed(#[source] HostError),

    /// The capability returned a different number of pages than requested.
    #[error(
        "Mismatch between requested page indices and generated SVG results: \
         requested {requested}, received {returned}"
    )]
    ResultMismatch { requested: usize, returned: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output SVG file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2SvgError {
    /// `true` for errors raised before the runtime is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Pdf2SvgError::InvalidPageNumber { .. }
                | Pdf2SvgError::NonFiniteOption { .. }
                | Pdf2SvgError::UnsupportedFontStrategy { .. }
                | Pdf2SvgError::OptionsParse(_)
                | Pdf2SvgError::InvalidConfig(_)
        )
    }

    /// `true` for lifecycle failures; a later call retries the bootstrap.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Pdf2SvgError::Bootstrap(_) | Pdf2SvgError::RuntimeUnavailable { .. }
        )
    }
}

/// An error raised on the far side of the bridge: by a [`crate::RuntimeHost`]
/// while creating an environment, or by the conversion capability.
#[derive(Clone, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HostError {
    /// An error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// An error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostError")
            .field("message", &self.message)
            .field("source", &self.source.as_ref().map(|s| s.to_string()))
            .finish()
    }
}
