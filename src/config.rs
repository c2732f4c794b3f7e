//! Configuration types for PDF-to-SVG conversion.
//!
//! Two structs carry every knob:
//!
//! * [`BridgeConfig`] — per-bridge settings: where the runtime bundle lives
//!   and which export to bind. Fixed for the lifetime of a [`crate::Pdf2Svg`].
//! * [`SvgOptions`] — per-call rendering options. Every field is an
//!   `Option`: `None` means "let the runtime apply its own default" and the
//!   field is left out of the wire payload entirely.

use crate::error::Pdf2SvgError;
use crate::pipeline::options;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Export bound after the runtime starts, unless overridden.
pub const DEFAULT_EXPORT_NAME: &str = "PdfToSvgWasm.PdfToSvgExports.ConvertPdfToSvg";

/// Settings for a [`crate::Pdf2Svg`] bridge.
///
/// # Example
/// ```rust
/// use pdf2svg_bridge::BridgeConfig;
///
/// let config = BridgeConfig::builder()
///     .runtime_dir("/opt/pdf2svg/runtime")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Explicit runtime bundle root. When `None` the bundle is searched for
    /// in the default locations (see [`svg_runtime_locate::locate_runtime`]).
    pub runtime_dir: Option<PathBuf>,

    /// Fully qualified name of the conversion export. Default:
    /// [`DEFAULT_EXPORT_NAME`].
    pub export_name: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            runtime_dir: None,
            export_name: DEFAULT_EXPORT_NAME.to_string(),
        }
    }
}

impl BridgeConfig {
    /// Create a new builder for `BridgeConfig`.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Debug)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.runtime_dir = Some(dir.into());
        self
    }

    pub fn export_name(mut self, name: impl Into<String>) -> Self {
        self.config.export_name = name.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BridgeConfig, Pdf2SvgError> {
        if self.config.export_name.trim().is_empty() {
            return Err(Pdf2SvgError::InvalidConfig(
                "export name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Per-call options ─────────────────────────────────────────────────────

/// Rendering options for a single conversion.
///
/// Field names serialise in camelCase, so a JSON payload such as
/// `{"fontStrategy":"woff","pages":[1,3]}` maps directly onto this struct
/// (see [`SvgOptions::from_json`]). Unknown keys are ignored.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SvgOptions {
    /// Password for encrypted documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Render annotations. Runtime default: `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_annotations: Option<bool>,

    /// Render text the document marks as hidden. Runtime default: `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_hidden_text: Option<bool>,

    /// Emit hyperlinks. Runtime default: `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_links: Option<bool>,

    /// Whitespace collapse threshold for embedded fonts, in em units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_space_embedded_font: Option<f64>,

    /// Whitespace collapse threshold for substituted local fonts, in em units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_space_local_font: Option<f64>,

    /// Strokes thinner than this are widened, in user-space units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stroke_width: Option<f64>,

    /// Font strategy name: `auto`, `local`, `opentype` or `woff`.
    ///
    /// Kept as a string so unrecognised names coming from loosely typed
    /// callers are reported as [`Pdf2SvgError::UnsupportedFontStrategy`]
    /// rather than as a parse failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_strategy: Option<String>,

    /// One-based page numbers to convert, in output order. Duplicates and
    /// reorderings are honoured. `None` or empty converts every page.
    ///
    /// Held as JSON numbers so a pre-serialised payload such as `[1, 1.5]`
    /// reaches page validation intact; `2.0` counts as page 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<serde_json::Number>>,
}

impl fmt::Debug for SvgOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvgOptions")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("include_annotations", &self.include_annotations)
            .field("include_hidden_text", &self.include_hidden_text)
            .field("include_links", &self.include_links)
            .field(
                "collapse_space_embedded_font",
                &self.collapse_space_embedded_font,
            )
            .field("collapse_space_local_font", &self.collapse_space_local_font)
            .field("min_stroke_width", &self.min_stroke_width)
            .field("font_strategy", &self.font_strategy)
            .field("pages", &self.pages)
            .finish()
    }
}

impl SvgOptions {
    /// Create a new builder for `SvgOptions`.
    pub fn builder() -> SvgOptionsBuilder {
        SvgOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Parse a pre-serialised options payload.
    ///
    /// This is the alternate entry point for callers that already hold the
    /// options as JSON. It only deserialises; validation happens in the same
    /// normaliser the structured path uses, when the options are converted.
    pub fn from_json(json: &str) -> Result<Self, Pdf2SvgError> {
        serde_json::from_str(json).map_err(Pdf2SvgError::OptionsParse)
    }
}

/// Builder for [`SvgOptions`].
#[derive(Debug)]
pub struct SvgOptionsBuilder {
    options: SvgOptions,
}

impl SvgOptionsBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.options.password = Some(pwd.into());
        self
    }

    pub fn include_annotations(mut self, v: bool) -> Self {
        self.options.include_annotations = Some(v);
        self
    }

    pub fn include_hidden_text(mut self, v: bool) -> Self {
        self.options.include_hidden_text = Some(v);
        self
    }

    pub fn include_links(mut self, v: bool) -> Self {
        self.options.include_links = Some(v);
        self
    }

    pub fn collapse_space_embedded_font(mut self, v: f64) -> Self {
        self.options.collapse_space_embedded_font = Some(v);
        self
    }

    pub fn collapse_space_local_font(mut self, v: f64) -> Self {
        self.options.collapse_space_local_font = Some(v);
        self
    }

    pub fn min_stroke_width(mut self, v: f64) -> Self {
        self.options.min_stroke_width = Some(v);
        self
    }

    pub fn font_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.options.font_strategy = Some(strategy.into());
        self
    }

    pub fn pages(mut self, pages: impl IntoIterator<Item = i64>) -> Self {
        self.options.pages = Some(pages.into_iter().map(serde_json::Number::from).collect());
        self
    }

    /// Build the options, running the same validation a conversion would.
    pub fn build(self) -> Result<SvgOptions, Pdf2SvgError> {
        options::normalize(Some(&self.options))?;
        Ok(self.options)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the runtime should handle fonts in the generated SVG.
///
/// | Strategy | Effect |
/// |----------|--------|
/// | `Auto` | Let the runtime choose (nothing is sent) |
/// | `Local` | Reference locally installed fonts by family name |
/// | `OpenType` | Embed fonts as OpenType data URLs |
/// | `Woff` | Embed fonts as WOFF data URLs |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStrategy {
    #[default]
    Auto,
    Local,
    OpenType,
    Woff,
}

impl FontStrategy {
    /// Canonical lowercase name, as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            FontStrategy::Auto => "auto",
            FontStrategy::Local => "local",
            FontStrategy::OpenType => "opentype",
            FontStrategy::Woff => "woff",
        }
    }
}

impl fmt::Display for FontStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontStrategy {
    type Err = Pdf2SvgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(FontStrategy::Auto),
            "local" => Ok(FontStrategy::Local),
            "opentype" => Ok(FontStrategy::OpenType),
            "woff" => Ok(FontStrategy::Woff),
            _ => Err(Pdf2SvgError::UnsupportedFontStrategy {
                value: s.to_string(),
            }),
        }
    }
}

impl From<FontStrategy> for String {
    fn from(strategy: FontStrategy) -> Self {
        strategy.as_str().to_string()
    }
}
