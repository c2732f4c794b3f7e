//! Options normaliser: lower caller [`SvgOptions`] into the strict wire
//! payload the conversion export understands.
//!
//! The wire payload only ever contains fields the caller set. Anything left
//! as `None` is omitted from the JSON (never sent as `null`), so the runtime
//! applies its own defaults. When nothing survives, no payload is sent at all.

use crate::config::{FontStrategy, SvgOptions};
use crate::error::Pdf2SvgError;
use crate::pipeline::pages::PageSelection;
use serde::Serialize;
use std::fmt;

/// Options in the exact shape the conversion export deserialises.
///
/// `pages` holds zero-based indices.
#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_annotations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_hidden_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_space_embedded_font: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_space_local_font: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_strategy: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<usize>>,
}

impl WireOptions {
    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == WireOptions::default()
    }

    /// Serialise to the JSON string handed to the export.
    pub fn to_json(&self) -> Result<String, Pdf2SvgError> {
        serde_json::to_string(self).map_err(Pdf2SvgError::OptionsSerialize)
    }
}

impl fmt::Debug for WireOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireOptions")
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

/// The outcome of normalisation: what to send, and which pages were asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    /// `None` means "send no options".
    pub wire: Option<WireOptions>,
    pub selection: PageSelection,
}

impl NormalizedRequest {
    /// The serialised payload, or `None` when there is nothing to send.
    pub fn wire_json(&self) -> Result<Option<String>, Pdf2SvgError> {
        self.wire.as_ref().map(WireOptions::to_json).transpose()
    }
}

/// Validate and lower caller options.
///
/// # Errors
/// - [`Pdf2SvgError::NonFiniteOption`] for a NaN/infinite numeric option
/// - [`Pdf2SvgError::UnsupportedFontStrategy`] for an unknown strategy name
/// - [`Pdf2SvgError::InvalidPageNumber`] for a page number below 1
pub fn normalize(options: Option<&SvgOptions>) -> Result<NormalizedRequest, Pdf2SvgError> {
    let Some(options) = options else {
        return Ok(NormalizedRequest {
            wire: None,
            selection: PageSelection::All,
        });
    };

    let mut wire = WireOptions {
        password: options.password.clone(),
        include_annotations: options.include_annotations,
        include_hidden_text: options.include_hidden_text,
        include_links: options.include_links,
        collapse_space_embedded_font: finite(
            "collapseSpaceEmbeddedFont",
            options.collapse_space_embedded_font,
        )?,
        collapse_space_local_font: finite(
            "collapseSpaceLocalFont",
            options.collapse_space_local_font,
        )?,
        min_stroke_width: finite("minStrokeWidth", options.min_stroke_width)?,
        font_strategy: font_strategy(options.font_strategy.as_deref())?,
        pages: None,
    };

    let selection = match options.pages.as_deref() {
        Some(pages) if !pages.is_empty() => PageSelection::from_page_numbers(pages)?,
        _ => PageSelection::All,
    };
    wire.pages = selection.indices().map(<[usize]>::to_vec);

    Ok(NormalizedRequest {
        wire: (!wire.is_empty()).then_some(wire),
        selection,
    })
}

fn finite(field: &'static str, value: Option<f64>) -> Result<Option<f64>, Pdf2SvgError> {
    match value {
        Some(v) if !v.is_finite() => Err(Pdf2SvgError::NonFiniteOption { field }),
        other => Ok(other),
    }
}

/// `auto` and absent both mean "send nothing".
fn font_strategy(value: Option<&str>) -> Result<Option<&'static str>, Pdf2SvgError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.parse::<FontStrategy>()? {
        FontStrategy::Auto => Ok(None),
        strategy => Ok(Some(strategy.as_str())),
    }
}
