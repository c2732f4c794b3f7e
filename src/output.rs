//! Conversion output types.

use serde::{Deserialize, Serialize};

/// SVG markup for one converted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgPage {
    /// Zero-based page index in the document.
    pub page_index: usize,
    /// One-based page number (`page_index + 1`).
    pub page_number: usize,
    /// The page as a standalone `<svg>…</svg>` document.
    pub svg: String,
}

impl SvgPage {
    pub fn new(page_index: usize, svg: String) -> Self {
        Self {
            page_index,
            page_number: page_index + 1,
            svg,
        }
    }
}

/// Result of converting a document: one entry per requested page, in
/// request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub pages: Vec<SvgPage>,
}

impl ConversionOutput {
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total bytes of SVG markup across all pages.
    pub fn total_svg_bytes(&self) -> usize {
        self.pages.iter().map(|p| p.svg.len()).sum()
    }
}
