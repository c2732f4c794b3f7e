//! Page index translation between caller-facing one-based page numbers and
//! the zero-based indices the conversion export works with.
//!
//! The export returns a flat list of SVG strings keyed only by position, so
//! reassembly treats the list length as a contract: with an explicit page
//! filter it must match the request exactly or the whole call fails.

use crate::error::Pdf2SvgError;
use crate::output::SvgPage;
use serde_json::Number;
use tracing::debug;

/// Which pages a conversion asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page of the document (no filter is sent).
    #[default]
    All,
    /// Caller-supplied page numbers, in request order, paired with the
    /// derived zero-based indices. Not sorted, not deduplicated.
    Explicit {
        page_numbers: Vec<usize>,
        indices: Vec<usize>,
    },
}

impl PageSelection {
    /// Validate one-based page numbers and derive their indices.
    ///
    /// Entries are JSON numbers so that values coming from a pre-serialised
    /// payload are checked here too: integral floats such as `2.0` are
    /// accepted, fractions are not.
    ///
    /// # Errors
    /// [`Pdf2SvgError::InvalidPageNumber`] for the first entry that is not a
    /// positive integer, with its text and position in `pages`.
    pub fn from_page_numbers(pages: &[Number]) -> Result<Self, Pdf2SvgError> {
        let page_numbers = pages
            .iter()
            .enumerate()
            .map(|(position, value)| {
                positive_integer(value).ok_or_else(|| Pdf2SvgError::InvalidPageNumber {
                    value: value.to_string(),
                    position,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let indices = page_numbers.iter().map(|n| n - 1).collect();
        Ok(PageSelection::Explicit {
            page_numbers,
            indices,
        })
    }

    /// Zero-based indices to send, or `None` for all pages.
    pub fn indices(&self) -> Option<&[usize]> {
        match self {
            PageSelection::All => None,
            PageSelection::Explicit { indices, .. } => Some(indices),
        }
    }

    /// One-based page numbers as requested, or `None` for all pages.
    pub fn page_numbers(&self) -> Option<&[usize]> {
        match self {
            PageSelection::All => None,
            PageSelection::Explicit { page_numbers, .. } => Some(page_numbers),
        }
    }

    /// Number of pages requested, or `None` for all pages.
    pub fn requested_count(&self) -> Option<usize> {
        self.indices().map(<[usize]>::len)
    }

    /// Map the export's flat result back onto page-numbered entries.
    ///
    /// # Errors
    /// [`Pdf2SvgError::ResultMismatch`] when an explicit selection and the
    /// returned fragment count disagree.
    pub fn reassemble(&self, fragments: Vec<String>) -> Result<Vec<SvgPage>, Pdf2SvgError> {
        match self {
            PageSelection::All => Ok(fragments
                .into_iter()
                .enumerate()
                .map(|(page_index, svg)| SvgPage::new(page_index, svg))
                .collect()),
            PageSelection::Explicit { indices, .. } => {
                if indices.len() != fragments.len() {
                    return Err(Pdf2SvgError::ResultMismatch {
                        requested: indices.len(),
                        returned: fragments.len(),
                    });
                }
                debug!("Reassembling {} requested pages", indices.len());
                Ok(indices
                    .iter()
                    .zip(fragments)
                    .map(|(&page_index, svg)| SvgPage::new(page_index, svg))
                    .collect())
            }
        }
    }
}

fn positive_integer(value: &Number) -> Option<usize> {
    let n = match value.as_u64() {
        Some(n) => usize::try_from(n).ok()?,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || f < 1.0 || f > usize::MAX as f64 {
                return None;
            }
            f as usize
        }
    };
    (n >= 1).then_some(n)
}
