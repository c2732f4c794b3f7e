//! Input resolution: turn a caller-supplied source into owned PDF bytes.
//!
//! The conversion export only accepts a byte buffer. In-memory sources are
//! passed through without copying; file sources are read asynchronously so
//! a large document does not stall the executor.

use crate::error::Pdf2SvgError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the PDF comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfSource {
    /// Document bytes already in memory.
    Bytes(Vec<u8>),
    /// A local file, read when the conversion starts.
    File(PathBuf),
}

impl From<Vec<u8>> for PdfSource {
    fn from(bytes: Vec<u8>) -> Self {
        PdfSource::Bytes(bytes)
    }
}

impl From<&[u8]> for PdfSource {
    fn from(bytes: &[u8]) -> Self {
        PdfSource::Bytes(bytes.to_vec())
    }
}

impl From<&Vec<u8>> for PdfSource {
    fn from(bytes: &Vec<u8>) -> Self {
        PdfSource::Bytes(bytes.clone())
    }
}

impl<const N: usize> From<&[u8; N]> for PdfSource {
    fn from(bytes: &[u8; N]) -> Self {
        PdfSource::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for PdfSource {
    fn from(path: PathBuf) -> Self {
        PdfSource::File(path)
    }
}

impl From<&Path> for PdfSource {
    fn from(path: &Path) -> Self {
        PdfSource::File(path.to_path_buf())
    }
}

impl PdfSource {
    /// A file source from anything path-like.
    pub fn file(path: impl AsRef<Path>) -> Self {
        PdfSource::File(path.as_ref().to_path_buf())
    }

    /// Resolve the source into the bytes handed to the export.
    pub async fn into_bytes(self) -> Result<Vec<u8>, Pdf2SvgError> {
        match self {
            PdfSource::Bytes(bytes) => Ok(bytes),
            PdfSource::File(path) => read_file(path).await,
        }
    }
}

async fn read_file(path: PathBuf) -> Result<Vec<u8>, Pdf2SvgError> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Pdf2SvgError::FileNotFound { path })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Pdf2SvgError::PermissionDenied { path })
        }
        Err(source) => Err(Pdf2SvgError::ReadFailed { path, source }),
    }
}
