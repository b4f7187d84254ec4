//! Source discovery and text extraction.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{RagError, Result};

/// Extracts page texts from a document on disk.
pub trait TextExtractor: Send + Sync {
    /// Return the document's text, one entry per page (or a single entry when
    /// the backend does not expose pages).
    fn extract(&self, path: &Path) -> Result<Vec<String>>;
}

/// [`TextExtractor`] for PDF files, backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let failure = |message: String| RagError::Extraction { path: path.to_path_buf(), message };

        let bytes = fs::read(path).map_err(|e| failure(e.to_string()))?;
        // pdf-extract panics on some malformed files instead of returning an error.
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&bytes)));
        match outcome {
            Ok(Ok(text)) => {
                debug!(path = %path.display(), text_len = text.len(), "extracted pdf text");
                Ok(vec![text])
            }
            Ok(Err(e)) => Err(failure(e.to_string())),
            Err(_) => Err(failure("pdf parser panicked".to_string())),
        }
    }
}

/// Find every `.pdf` file (any letter case) under `root`, sorted by path.
///
/// Unreadable directory entries are logged and skipped.
pub fn discover_pdfs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RagError::NoDocuments(format!("{} is not a directory", root.display())));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_pdf(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
