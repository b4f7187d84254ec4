//! Document chunking.
//!
//! [`FixedSizeChunker`] slides a window of `chunk_size` characters over the
//! text, advancing by `chunk_size - chunk_overlap` each step. Offsets are
//! counted in Unicode scalar values, so a window never splits a code point,
//! but it will happily split a word or a sentence.

use crate::config::RagConfig;
use crate::error::{RagError, Result};

/// A strategy for splitting document text into chunk texts.
pub trait Chunker: Send + Sync {
    /// Split `text` into chunks. Returns an empty `Vec` for empty text.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Splits text into fixed-size character windows with configurable overlap.
///
/// Windows are emitted until one reaches the end of the text, so the chunks
/// cover the text without gaps, consecutive chunks share exactly
/// `chunk_overlap` characters, and only the last chunk may be shorter than
/// `chunk_size`.
///
/// A slide that keeps going `while start < len` would also emit trailing
/// windows lying wholly inside their predecessor (`"g"` after `"defg"` below,
/// or a 200-character tail after a 1000-character text). Those are never
/// produced here, so ordinals differ from indexes chunked that way; such
/// indexes must be rebuilt rather than reused.
///
/// # Example
///
/// ```rust
/// use docrag::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(4, 1).unwrap();
/// assert_eq!(chunker.split("abcdefg"), vec!["abcd", "defg"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Chunking`] unless `0 <= chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap >= chunk_size {
            return Err(RagError::Chunking(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Create a chunker from validated pipeline configuration.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Window length in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive windows.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self {
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
            chunk_overlap: crate::config::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, including the end of the text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let char_len = boundaries.len() - 1;
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::with_capacity(char_len.div_ceil(step));
        let mut start = 0;
        while start < char_len {
            let end = (start + self.chunk_size).min(char_len);
            chunks.push(text[boundaries[start]..boundaries[end]].to_string());
            if end == char_len {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Split `text` with a one-off [`FixedSizeChunker`].
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<String>> {
    Ok(FixedSizeChunker::new(chunk_size, chunk_overlap)?.split(text))
}
