//! Call transcript input.
//!
//! The text is opaque to the engine; the only checks are non-emptiness and
//! the configured size ceiling.

use std::path::Path;

use thiserror::Error;

/// Errors raised while accepting a transcript.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("no transcript provided")]
    Empty,

    #[error("transcript is {size} bytes; the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("failed to read transcript: {0}")]
    Read(#[from] std::io::Error),
}

/// A non-empty call transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(String);

impl Transcript {
    /// Accept `text` if it is non-blank and at most `limit` bytes.
    pub fn new(text: impl Into<String>, limit: usize) -> Result<Self, TranscriptError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(TranscriptError::Empty);
        }
        if text.len() > limit {
            return Err(TranscriptError::TooLarge {
                size: text.len(),
                limit,
            });
        }
        Ok(Self(text))
    }

    /// Read a UTF-8 transcript file.
    ///
    /// The size is checked from metadata before the file is read.
    pub fn from_file(path: &Path, limit: usize) -> Result<Self, TranscriptError> {
        let size = std::fs::metadata(path)?.len();
        if size > limit as u64 {
            return Err(TranscriptError::TooLarge {
                size: usize::try_from(size).unwrap_or(usize::MAX),
                limit,
            });
        }
        Self::new(std::fs::read_to_string(path)?, limit)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed transcript.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
