//! Error kinds surfaced to the shell after a failed action.
//!
//! Every variant is recoverable: the store and session are left untouched
//! when an operation returns one of these.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// The uploaded bytes could not be opened as a document.
    #[error("Error opening {id}: {reason}")]
    Parse { id: String, reason: String },

    #[error("No book named {id}")]
    NotFound { id: String },

    /// `page_count` is 0 when no book is selected.
    #[error("Page {page} is out of range (book has {page_count} pages)")]
    Range { page: u32, page_count: u32 },

    #[error("Error reading page {page}: {reason}")]
    Extraction { page: u32, reason: String },

    #[error("{0}")]
    Validation(String),

    #[error("Error in TTS: {0}")]
    Tts(String),

    #[error("No book selected")]
    NoSelection,
}

impl BookError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookError::Validation(message.into())
    }

    /// Short machine-friendly label, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            BookError::Parse { .. } => "parse",
            BookError::NotFound { .. } => "not_found",
            BookError::Range { .. } => "range",
            BookError::Extraction { .. } => "extraction",
            BookError::Validation(_) => "validation",
            BookError::Tts(_) => "tts",
            BookError::NoSelection => "no_selection",
        }
    }
}

pub type BookResult<T> = Result<T, BookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let err = BookError::Range {
            page: 9,
            page_count: 3,
        };
        assert_eq!(err.to_string(), "Page 9 is out of range (book has 3 pages)");
        assert_eq!(err.kind(), "range");

        let err = BookError::validation("Note is empty.");
        assert_eq!(err.to_string(), "Note is empty.");
    }
}
