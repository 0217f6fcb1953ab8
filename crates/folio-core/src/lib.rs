//! Core of the folio reader: an in-memory PDF library with per-page notes,
//! highlights and bookmarks, a reading session on top of it, and the
//! collaborators that parse documents and synthesize speech.

pub mod book;
pub mod config;
pub mod error;
pub mod library;
pub mod reader;
pub mod session;
pub mod speech;
pub mod store;
pub mod text_utils;

#[cfg(test)]
mod testing;

pub use book::{Book, Download};
pub use error::{BookError, BookResult};
pub use library::{Document, DocumentLibrary, PdfLibrary};
pub use reader::{CommandOutcome, Reader, ReaderSnapshot, SessionCommand, SessionEvent};
pub use session::ReaderSession;
pub use speech::{GoogleTranslateTts, SpeechSpeed, SpeechSynthesizer};
pub use store::{BookStore, CategoryGroup, UploadOutcome};
