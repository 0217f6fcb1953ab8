//! Document access.
//!
//! The reader never parses PDFs itself. It asks a [`DocumentLibrary`] to open
//! uploaded bytes and then pulls plain text one page at a time. [`PdfLibrary`]
//! is the production implementation on top of `lopdf`.

use anyhow::{Context, Result, anyhow};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// An opened document. Page indices are 0-based here; the session exposes
/// 1-based page numbers.
pub trait Document: fmt::Debug {
    fn page_count(&self) -> u32;

    fn page_text(&self, index: usize) -> Result<String>;
}

pub trait DocumentLibrary {
    fn open(&self, bytes: &[u8]) -> Result<Arc<dyn Document>>;
}

/// Opens PDFs with `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLibrary;

impl PdfLibrary {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLibrary for PdfLibrary {
    fn open(&self, bytes: &[u8]) -> Result<Arc<dyn Document>> {
        let inner = lopdf::Document::load_mem(bytes).context("failed to parse PDF")?;
        // get_pages is keyed by 1-based page number, already in order.
        let page_numbers: Vec<u32> = inner.get_pages().keys().copied().collect();
        debug!(
            bytes = bytes.len(),
            pages = page_numbers.len(),
            "Opened PDF"
        );
        Ok(Arc::new(PdfDocument {
            inner,
            page_numbers,
        }))
    }
}

pub struct PdfDocument {
    inner: lopdf::Document,
    page_numbers: Vec<u32>,
}

impl fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_numbers.len())
            .finish_non_exhaustive()
    }
}

impl Document for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_numbers.len() as u32
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let number = self.page_numbers.get(index).copied().ok_or_else(|| {
            anyhow!(
                "page index {index} out of range (0..{})",
                self.page_numbers.len()
            )
        })?;
        self.inner
            .extract_text(&[number])
            .with_context(|| format!("failed to extract text from page {number}"))
    }
}
