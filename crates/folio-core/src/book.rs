//! One uploaded document and the annotations attached to it.

use crate::error::{BookError, BookResult};
use crate::library::Document;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_BOOKMARK: &str = "Bookmarked";
pub const PDF_MIME: &str = "application/pdf";

/// A book and its per-page annotation state.
///
/// Identity (`id`, `title`, bytes, page count) is fixed at ingestion. Only the
/// category and the three annotation maps change afterwards, and every
/// annotation key is a 1-based page number within `1..=page_count`.
#[derive(Clone)]
pub struct Book {
    id: String,
    title: String,
    raw_bytes: Arc<[u8]>,
    category: String,
    page_count: u32,
    document: Arc<dyn Document>,
    notes: BTreeMap<u32, String>,
    bookmarks: BTreeMap<u32, String>,
    highlights: BTreeMap<u32, Vec<String>>,
}

impl fmt::Debug for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Book")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("page_count", &self.page_count)
            .field("bytes", &self.raw_bytes.len())
            .field("notes", &self.notes.len())
            .field("bookmarks", &self.bookmarks.len())
            .field("highlights", &self.highlights.len())
            .finish()
    }
}

impl Book {
    pub(crate) fn new(id: String, raw_bytes: Arc<[u8]>, document: Arc<dyn Document>) -> Self {
        let page_count = document.page_count();
        Self {
            title: id.clone(),
            id,
            raw_bytes,
            category: DEFAULT_CATEGORY.to_string(),
            page_count,
            document,
            notes: BTreeMap::new(),
            bookmarks: BTreeMap::new(),
            highlights: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn bookmarks(&self) -> &BTreeMap<u32, String> {
        &self.bookmarks
    }

    pub fn note(&self, page: u32) -> Option<&str> {
        self.notes.get(&page).map(String::as_str)
    }

    pub fn highlights_on(&self, page: u32) -> &[String] {
        self.highlights.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_page(&self, page: u32) -> bool {
        (1..=self.page_count).contains(&page)
    }

    pub fn check_page(&self, page: u32) -> BookResult<()> {
        if self.contains_page(page) {
            Ok(())
        } else {
            Err(BookError::Range {
                page,
                page_count: self.page_count,
            })
        }
    }

    /// Plain text of a 1-based page, read through the document library.
    pub fn page_text(&self, page: u32) -> BookResult<String> {
        self.check_page(page)?;
        self.document
            .page_text((page - 1) as usize)
            .map_err(|err| BookError::Extraction {
                page,
                reason: format!("{err:#}"),
            })
    }

    pub fn download(&self) -> Download {
        Download {
            file_name: self.title.clone(),
            mime: PDF_MIME,
            bytes: Arc::clone(&self.raw_bytes),
        }
    }

    /// Returns true when the stored value actually changed.
    pub(crate) fn set_category(&mut self, category: String) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category;
        true
    }

    pub(crate) fn set_note(&mut self, page: u32, text: String) -> BookResult<()> {
        self.check_page(page)?;
        self.notes.insert(page, text);
        Ok(())
    }

    pub(crate) fn set_bookmark(&mut self, page: u32, description: String) -> BookResult<()> {
        self.check_page(page)?;
        self.bookmarks.insert(page, description);
        Ok(())
    }

    pub(crate) fn push_highlight(&mut self, page: u32, snippet: String) -> BookResult<()> {
        self.check_page(page)?;
        self.highlights.entry(page).or_default().push(snippet);
        Ok(())
    }
}

/// The original upload, handed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Arc<[u8]>,
}
