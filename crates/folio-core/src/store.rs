//! In-memory book store.
//!
//! Books are kept in upload order; that order drives the category listing.
//! There is no removal, so indices stay valid for the life of the store.

use crate::book::{Book, Download};
use crate::error::{BookError, BookResult};
use crate::library::DocumentLibrary;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub book_ids: Vec<String>,
}

/// Result of ingesting a single file in a batch upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Added { id: String, page_count: u32 },
    AlreadyPresent { id: String },
    Failed(BookError),
}

#[derive(Debug, Default)]
pub struct BookStore {
    books: Vec<Book>,
    index: HashMap<String, usize>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.index.get(id).map(|&idx| &self.books[idx])
    }

    pub fn book(&self, id: &str) -> BookResult<&Book> {
        self.get(id).ok_or_else(|| BookError::NotFound { id: id.to_string() })
    }

    pub(crate) fn book_mut(&mut self, id: &str) -> BookResult<&mut Book> {
        match self.index.get(id) {
            Some(&idx) => Ok(&mut self.books[idx]),
            None => Err(BookError::NotFound { id: id.to_string() }),
        }
    }

    /// Ingest an upload under `id`.
    ///
    /// The first upload of an id wins: a repeated id returns the stored book
    /// without opening the new bytes. A document that cannot be opened, or
    /// that has no pages, is rejected with [`BookError::Parse`]. A zero-page
    /// document would be a valid book on its own, but it could never be
    /// selected (the session always starts at page 1), so it is refused here.
    pub fn add_book(
        &mut self,
        library: &dyn DocumentLibrary,
        id: &str,
        raw_bytes: Vec<u8>,
    ) -> BookResult<&Book> {
        if let Some(&idx) = self.index.get(id) {
            debug!(id, "Book already uploaded; keeping first version");
            return Ok(&self.books[idx]);
        }

        let document = library.open(&raw_bytes).map_err(|err| BookError::Parse {
            id: id.to_string(),
            reason: format!("{err:#}"),
        })?;
        if document.page_count() == 0 {
            return Err(BookError::Parse {
                id: id.to_string(),
                reason: "document has no pages".to_string(),
            });
        }

        let book = Book::new(id.to_string(), Arc::from(raw_bytes), document);
        info!(
            id,
            pages = book.page_count(),
            bytes = book.raw_bytes().len(),
            "Added book"
        );
        let idx = self.books.len();
        self.books.push(book);
        self.index.insert(id.to_string(), idx);
        Ok(&self.books[idx])
    }

    /// Ingest several uploads in order. A failure is reported for that file
    /// only; the remaining files are still ingested.
    pub fn upload_many<I>(&mut self, library: &dyn DocumentLibrary, uploads: I) -> Vec<UploadOutcome>
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        uploads
            .into_iter()
            .map(|(id, bytes)| {
                if self.contains(&id) {
                    return UploadOutcome::AlreadyPresent { id };
                }
                match self.add_book(library, &id, bytes) {
                    Ok(book) => UploadOutcome::Added {
                        id,
                        page_count: book.page_count(),
                    },
                    Err(err) => {
                        warn!(id = %id, kind = err.kind(), "Upload rejected: {err}");
                        UploadOutcome::Failed(err)
                    }
                }
            })
            .collect()
    }

    /// Overwrite a book's category (empty strings included). Returns whether
    /// the value changed.
    pub fn set_category(&mut self, id: &str, category: impl Into<String>) -> BookResult<bool> {
        let category = category.into();
        let book = self.book_mut(id)?;
        let changed = book.set_category(category);
        if changed {
            info!(id, category = book.category(), "Updated category");
        }
        Ok(changed)
    }

    /// Books grouped by category. Categories appear in the order their first
    /// book was uploaded, and ids keep upload order within a group.
    pub fn list_by_category(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for book in &self.books {
            match groups
                .iter_mut()
                .find(|group| group.category == book.category())
            {
                Some(group) => group.book_ids.push(book.id().to_string()),
                None => groups.push(CategoryGroup {
                    category: book.category().to_string(),
                    book_ids: vec![book.id().to_string()],
                }),
            }
        }
        groups
    }

    pub fn download(&self, id: &str) -> BookResult<Download> {
        Ok(self.book(id)?.download())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::DEFAULT_CATEGORY;
    use crate::testing::{FakeLibrary, pdf_bytes};

    fn store_with(ids: &[&str]) -> BookStore {
        let mut store = BookStore::new();
        for id in ids {
            store
                .add_book(&FakeLibrary, id, pdf_bytes(&["page one", "page two"]))
                .unwrap();
        }
        store
    }

    #[test]
    fn add_book_is_first_upload_wins() {
        let mut store = BookStore::new();
        store
            .add_book(&FakeLibrary, "a.pdf", pdf_bytes(&["first"]))
            .unwrap();
        let again = store
            .add_book(&FakeLibrary, "a.pdf", pdf_bytes(&["second", "version"]))
            .unwrap();

        assert_eq!(again.page_count(), 1);
        assert_eq!(again.raw_bytes(), pdf_bytes(&["first"]).as_slice());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unreadable_upload_is_a_parse_error_and_not_stored() {
        let mut store = BookStore::new();
        let err = store
            .add_book(&FakeLibrary, "junk.pdf", b"hello".to_vec())
            .unwrap_err();

        assert!(matches!(err, BookError::Parse { ref id, .. } if id == "junk.pdf"));
        assert!(store.is_empty());
        assert!(!store.contains("junk.pdf"));
    }

    #[test]
    fn documents_without_pages_are_rejected() {
        let mut store = BookStore::new();
        let err = store
            .add_book(&FakeLibrary, "empty.pdf", b"%PDF".to_vec())
            .unwrap_err();
        assert_eq!(
            err,
            BookError::Parse {
                id: "empty.pdf".to_string(),
                reason: "document has no pages".to_string(),
            }
        );
    }

    #[test]
    fn upload_many_continues_past_failures() {
        let mut store = store_with(&["b.pdf"]);
        let outcomes = store.upload_many(
            &FakeLibrary,
            vec![
                ("a.pdf".to_string(), pdf_bytes(&["x", "y", "z"])),
                ("bad.pdf".to_string(), b"nope".to_vec()),
                ("b.pdf".to_string(), pdf_bytes(&["ignored"])),
                ("c.pdf".to_string(), pdf_bytes(&["x"])),
            ],
        );

        assert_eq!(
            outcomes[0],
            UploadOutcome::Added {
                id: "a.pdf".to_string(),
                page_count: 3
            }
        );
        assert!(matches!(outcomes[1], UploadOutcome::Failed(BookError::Parse { .. })));
        assert_eq!(
            outcomes[2],
            UploadOutcome::AlreadyPresent {
                id: "b.pdf".to_string()
            }
        );
        assert!(store.contains("c.pdf"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn set_category_overwrites_and_reports_change() {
        let mut store = store_with(&["a.pdf"]);
        assert_eq!(store.set_category("a.pdf", "Fiction"), Ok(true));
        assert_eq!(store.set_category("a.pdf", "Fiction"), Ok(false));
        assert_eq!(store.set_category("a.pdf", ""), Ok(true));
        assert_eq!(store.book("a.pdf").unwrap().category(), "");
        assert_eq!(
            store.set_category("missing.pdf", "x"),
            Err(BookError::NotFound {
                id: "missing.pdf".to_string()
            })
        );
    }

    #[test]
    fn list_by_category_follows_upload_order() {
        let mut store = store_with(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
        store.set_category("b.pdf", "Science").unwrap();
        store.set_category("d.pdf", "Science").unwrap();

        let groups = store.list_by_category();
        assert_eq!(
            groups,
            vec![
                CategoryGroup {
                    category: DEFAULT_CATEGORY.to_string(),
                    book_ids: vec!["a.pdf".to_string(), "c.pdf".to_string()],
                },
                CategoryGroup {
                    category: "Science".to_string(),
                    book_ids: vec!["b.pdf".to_string(), "d.pdf".to_string()],
                },
            ]
        );
    }

    #[test]
    fn download_of_unknown_book_is_not_found() {
        let store = store_with(&["a.pdf"]);
        assert!(store.download("a.pdf").is_ok());
        assert!(matches!(
            store.download("zzz.pdf"),
            Err(BookError::NotFound { .. })
        ));
    }
}
