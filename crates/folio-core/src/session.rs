//! Reading position and annotation writes.
//!
//! A [`ReaderSession`] only remembers which book is open and on which page.
//! The books themselves live in the [`BookStore`]; every operation borrows
//! the store for the duration of the call.

use crate::book::{Book, DEFAULT_BOOKMARK};
use crate::error::{BookError, BookResult};
use crate::speech::{SpeechSpeed, SpeechSynthesizer};
use crate::store::BookStore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selection {
    book_id: String,
    page: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ReaderSession {
    selection: Option<Selection>,
}

impl ReaderSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_book_id(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.book_id.as_str())
    }

    /// 1-based page, or `None` when nothing is selected.
    pub fn current_page(&self) -> Option<u32> {
        self.selection.as_ref().map(|s| s.page)
    }

    pub fn select_book(&mut self, store: &BookStore, id: &str) -> BookResult<()> {
        store.book(id)?;
        self.selection = Some(Selection {
            book_id: id.to_string(),
            page: 1,
        });
        info!(id, "Selected book");
        Ok(())
    }

    pub fn set_page(&mut self, store: &BookStore, page: u32) -> BookResult<()> {
        let Some(selection) = self.selection.as_mut() else {
            return Err(BookError::Range {
                page,
                page_count: 0,
            });
        };
        let book = store.book(&selection.book_id)?;
        book.check_page(page)?;
        selection.page = page;
        debug!(id = %selection.book_id, page, "Changed page");
        Ok(())
    }

    pub fn next_page(&mut self, store: &BookStore) -> BookResult<()> {
        let (_, page) = self.position()?;
        self.set_page(store, page.saturating_add(1))
    }

    pub fn prev_page(&mut self, store: &BookStore) -> BookResult<()> {
        let (_, page) = self.position()?;
        self.set_page(store, page.saturating_sub(1))
    }

    /// Plain text of the current page.
    ///
    /// Extraction failures are returned as [`BookError::Extraction`] rather
    /// than replaced with an empty page.
    pub fn page_text(&self, store: &BookStore) -> BookResult<String> {
        let (book, page) = self.current(store)?;
        book.page_text(page)
    }

    /// Record `snippet` as a highlight on the current page. The snippet must
    /// occur in the page text, ignoring case.
    pub fn add_highlight(&self, store: &mut BookStore, snippet: &str) -> BookResult<()> {
        let (book, page) = self.current(store)?;
        if snippet.is_empty() {
            return Err(BookError::validation(
                "Text not found on this page or input is empty.",
            ));
        }
        let text = book.page_text(page)?;
        if !contains_ignore_case(&text, snippet) {
            return Err(BookError::validation(
                "Text not found on this page or input is empty.",
            ));
        }

        let id = book.id().to_string();
        store.book_mut(&id)?.push_highlight(page, snippet.to_string())?;
        info!(id = %id, page, chars = snippet.len(), "Added highlight");
        Ok(())
    }

    /// Save (or replace) the note for the current page.
    pub fn save_note(&self, store: &mut BookStore, text: &str) -> BookResult<()> {
        let (book, page) = self.current(store)?;
        if text.trim().is_empty() {
            return Err(BookError::validation("Note is empty."));
        }
        let id = book.id().to_string();
        store.book_mut(&id)?.set_note(page, text.to_string())?;
        info!(id = %id, page, "Saved note");
        Ok(())
    }

    /// Bookmark the current page. An empty description becomes
    /// `"Bookmarked"`. Returns the page that was bookmarked.
    pub fn add_bookmark(&self, store: &mut BookStore, description: &str) -> BookResult<u32> {
        let (book, page) = self.current(store)?;
        let description = if description.is_empty() {
            DEFAULT_BOOKMARK
        } else {
            description
        };
        let id = book.id().to_string();
        store
            .book_mut(&id)?
            .set_bookmark(page, description.to_string())?;
        info!(id = %id, page, "Bookmarked page");
        Ok(page)
    }

    /// First page, in ascending order, whose text contains `query` ignoring
    /// case.
    ///
    /// The match is a literal substring test, so an empty query matches the
    /// first readable page. Pages that fail to extract are logged and
    /// skipped.
    pub fn search(&self, store: &BookStore, query: &str) -> BookResult<Option<u32>> {
        let (book, _) = self.current(store)?;
        let needle = query.to_lowercase();
        for page in 1..=book.page_count() {
            match book.page_text(page) {
                Ok(text) => {
                    if text.to_lowercase().contains(&needle) {
                        debug!(id = book.id(), page, "Search hit");
                        return Ok(Some(page));
                    }
                }
                Err(err) => {
                    warn!(id = book.id(), page, "Skipping page during search: {err}");
                }
            }
        }
        debug!(id = book.id(), "Search found nothing");
        Ok(None)
    }

    /// Synthesize the current page. Only [`SpeechSpeed::Slow`] asks the
    /// synthesizer for slow speech.
    pub fn read_aloud(
        &self,
        store: &BookStore,
        synthesizer: &dyn SpeechSynthesizer,
        language: &str,
        speed: SpeechSpeed,
    ) -> BookResult<Vec<u8>> {
        let (book, page) = self.current(store)?;
        let language = language.trim();
        if language.is_empty() {
            return Err(BookError::validation("Language code is empty."));
        }
        let text = book.page_text(page)?;
        if text.trim().is_empty() {
            return Err(BookError::validation("No text on this page to read."));
        }

        let slow = speed.is_slow();
        info!(id = book.id(), page, language, %speed, slow, "Reading page aloud");
        synthesizer
            .synthesize(&text, language, slow)
            .map_err(|err| BookError::Tts(format!("{err:#}")))
    }

    fn position(&self) -> BookResult<(&str, u32)> {
        self.selection
            .as_ref()
            .map(|s| (s.book_id.as_str(), s.page))
            .ok_or(BookError::NoSelection)
    }

    fn current<'a>(&self, store: &'a BookStore) -> BookResult<(&'a Book, u32)> {
        let (id, page) = self.position()?;
        Ok((store.book(id)?, page))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
