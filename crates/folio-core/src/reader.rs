//! Command facade for UI shells.
//!
//! A shell turns user input into [`SessionCommand`]s and re-renders from the
//! [`ReaderSnapshot`] attached to every successful [`SessionEvent`]. Failed
//! commands return a [`BookError`](crate::error::BookError) and leave the
//! reader as it was.

use crate::book::Download;
use crate::config::AppConfig;
use crate::error::BookResult;
use crate::library::DocumentLibrary;
use crate::session::ReaderSession;
use crate::speech::{SpeechSpeed, SpeechSynthesizer};
use crate::store::{BookStore, CategoryGroup, UploadOutcome};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum SessionCommand {
    GetSnapshot,
    Upload { files: Vec<(String, Vec<u8>)> },
    SetCategory { id: String, category: String },
    SelectBook { id: String },
    SetPage { page: u32 },
    NextPage,
    PrevPage,
    AddHighlight { snippet: String },
    SaveNote { text: String },
    AddBookmark { description: String },
    Search { query: String },
    ReadAloud {
        language: Option<String>,
        speed: Option<SpeechSpeed>,
    },
    Download { id: String },
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::Upload { .. } => "reader_upload",
            Self::SetCategory { .. } => "reader_set_category",
            Self::SelectBook { .. } => "reader_select_book",
            Self::SetPage { .. } => "reader_set_page",
            Self::NextPage => "reader_next_page",
            Self::PrevPage => "reader_prev_page",
            Self::AddHighlight { .. } => "reader_add_highlight",
            Self::SaveNote { .. } => "reader_save_note",
            Self::AddBookmark { .. } => "reader_add_bookmark",
            Self::Search { .. } => "reader_search",
            Self::ReadAloud { .. } => "reader_read_aloud",
            Self::Download { .. } => "reader_download",
        }
    }
}

/// What a command produced besides the state change itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    None,
    Uploaded(Vec<UploadOutcome>),
    CategoryUpdated { id: String, changed: bool },
    Bookmarked { page: u32 },
    SearchResult { query: String, page: Option<u32> },
    Audio { language: String, slow: bool, bytes: Vec<u8> },
    Download(Download),
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub outcome: CommandOutcome,
    pub snapshot: ReaderSnapshot,
}

/// Everything a shell needs to draw the reading view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderSnapshot {
    pub library: Vec<CategoryGroup>,
    pub book: Option<BookView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub current_page: u32,
    pub page_count: u32,
    /// Empty when the page could not be read; see `page_error`.
    pub page_text: String,
    pub page_error: Option<String>,
    pub highlights: Vec<String>,
    pub note: Option<String>,
    pub bookmarks: Vec<BookmarkView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkView {
    pub page: u32,
    pub description: String,
}

/// Owns the store, the session and both collaborators.
pub struct Reader {
    store: BookStore,
    session: ReaderSession,
    library: Box<dyn DocumentLibrary>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    language: String,
    speed: SpeechSpeed,
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("store", &self.store)
            .field("session", &self.session)
            .field("language", &self.language)
            .field("speed", &self.speed)
            .finish_non_exhaustive()
    }
}

impl Reader {
    pub fn new(
        library: Box<dyn DocumentLibrary>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store: BookStore::new(),
            session: ReaderSession::new(),
            library,
            synthesizer,
            language: config.tts_language.clone(),
            speed: config.tts_speed,
        }
    }

    pub fn store(&self) -> &BookStore {
        &self.store
    }

    pub fn session(&self) -> &ReaderSession {
        &self.session
    }

    pub fn apply_command(&mut self, command: SessionCommand) -> BookResult<SessionEvent> {
        let action = command.action();
        debug!(action, "Applying command");
        let outcome = self.dispatch(command).inspect_err(|err| {
            debug!(action, kind = err.kind(), "Command failed: {err}");
        })?;
        Ok(SessionEvent {
            action,
            outcome,
            snapshot: self.snapshot(),
        })
    }

    fn dispatch(&mut self, command: SessionCommand) -> BookResult<CommandOutcome> {
        let outcome = match command {
            SessionCommand::GetSnapshot => CommandOutcome::None,
            SessionCommand::Upload { files } => {
                CommandOutcome::Uploaded(self.store.upload_many(self.library.as_ref(), files))
            }
            SessionCommand::SetCategory { id, category } => {
                let changed = self.store.set_category(&id, category)?;
                CommandOutcome::CategoryUpdated { id, changed }
            }
            SessionCommand::SelectBook { id } => {
                self.session.select_book(&self.store, &id)?;
                CommandOutcome::None
            }
            SessionCommand::SetPage { page } => {
                self.session.set_page(&self.store, page)?;
                CommandOutcome::None
            }
            SessionCommand::NextPage => {
                self.session.next_page(&self.store)?;
                CommandOutcome::None
            }
            SessionCommand::PrevPage => {
                self.session.prev_page(&self.store)?;
                CommandOutcome::None
            }
            SessionCommand::AddHighlight { snippet } => {
                self.session.add_highlight(&mut self.store, &snippet)?;
                CommandOutcome::None
            }
            SessionCommand::SaveNote { text } => {
                self.session.save_note(&mut self.store, &text)?;
                CommandOutcome::None
            }
            SessionCommand::AddBookmark { description } => {
                let page = self.session.add_bookmark(&mut self.store, &description)?;
                CommandOutcome::Bookmarked { page }
            }
            SessionCommand::Search { query } => {
                let page = self.session.search(&self.store, &query)?;
                CommandOutcome::SearchResult { query, page }
            }
            SessionCommand::ReadAloud { language, speed } => {
                let language = language.unwrap_or_else(|| self.language.clone());
                let speed = speed.unwrap_or(self.speed);
                let bytes = self.session.read_aloud(
                    &self.store,
                    self.synthesizer.as_ref(),
                    &language,
                    speed,
                )?;
                CommandOutcome::Audio {
                    language: language.trim().to_string(),
                    slow: speed.is_slow(),
                    bytes,
                }
            }
            SessionCommand::Download { id } => CommandOutcome::Download(self.store.download(&id)?),
        };
        Ok(outcome)
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        ReaderSnapshot {
            library: self.store.list_by_category(),
            book: self.book_view(),
        }
    }

    fn book_view(&self) -> Option<BookView> {
        let id = self.session.selected_book_id()?;
        let page = self.session.current_page()?;
        let book = self.store.get(id)?;

        let (page_text, page_error) = match book.page_text(page) {
            Ok(text) => (text, None),
            Err(err) => {
                warn!(id, page, "Error loading page: {err}");
                (String::new(), Some(err.to_string()))
            }
        };

        Some(BookView {
            id: book.id().to_string(),
            title: book.title().to_string(),
            category: book.category().to_string(),
            current_page: page,
            page_count: book.page_count(),
            page_text,
            page_error,
            highlights: book.highlights_on(page).to_vec(),
            note: book.note(page).map(str::to_string),
            bookmarks: book
                .bookmarks()
                .iter()
                .map(|(&page, description)| BookmarkView {
                    page,
                    description: description.clone(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookError;
    use crate::testing::{BROKEN_PAGE, FakeLibrary, RecordingSynthesizer, pdf_bytes};
    use std::sync::Arc;

    fn build_reader() -> (Reader, Arc<RecordingSynthesizer>) {
        let synth = Arc::new(RecordingSynthesizer::default());
        let config = AppConfig {
            tts_language: "es".to_string(),
            ..AppConfig::default()
        };
        let mut reader = Reader::new(Box::new(FakeLibrary), Box::new(Arc::clone(&synth)), &config);
        reader
            .apply_command(SessionCommand::Upload {
                files: vec![
                    (
                        "A".to_string(),
                        pdf_bytes(&["Page one.", "The fox page.", "Last page."]),
                    ),
                    ("B".to_string(), pdf_bytes(&[BROKEN_PAGE])),
                ],
            })
            .unwrap();
        (reader, synth)
    }

    fn select(reader: &mut Reader, id: &str) -> SessionEvent {
        reader
            .apply_command(SessionCommand::SelectBook { id: id.to_string() })
            .unwrap()
    }

    #[test]
    fn snapshot_without_selection_lists_library_only() {
        let (reader, _) = build_reader();
        let snapshot = reader.snapshot();
        assert!(snapshot.book.is_none());
        assert_eq!(snapshot.library.len(), 1);
        assert_eq!(snapshot.library[0].book_ids, vec!["A", "B"]);
    }

    #[test]
    fn select_then_navigate_updates_snapshot() {
        let (mut reader, _) = build_reader();
        let event = select(&mut reader, "A");
        assert_eq!(event.action, "reader_select_book");
        let view = event.snapshot.book.unwrap();
        assert_eq!(view.current_page, 1);
        assert_eq!(view.page_count, 3);
        assert_eq!(view.page_text, "Page one.");

        let event = reader.apply_command(SessionCommand::NextPage).unwrap();
        assert_eq!(event.action, "reader_next_page");
        assert_eq!(event.snapshot.book.unwrap().page_text, "The fox page.");
    }

    #[test]
    fn failed_command_leaves_state_untouched() {
        let (mut reader, _) = build_reader();
        select(&mut reader, "A");
        let before = reader.snapshot();

        let err = reader
            .apply_command(SessionCommand::SetPage { page: 9 })
            .unwrap_err();
        assert_eq!(
            err,
            BookError::Range {
                page: 9,
                page_count: 3
            }
        );
        assert_eq!(reader.snapshot(), before);
    }

    #[test]
    fn annotations_show_up_in_snapshot() {
        let (mut reader, _) = build_reader();
        select(&mut reader, "A");
        reader
            .apply_command(SessionCommand::SetPage { page: 2 })
            .unwrap();
        reader
            .apply_command(SessionCommand::AddHighlight {
                snippet: "FOX".to_string(),
            })
            .unwrap();
        reader
            .apply_command(SessionCommand::SaveNote {
                text: "remember this".to_string(),
            })
            .unwrap();
        let event = reader
            .apply_command(SessionCommand::AddBookmark {
                description: String::new(),
            })
            .unwrap();

        assert_eq!(event.outcome, CommandOutcome::Bookmarked { page: 2 });
        let view = event.snapshot.book.unwrap();
        assert_eq!(view.highlights, vec!["FOX"]);
        assert_eq!(view.note.as_deref(), Some("remember this"));
        assert_eq!(
            view.bookmarks,
            vec![BookmarkView {
                page: 2,
                description: "Bookmarked".to_string()
            }]
        );
    }

    #[test]
    fn search_does_not_move_the_reader() {
        let (mut reader, _) = build_reader();
        select(&mut reader, "A");
        let event = reader
            .apply_command(SessionCommand::Search {
                query: "fox".to_string(),
            })
            .unwrap();
        assert_eq!(
            event.outcome,
            CommandOutcome::SearchResult {
                query: "fox".to_string(),
                page: Some(2)
            }
        );
        assert_eq!(event.snapshot.book.unwrap().current_page, 1);
    }

    #[test]
    fn read_aloud_uses_configured_defaults() {
        let (mut reader, synth) = build_reader();
        select(&mut reader, "A");
        let event = reader
            .apply_command(SessionCommand::ReadAloud {
                language: None,
                speed: None,
            })
            .unwrap();
        assert_eq!(
            event.outcome,
            CommandOutcome::Audio {
                language: "es".to_string(),
                slow: false,
                bytes: b"audio:es:false".to_vec(),
            }
        );

        reader
            .apply_command(SessionCommand::ReadAloud {
                language: Some("en".to_string()),
                speed: Some(SpeechSpeed::Slow),
            })
            .unwrap();
        assert_eq!(synth.slow_flags(), vec![false, true]);
        assert_eq!(synth.calls.borrow()[1].language, "en");
    }

    #[test]
    fn unreadable_page_renders_empty_with_error() {
        let (mut reader, _) = build_reader();
        let view = select(&mut reader, "B").snapshot.book.unwrap();
        assert_eq!(view.page_text, "");
        assert!(view.page_error.unwrap().contains("Error reading page 1"));
    }

    #[test]
    fn category_and_download_commands() {
        let (mut reader, _) = build_reader();
        let event = reader
            .apply_command(SessionCommand::SetCategory {
                id: "B".to_string(),
                category: "Broken".to_string(),
            })
            .unwrap();
        assert_eq!(
            event.outcome,
            CommandOutcome::CategoryUpdated {
                id: "B".to_string(),
                changed: true
            }
        );
        assert_eq!(event.snapshot.library[1].category, "Broken");

        let event = reader
            .apply_command(SessionCommand::Download { id: "A".to_string() })
            .unwrap();
        let CommandOutcome::Download(download) = event.outcome else {
            panic!("expected a download");
        };
        assert_eq!(
            &*download.bytes,
            pdf_bytes(&["Page one.", "The fox page.", "Last page."]).as_slice()
        );
    }

    #[test]
    fn snapshot_serializes_for_shells() {
        let (mut reader, _) = build_reader();
        select(&mut reader, "A");
        let json = serde_json::to_value(reader.snapshot()).unwrap();
        assert_eq!(json["book"]["current_page"], 1);
        assert_eq!(json["library"][0]["category"], "Uncategorized");
    }
}
