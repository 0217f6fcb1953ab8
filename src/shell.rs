//! Line-oriented terminal front end.
//!
//! Each input line becomes one [`SessionCommand`]; the resulting event is
//! rendered back as plain text. Book errors and failed output writes are
//! printed and the loop keeps going.

use crate::output;
use anyhow::{Context, Result, anyhow, bail};
use folio_core::config::AppConfig;
use folio_core::reader::BookView;
use folio_core::{
    CommandOutcome, Reader, ReaderSnapshot, SessionCommand, SessionEvent, SpeechSpeed,
    UploadOutcome,
};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const HELP: &str = "\
Commands:
  open PATH...             add PDF files to the library
  books                    list books by category
  category ID NAME         set a book's category (use \"\" to clear)
  select ID                open a book at page 1
  page N | next | prev     move to another page
  text                     show the current page
  highlight TEXT           highlight text on the current page
  note TEXT                save a note for the current page
  bookmark [DESCRIPTION]   bookmark the current page
  search QUERY             find the first page containing QUERY
  read [LANG] [SPEED]      read the page aloud (speed: slow, normal, fast)
  download ID [PATH]       save the original file
  state                    print the full reader state as JSON
  help                     show this message
  quit                     leave the reader
Arguments with spaces can be wrapped in double quotes.";

/// How a successful command is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Quiet,
    Page,
    Library,
    Json,
}

#[derive(Debug, Clone)]
enum Input {
    Empty,
    Help,
    Quit,
    Open(Vec<PathBuf>),
    Run {
        command: SessionCommand,
        view: View,
        save_to: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    reader: Reader,
    audio_dir: PathBuf,
    download_dir: PathBuf,
}

impl Shell {
    pub fn new(reader: Reader, config: &AppConfig) -> Self {
        Self {
            reader,
            audio_dir: PathBuf::from(&config.audio_dir),
            download_dir: PathBuf::from(&config.download_dir),
        }
    }

    /// Read commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> Result<()> {
        writeln!(out, "Type 'help' for a list of commands.")?;
        let mut lines = input.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line.context("Reading command")?;
            if self.execute(&line, &mut out)? == Flow::Quit {
                break;
            }
        }
        info!("Shell closed");
        Ok(())
    }

    /// Run one line. Only output failures are returned as errors.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let input = match parse_line(line) {
            Ok(input) => input,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                return Ok(Flow::Continue);
            }
        };

        match input {
            Input::Empty => {}
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Quit => return Ok(Flow::Quit),
            Input::Open(paths) => self.open(&paths, out)?,
            Input::Run {
                command,
                view,
                save_to,
            } => match self.reader.apply_command(command) {
                Ok(event) => self.render(event, view, save_to.as_deref(), out)?,
                Err(err) => writeln!(out, "error: {err}")?,
            },
        }
        Ok(Flow::Continue)
    }

    /// Upload files from disk. Unreadable files are reported and skipped.
    pub fn open(&mut self, paths: &[PathBuf], out: &mut impl Write) -> Result<()> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match fs::read(path) {
                Ok(bytes) => files.push((book_id(path), bytes)),
                Err(err) => {
                    warn!(path = %path.display(), "Failed to read upload: {err}");
                    writeln!(out, "error: could not read {}: {err}", path.display())?;
                }
            }
        }
        if files.is_empty() {
            return Ok(());
        }
        match self.reader.apply_command(SessionCommand::Upload { files }) {
            Ok(event) => self.render(event, View::Quiet, None, out),
            Err(err) => Ok(writeln!(out, "error: {err}")?),
        }
    }

    fn save_audio(
        &self,
        snapshot: &ReaderSnapshot,
        language: &str,
        slow: bool,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        let book = snapshot
            .book
            .as_ref()
            .ok_or_else(|| anyhow!("audio produced without an open book"))?;
        let path = output::audio_path(
            &self.audio_dir,
            &book.id,
            book.current_page,
            language,
            slow,
            &book.page_text,
        );
        output::save_audio(&path, bytes)?;
        Ok(path)
    }

    fn render(
        &self,
        event: SessionEvent,
        view: View,
        save_to: Option<&Path>,
        out: &mut impl Write,
    ) -> Result<()> {
        debug!(action = event.action, "Rendering event");
        match &event.outcome {
            CommandOutcome::None => {}
            CommandOutcome::Uploaded(outcomes) => {
                for outcome in outcomes {
                    match outcome {
                        UploadOutcome::Added { id, page_count } => {
                            writeln!(out, "Added {id} ({page_count} pages)")?
                        }
                        UploadOutcome::AlreadyPresent { id } => {
                            writeln!(out, "{id} is already in the library")?
                        }
                        UploadOutcome::Failed(err) => writeln!(out, "error: {err}")?,
                    }
                }
            }
            CommandOutcome::CategoryUpdated { id, changed } => {
                if *changed {
                    writeln!(out, "Category updated for {id}.")?;
                } else {
                    writeln!(out, "Category for {id} unchanged.")?;
                }
            }
            CommandOutcome::Bookmarked { page } => writeln!(out, "Bookmarked page {page}.")?,
            CommandOutcome::SearchResult { query, page } => match page {
                Some(page) => writeln!(out, "Found \"{query}\" on page {page}.")?,
                None => writeln!(out, "\"{query}\" not found.")?,
            },
            CommandOutcome::Audio {
                language,
                slow,
                bytes,
            } => match self.save_audio(&event.snapshot, language, *slow, bytes) {
                Ok(path) => writeln!(out, "Audio saved to {}", path.display())?,
                Err(err) => return report_save_failure(event.action, &err, out),
            },
            CommandOutcome::Download(download) => {
                match output::save_download(download, &self.download_dir, save_to) {
                    Ok(path) => writeln!(
                        out,
                        "Saved {} ({}, {} bytes) to {}",
                        download.file_name,
                        download.mime,
                        download.bytes.len(),
                        path.display()
                    )?,
                    Err(err) => return report_save_failure(event.action, &err, out),
                }
            }
        }

        match view {
            View::Quiet => Ok(()),
            View::Page => render_page(&event.snapshot, out),
            View::Library => render_library(&event.snapshot, out),
            View::Json => {
                let json = serde_json::to_string_pretty(&event.snapshot)
                    .context("Serializing reader state")?;
                writeln!(out, "{json}")?;
                Ok(())
            }
        }
    }
}

/// Disk failures while saving output end the command, not the shell.
fn report_save_failure(action: &str, err: &anyhow::Error, out: &mut impl Write) -> Result<()> {
    warn!(action, "Failed to save output: {err:#}");
    writeln!(out, "error: {err:#}")?;
    Ok(())
}

fn render_page(snapshot: &ReaderSnapshot, out: &mut impl Write) -> Result<()> {
    let Some(book) = &snapshot.book else {
        writeln!(out, "No book selected.")?;
        return Ok(());
    };
    write_page(book, out)
}

fn write_page(book: &BookView, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "[{}] page {}/{} ({})",
        book.title, book.current_page, book.page_count, book.category
    )?;
    match &book.page_error {
        Some(err) => writeln!(out, "({err})")?,
        None => writeln!(out, "{}", book.page_text)?,
    }
    if !book.highlights.is_empty() {
        writeln!(out, "Highlights:")?;
        for highlight in &book.highlights {
            writeln!(out, "  - {highlight}")?;
        }
    }
    if let Some(note) = &book.note {
        writeln!(out, "Note: {note}")?;
    }
    if let Some(bookmark) = book
        .bookmarks
        .iter()
        .find(|bookmark| bookmark.page == book.current_page)
    {
        writeln!(out, "Bookmark: {}", bookmark.description)?;
    }
    Ok(())
}

fn render_library(snapshot: &ReaderSnapshot, out: &mut impl Write) -> Result<()> {
    if snapshot.library.is_empty() {
        writeln!(out, "The library is empty.")?;
        return Ok(());
    }
    for group in &snapshot.library {
        let label = if group.category.is_empty() {
            "(no category)"
        } else {
            group.category.as_str()
        };
        writeln!(out, "{label}:")?;
        for id in &group.book_ids {
            writeln!(out, "  {id}")?;
        }
    }
    Ok(())
}

/// Books are keyed by their file name.
fn book_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_line(line: &str) -> Result<Input> {
    let tokens = tokenize(line)?;
    let Some((name, args)) = tokens.split_first() else {
        return Ok(Input::Empty);
    };

    let run = |command: SessionCommand, view: View| Input::Run {
        command,
        view,
        save_to: None,
    };

    let input = match name.to_ascii_lowercase().as_str() {
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "open" => {
            if args.is_empty() {
                bail!("usage: open PATH...");
            }
            Input::Open(args.iter().map(PathBuf::from).collect())
        }
        "books" => run(SessionCommand::GetSnapshot, View::Library),
        "state" => run(SessionCommand::GetSnapshot, View::Json),
        "text" => run(SessionCommand::GetSnapshot, View::Page),
        "category" => {
            let [id, category] = args else {
                bail!("usage: category ID NAME");
            };
            run(
                SessionCommand::SetCategory {
                    id: id.clone(),
                    category: category.clone(),
                },
                View::Quiet,
            )
        }
        "select" => {
            let [id] = args else {
                bail!("usage: select ID");
            };
            run(SessionCommand::SelectBook { id: id.clone() }, View::Page)
        }
        "page" => {
            let [page] = args else {
                bail!("usage: page N");
            };
            let page = page
                .parse::<u32>()
                .map_err(|_| anyhow!("page must be a positive number, got '{page}'"))?;
            run(SessionCommand::SetPage { page }, View::Page)
        }
        "next" => run(SessionCommand::NextPage, View::Page),
        "prev" => run(SessionCommand::PrevPage, View::Page),
        "highlight" => run(
            SessionCommand::AddHighlight {
                snippet: args.join(" "),
            },
            View::Page,
        ),
        "note" => run(
            SessionCommand::SaveNote {
                text: args.join(" "),
            },
            View::Page,
        ),
        "bookmark" => run(
            SessionCommand::AddBookmark {
                description: args.join(" "),
            },
            View::Quiet,
        ),
        "search" => run(
            SessionCommand::Search {
                query: args.join(" "),
            },
            View::Quiet,
        ),
        "read" => {
            if args.len() > 2 {
                bail!("usage: read [LANG] [SPEED]");
            }
            let speed = args
                .get(1)
                .map(|speed| speed.parse::<SpeechSpeed>())
                .transpose()
                .map_err(|err| anyhow!(err))?;
            run(
                SessionCommand::ReadAloud {
                    language: args.first().cloned(),
                    speed,
                },
                View::Quiet,
            )
        }
        "download" => {
            let (id, save_to) = match args {
                [id] => (id, None),
                [id, path] => (id, Some(PathBuf::from(path))),
                _ => bail!("usage: download ID [PATH]"),
            };
            Input::Run {
                command: SessionCommand::Download { id: id.clone() },
                view: View::Quiet,
                save_to,
            }
        }
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(input)
}

/// Split on whitespace, keeping double-quoted runs together. `""` yields an
/// empty argument.
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        bail!("unterminated quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
