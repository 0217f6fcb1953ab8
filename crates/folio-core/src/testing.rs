//! In-crate fakes for the document library and the synthesizer.

use crate::library::{Document, DocumentLibrary};
use crate::speech::SpeechSynthesizer;
use anyhow::{Result, anyhow, bail};
use std::cell::RefCell;
use std::sync::Arc;

/// Page text that makes [`FakeDocument::page_text`] fail.
pub(crate) const BROKEN_PAGE: &str = "<broken>";

#[derive(Debug, Clone)]
pub(crate) struct FakeDocument {
    pages: Vec<String>,
}

impl FakeDocument {
    pub(crate) fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|page| page.to_string()).collect(),
        }
    }
}

impl Document for FakeDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let text = self
            .pages
            .get(index)
            .ok_or_else(|| anyhow!("no page at index {index}"))?;
        if text == BROKEN_PAGE {
            bail!("corrupt content stream");
        }
        Ok(text.clone())
    }
}

/// Reads uploads as UTF-8 text with pages separated by form feeds. Uploads
/// that do not start with `%PDF` fail to open.
#[derive(Debug, Default)]
pub(crate) struct FakeLibrary;

impl DocumentLibrary for FakeLibrary {
    fn open(&self, bytes: &[u8]) -> Result<Arc<dyn Document>> {
        let text = std::str::from_utf8(bytes)?;
        let Some(body) = text.strip_prefix("%PDF") else {
            bail!("missing PDF header");
        };
        let pages: Vec<&str> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('\x0C').collect()
        };
        Ok(Arc::new(FakeDocument::new(&pages)))
    }
}

pub(crate) fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
    format!("%PDF{}", pages.join("\x0C")).into_bytes()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SynthesisCall {
    pub(crate) text: String,
    pub(crate) language: String,
    pub(crate) slow: bool,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSynthesizer {
    pub(crate) calls: RefCell<Vec<SynthesisCall>>,
    pub(crate) fail_with: Option<String>,
}

impl RecordingSynthesizer {
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            calls: RefCell::default(),
            fail_with: Some(message.to_string()),
        }
    }

    pub(crate) fn slow_flags(&self) -> Vec<bool> {
        self.calls.borrow().iter().map(|call| call.slow).collect()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn synthesize(&self, text: &str, language: &str, slow: bool) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(SynthesisCall {
            text: text.to_string(),
            language: language.to_string(),
            slow,
        });
        if let Some(message) = &self.fail_with {
            bail!("{message}");
        }
        Ok(format!("audio:{language}:{slow}").into_bytes())
    }
}

/// Lets a test keep a handle on a synthesizer that the reader owns.
impl SpeechSynthesizer for Arc<RecordingSynthesizer> {
    fn synthesize(&self, text: &str, language: &str, slow: bool) -> Result<Vec<u8>> {
        self.as_ref().synthesize(text, language, slow)
    }
}
