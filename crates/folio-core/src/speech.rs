//! Text-to-speech.
//!
//! The reader only needs one call: turn page text into audio bytes. The
//! production synthesizer talks to Google Translate's public `translate_tts`
//! endpoint, which accepts at most 100 characters per request, so text is
//! chunked and the returned MP3 segments are concatenated.

use crate::config::AppConfig;
use crate::text_utils;
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Longest piece of text the endpoint accepts in one request.
pub const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) folio-reader";

pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str, language: &str, slow: bool) -> Result<Vec<u8>>;
}

/// Reading speed offered to the user.
///
/// The service only distinguishes slow from normal playback, so `Fast`
/// synthesizes exactly like `Normal`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeechSpeed {
    pub const ALL: [SpeechSpeed; 3] = [SpeechSpeed::Slow, SpeechSpeed::Normal, SpeechSpeed::Fast];

    pub fn is_slow(self) -> bool {
        matches!(self, SpeechSpeed::Slow)
    }
}

impl std::fmt::Display for SpeechSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SpeechSpeed::Slow => "Slow",
            SpeechSpeed::Normal => "Normal",
            SpeechSpeed::Fast => "Fast",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for SpeechSpeed {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(SpeechSpeed::Slow),
            "normal" => Ok(SpeechSpeed::Normal),
            "fast" => Ok(SpeechSpeed::Fast),
            other => Err(format!(
                "unknown speed '{other}' (expected slow, normal or fast)"
            )),
        }
    }
}

/// Google Translate text-to-speech over blocking HTTP.
#[derive(Debug, Clone)]
pub struct GoogleTranslateTts {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateTts {
    pub fn new(tld: &str, timeout: Duration) -> Result<Self> {
        Self::with_endpoint(endpoint_for_tld(tld), timeout)
    }

    fn with_endpoint(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Building TTS HTTP client")?;
        info!(%endpoint, timeout_ms = timeout.as_millis(), "Initializing TTS client");
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.tts_tld, config.tts_timeout())
    }

    fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        slow: bool,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let params = request_params(chunk, language, slow, idx, total);
        debug!(idx, total, chars = chunk.chars().count(), "Requesting speech chunk");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .with_context(|| format!("Sending TTS request {}/{}", idx + 1, total))?;
        let status = response.status();
        if !status.is_success() {
            bail!("TTS service returned {status} for chunk {}/{}", idx + 1, total);
        }
        let body = response.bytes().context("Reading TTS response body")?;
        Ok(body.to_vec())
    }
}

impl SpeechSynthesizer for GoogleTranslateTts {
    fn synthesize(&self, text: &str, language: &str, slow: bool) -> Result<Vec<u8>> {
        let chunks = text_utils::chunk_for_speech(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            bail!("No text to speak");
        }
        info!(
            chunks = chunks.len(),
            chars = text.len(),
            language,
            slow,
            "Synthesizing speech"
        );

        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, language, slow, idx, total)?;
            audio.extend_from_slice(&bytes);
        }
        debug!(bytes = audio.len(), "Synthesized speech");
        Ok(audio)
    }
}

fn endpoint_for_tld(tld: &str) -> String {
    let tld = tld.trim().trim_start_matches('.');
    let tld = if tld.is_empty() { "com" } else { tld };
    format!("https://translate.google.{tld}/translate_tts")
}

fn request_params(
    chunk: &str,
    language: &str,
    slow: bool,
    idx: usize,
    total: usize,
) -> Vec<(&'static str, String)> {
    vec![
        ("ie", "UTF-8".to_string()),
        ("q", chunk.to_string()),
        ("tl", language.to_string()),
        ("client", "tw-ob".to_string()),
        ("ttsspeed", if slow { "0.3" } else { "1" }.to_string()),
        ("total", total.to_string()),
        ("idx", idx.to_string()),
        ("textlen", chunk.chars().count().to_string()),
    ]
}
