use crate::speech::SpeechSpeed;
use serde::Deserialize;
use std::time::Duration;

/// High-level app configuration; the TOML layout lives in `tables`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub tts_language: String,
    pub tts_speed: SpeechSpeed,
    pub tts_tld: String,
    pub tts_timeout_secs: f32,
    pub audio_dir: String,
    pub download_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: crate::config::defaults::default_log_level(),
            tts_language: crate::config::defaults::default_tts_language(),
            tts_speed: crate::config::defaults::default_tts_speed(),
            tts_tld: crate::config::defaults::default_tts_tld(),
            tts_timeout_secs: crate::config::defaults::default_tts_timeout_secs(),
            audio_dir: crate::config::defaults::default_audio_dir(),
            download_dir: crate::config::defaults::default_download_dir(),
        }
    }
}

impl AppConfig {
    /// Request timeout for the speech service, kept within sane bounds.
    pub fn tts_timeout(&self) -> Duration {
        let secs = if self.tts_timeout_secs.is_finite() {
            self.tts_timeout_secs.clamp(
                crate::config::defaults::MIN_TTS_TIMEOUT_SECS,
                crate::config::defaults::MAX_TTS_TIMEOUT_SECS,
            )
        } else {
            crate::config::defaults::default_tts_timeout_secs()
        };
        Duration::from_secs_f32(secs)
    }
}

/// Logging verbosity.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
