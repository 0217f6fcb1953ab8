use super::defaults;
use super::models::{AppConfig, LogLevel};
use crate::speech::SpeechSpeed;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    tts: TtsConfig,
    #[serde(default)]
    output: OutputConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            log_level: tables.logging.log_level,
            tts_language: tables.tts.language,
            tts_speed: tables.tts.speed,
            tts_tld: tables.tts.tld,
            tts_timeout_secs: tables.tts.timeout_secs,
            audio_dir: tables.output.audio_dir,
            download_dir: tables.output.download_dir,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TtsConfig {
    #[serde(default = "defaults::default_tts_language")]
    language: String,
    #[serde(default = "defaults::default_tts_speed")]
    speed: SpeechSpeed,
    #[serde(default = "defaults::default_tts_tld")]
    tld: String,
    #[serde(default = "defaults::default_tts_timeout_secs")]
    timeout_secs: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        TtsConfig {
            language: defaults::default_tts_language(),
            speed: defaults::default_tts_speed(),
            tld: defaults::default_tts_tld(),
            timeout_secs: defaults::default_tts_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct OutputConfig {
    #[serde(default = "defaults::default_audio_dir")]
    audio_dir: String,
    #[serde(default = "defaults::default_download_dir")]
    download_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            audio_dir: defaults::default_audio_dir(),
            download_dir: defaults::default_download_dir(),
        }
    }
}
