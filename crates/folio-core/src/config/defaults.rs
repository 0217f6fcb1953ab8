use crate::config::LogLevel;
use crate::speech::SpeechSpeed;

pub(crate) const MIN_TTS_TIMEOUT_SECS: f32 = 1.0;
pub(crate) const MAX_TTS_TIMEOUT_SECS: f32 = 120.0;

pub(crate) fn default_log_level() -> LogLevel {
    LogLevel::Info
}

pub(crate) fn default_tts_language() -> String {
    "en".to_string()
}

pub(crate) fn default_tts_speed() -> SpeechSpeed {
    SpeechSpeed::Normal
}

pub(crate) fn default_tts_tld() -> String {
    "com".to_string()
}

pub(crate) fn default_tts_timeout_secs() -> f32 {
    15.0
}

pub(crate) fn default_audio_dir() -> String {
    ".cache/audio".to_string()
}

pub(crate) fn default_download_dir() -> String {
    "downloads".to_string()
}
