//! Error types for the podcast pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PodcastError {
    #[error("no .wav clips found in '{}'", .0.display())]
    NoClipsFound(PathBuf),

    #[error("clip '{0}' does not start with a numeric order prefix")]
    InvalidClipName(String),

    #[error("sample rate mismatch in '{file}': expected {expected} Hz, found {actual} Hz")]
    SampleRateMismatch {
        file: String,
        expected: u32,
        actual: u32,
    },

    #[error("channel layout mismatch in '{file}': expected {expected} channel(s), found {actual}")]
    ChannelLayoutMismatch {
        file: String,
        expected: u16,
        actual: u16,
    },

    #[error("clip '{0}' does not match the encoding of the first clip")]
    ClipFormatMismatch(String),

    #[error("unknown stitching strategy: {0}")]
    UnknownStitcher(String),

    #[error("unknown host id: {0}")]
    UnknownHost(String),

    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("transcript error: {0}")]
    TranscriptError(String),

    #[error("TTS error: {0}")]
    TtsError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
