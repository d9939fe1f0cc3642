//! Transcriptor - turn a local media file or a YouTube URL into a transcript
//!
//! Speech recognition is delegated to an OpenAI-compatible transcription provider and
//! media acquisition to `yt-dlp`. Every invocation handles one input and reports its
//! outcome as exactly one JSON document on stdout.

pub mod cli;
pub mod commands;
pub mod config;
pub mod extractors;
pub mod input;
pub mod output;
pub mod transcribe;
pub mod utils;

use std::path::PathBuf;

pub use cli::{Cli, Commands};
pub use commands::{dispatch, Outcome};
pub use config::Config;
pub use extractors::AcquiredMedia;
pub use input::{CommandKind, InvocationRequest};
pub use transcribe::{ProviderError, TranscriptRecord, TranscriptionPipeline};

/// Result type used throughout the library
pub type Result<T, E = TranscriptorError> = std::result::Result<T, E>;

/// Error types specific to the transcriptor
///
/// Each variant maps to the `error_type` tag of the failure envelope.
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("{0}")]
    Usage(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("{program} is not installed. {hint}")]
    ToolNotInstalled { program: String, hint: String },

    #[error("Error downloading from YouTube: {0}")]
    DownloadFailed(String),

    #[error("Could not download audio from YouTube: the downloader produced no audio file")]
    NoAudioProduced,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscriptorError {
    /// Category tag reported alongside the message in the failure envelope.
    pub fn error_type(&self) -> &'static str {
        match self {
            TranscriptorError::Usage(_) => "UsageError",
            TranscriptorError::UnknownCommand(_) => "UnknownCommand",
            TranscriptorError::FileNotFound { .. } => "FileNotFound",
            TranscriptorError::ToolNotInstalled { .. } => "ToolNotInstalled",
            TranscriptorError::DownloadFailed(_) => "DownloadFailed",
            TranscriptorError::NoAudioProduced => "NoAudioProduced",
            TranscriptorError::Provider(err) => err.error_type(),
            TranscriptorError::Config(_) => "ConfigError",
            TranscriptorError::Io(_) => "IoError",
        }
    }
}
