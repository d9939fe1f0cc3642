//! Builds the single [`InvocationRequest`] of a run.
//!
//! Positional arguments win whenever both the target and the API key are present. Only
//! `transcribe` falls back to a JSON payload on stdin, and only when stdin is piped.

use serde::Deserialize;
use std::io::Read;

use crate::cli::Commands;
use crate::{Result, TranscriptorError};

pub const DEFAULT_LANGUAGE: &str = "es";
pub const DEFAULT_MODEL: &str = "whisper-large-v3-turbo";

const TRANSCRIBE_USAGE: &str = "Usage: transcriptor transcribe <file_path> <api_key> [language] [model] [prompt]";
const YOUTUBE_USAGE: &str = "Usage: transcriptor youtube <url> <api_key> [language] [model]";
const TEST_API_USAGE: &str = "Usage: transcriptor test_api <api_key>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Transcribe,
    YouTube,
    TestApiKey,
}

/// Everything one run needs, resolved once and passed down by reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub command: CommandKind,

    /// File path for `transcribe`, URL for `youtube`, empty for `test_api`
    pub target: String,

    pub api_key: String,
    pub language: String,
    pub model: String,
    pub prompt: String,
}

/// Payload accepted on stdin by `transcribe`
#[derive(Debug, Deserialize)]
struct TranscribePayload {
    file_path: Option<String>,
    api_key: Option<String>,
    language: Option<String>,
    model: Option<String>,
    prompt: Option<String>,
}

/// Resolve the request for `command`.
///
/// `input` is `None` when stdin is an interactive terminal. It is read at most once,
/// and only when the positional arguments are insufficient.
pub fn resolve<R: Read>(command: Commands, input: Option<R>) -> Result<InvocationRequest> {
    match command {
        Commands::Transcribe {
            file_path: Some(file_path),
            api_key: Some(api_key),
            language,
            model,
            prompt,
        } => Ok(build(CommandKind::Transcribe, file_path, api_key, language, model, prompt)),

        Commands::Transcribe { .. } => match input {
            Some(reader) => from_payload(reader),
            None => Err(TranscriptorError::Usage(TRANSCRIBE_USAGE.to_string())),
        },

        Commands::Youtube {
            url: Some(url),
            api_key: Some(api_key),
            language,
            model,
        } => Ok(build(CommandKind::YouTube, url, api_key, language, model, None)),

        Commands::Youtube { .. } => Err(TranscriptorError::Usage(YOUTUBE_USAGE.to_string())),

        Commands::TestApi { api_key: Some(api_key) } => {
            Ok(build(CommandKind::TestApiKey, String::new(), api_key, None, None, None))
        }

        Commands::TestApi { api_key: None } => Err(TranscriptorError::Usage(TEST_API_USAGE.to_string())),
    }
}

fn from_payload<R: Read>(mut reader: R) -> Result<InvocationRequest> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| TranscriptorError::Usage(format!("Invalid JSON payload on stdin: {}", e)))?;

    if raw.trim().is_empty() {
        return Err(TranscriptorError::Usage(TRANSCRIBE_USAGE.to_string()));
    }

    let payload: TranscribePayload = serde_json::from_str(&raw)
        .map_err(|e| TranscriptorError::Usage(format!("Invalid JSON payload on stdin: {}", e)))?;

    let missing = |field: &str| TranscriptorError::Usage(format!("JSON payload is missing \"{}\"", field));
    let file_path = payload.file_path.ok_or_else(|| missing("file_path"))?;
    let api_key = payload.api_key.ok_or_else(|| missing("api_key"))?;

    tracing::debug!(file_path = %file_path, "Request read from stdin payload");

    Ok(build(
        CommandKind::Transcribe,
        file_path,
        api_key,
        payload.language,
        payload.model,
        payload.prompt,
    ))
}

fn build(
    command: CommandKind,
    target: String,
    api_key: String,
    language: Option<String>,
    model: Option<String>,
    prompt: Option<String>,
) -> InvocationRequest {
    InvocationRequest {
        command,
        target,
        api_key,
        language: language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        prompt: prompt.unwrap_or_default(),
    }
}
