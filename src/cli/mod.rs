use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};
use std::ffi::OsString;

use crate::{Result, TranscriptorError};

pub const USAGE: &str = "Usage: transcriptor <transcribe|youtube|test_api> [args]";

#[derive(Parser, Debug)]
#[command(
    name = "transcriptor",
    about = "Transcriptor - Transcribe local media files and YouTube videos",
    version,
    long_about = "Transcribes a local audio/video file or a YouTube URL through an OpenAI-compatible speech-to-text provider. Every run prints exactly one JSON document to stdout and exits 0 on success, 1 on failure."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments are all optional at the clap level; the input resolver decides what is
/// missing so that `transcribe` can fall back to a JSON payload on stdin.
///
/// Positionals are taken verbatim, so keys or paths starting with `-` are values.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Transcribe a local audio or video file
    Transcribe {
        /// Path of the file to transcribe
        #[arg(value_name = "FILE_PATH", allow_hyphen_values = true)]
        file_path: Option<String>,

        /// Provider API key
        #[arg(value_name = "API_KEY", allow_hyphen_values = true)]
        api_key: Option<String>,

        /// Language code (default: es)
        #[arg(value_name = "LANGUAGE", allow_hyphen_values = true)]
        language: Option<String>,

        /// Transcription model (default: whisper-large-v3-turbo)
        #[arg(value_name = "MODEL", allow_hyphen_values = true)]
        model: Option<String>,

        /// Prompt to guide spelling and style
        #[arg(value_name = "PROMPT", allow_hyphen_values = true)]
        prompt: Option<String>,
    },

    /// Download the audio of a YouTube video and transcribe it
    Youtube {
        /// Video URL
        #[arg(value_name = "URL", allow_hyphen_values = true)]
        url: Option<String>,

        /// Provider API key
        #[arg(value_name = "API_KEY", allow_hyphen_values = true)]
        api_key: Option<String>,

        /// Language code (default: es)
        #[arg(value_name = "LANGUAGE", allow_hyphen_values = true)]
        language: Option<String>,

        /// Transcription model (default: whisper-large-v3-turbo)
        #[arg(value_name = "MODEL", allow_hyphen_values = true)]
        model: Option<String>,
    },

    /// Check that an API key is accepted by the provider client
    #[command(name = "test_api")]
    TestApi {
        /// Provider API key
        #[arg(value_name = "API_KEY", allow_hyphen_values = true)]
        api_key: Option<String>,
    },
}

/// What the argument vector asked for.
#[derive(Debug)]
pub enum Parsed {
    Run(Commands),
    /// `--help` or `--version` text, reported as the message of a success document.
    Display(String),
}

/// Parse the argument vector without letting clap exit the process.
pub fn parse_args<I, T>(args: I) -> Result<Parsed>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Parsed::Run(cli.command)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(Parsed::Display(err.render().to_string())),
            // clap reports a bare `transcriptor` as a help request
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
                Err(TranscriptorError::Usage(USAGE.to_string()))
            }
            ErrorKind::InvalidSubcommand => {
                let token = match err.get(ContextKind::InvalidSubcommand) {
                    Some(ContextValue::String(token)) => token.clone(),
                    _ => String::from("<unknown>"),
                };
                Err(TranscriptorError::UnknownCommand(token))
            }
            _ => Err(TranscriptorError::Usage(first_line(&err.render().to_string()))),
        },
    }
}

/// First line of a rendered clap error without its `error: ` prefix.
fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default().trim();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}
