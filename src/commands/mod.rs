use serde_json::{Map, Value};
use std::ffi::OsString;
use std::io::Read;
use std::process::ExitCode;

use crate::cli::{self, Parsed};
use crate::config::Config;
use crate::input::{self, CommandKind};
use crate::output::{self, Layout};
use crate::transcribe::{TranscriberFactory, TranscriptionPipeline};
use crate::{Result, TranscriptorError};

const API_KEY_PREFIX_LEN: usize = 10;

/// The single document of a run and whether it reports success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub document: String,
    pub success: bool,
}

impl Outcome {
    fn success(document: String) -> Self {
        Self { document, success: true }
    }

    pub fn failure(err: &TranscriptorError) -> Self {
        Self {
            document: output::failure_document(err),
            success: false,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Run one invocation end to end.
///
/// This is the only place errors become JSON: whatever fails below is returned here and
/// turned into the failure envelope.
pub async fn dispatch<I, T, R, L, F>(args: I, input: Option<R>, load_config: L, make_factory: F) -> Outcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: Read,
    L: FnOnce() -> anyhow::Result<Config>,
    F: FnOnce(&Config) -> Box<dyn TranscriberFactory>,
{
    match run(args, input, load_config, make_factory).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error_type = err.error_type(), error = %err, "Command failed");
            Outcome::failure(&err)
        }
    }
}

async fn run<I, T, R, L, F>(args: I, input: Option<R>, load_config: L, make_factory: F) -> Result<Outcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: Read,
    L: FnOnce() -> anyhow::Result<Config>,
    F: FnOnce(&Config) -> Box<dyn TranscriberFactory>,
{
    let command = match cli::parse_args(args)? {
        Parsed::Run(command) => command,
        Parsed::Display(text) => {
            let mut fields = Map::new();
            fields.insert("message".to_string(), Value::from(text.trim_end()));
            return Ok(Outcome::success(output::success_document(fields, Layout::Compact)));
        }
    };

    let config = load_config().map_err(TranscriptorError::Config)?;
    let request = input::resolve(command, input)?;
    let pipeline = TranscriptionPipeline::new(&config, make_factory(&config));

    let document = match request.command {
        CommandKind::Transcribe => {
            let record = pipeline.transcribe_file(&request).await?;
            output::success_document(record.into_fields(), Layout::Pretty)
        }
        CommandKind::YouTube => {
            let record = pipeline.transcribe_youtube(&request).await?;
            output::success_document(record.into_fields(), Layout::Pretty)
        }
        CommandKind::TestApiKey => {
            pipeline.check_api_key(&request)?;

            let mut fields = Map::new();
            fields.insert("message".to_string(), Value::from("valid key"));
            fields.insert(
                "api_key_prefix".to_string(),
                Value::from(crate::utils::secret_prefix(&request.api_key, API_KEY_PREFIX_LEN)),
            );
            output::success_document(fields, Layout::Compact)
        }
    };

    Ok(Outcome::success(document))
}
