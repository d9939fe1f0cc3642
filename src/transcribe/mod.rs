use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::config::Config;
use crate::extractors::{AcquiredMedia, LocalFileExtractor, YoutubeExtractor};
use crate::input::InvocationRequest;
use crate::Result;

pub mod groq;

pub use groq::{GroqFactory, GroqTranscriber};

/// Failures reported by the transcription provider.
///
/// Messages and tags are surfaced unchanged in the failure envelope.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },
}

impl ProviderError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ProviderError::InvalidApiKey(_) => "InvalidApiKey",
            ProviderError::UnsupportedFile(_) => "UnsupportedFile",
            ProviderError::Network(_) => "NetworkError",
            ProviderError::Provider { .. } => "ProviderError",
        }
    }
}

/// Transcript as returned by the provider, plus whatever the pipeline adds to it.
///
/// The provider owns the shape; only the enrichment keys are known here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptRecord(Map<String, Value>);

impl TranscriptRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The transcribed text, when the provider returned one
    pub fn text(&self) -> Option<&str> {
        self.0.get("text").and_then(Value::as_str)
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

/// A connected speech-to-text client
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio file. Single attempt, no retry.
    async fn transcribe(
        &self,
        audio: &Path,
        language: &str,
        prompt: &str,
    ) -> std::result::Result<TranscriptRecord, ProviderError>;
}

/// Builds transcribers from an API key and a default model.
///
/// Construction performs the provider's local key validation and no network call.
#[cfg_attr(test, mockall::automock)]
pub trait TranscriberFactory: Send + Sync {
    fn connect(
        &self,
        api_key: &str,
        default_model: &str,
    ) -> std::result::Result<Box<dyn Transcriber>, ProviderError>;
}

/// Main transcription pipeline
pub struct TranscriptionPipeline {
    local: LocalFileExtractor,
    youtube: YoutubeExtractor,
    factory: Box<dyn TranscriberFactory>,
}

impl TranscriptionPipeline {
    pub fn new(config: &Config, factory: Box<dyn TranscriberFactory>) -> Self {
        Self {
            local: LocalFileExtractor::new(),
            youtube: YoutubeExtractor::new(config),
            factory,
        }
    }

    /// Transcribe a local file
    pub async fn transcribe_file(&self, request: &InvocationRequest) -> Result<TranscriptRecord> {
        let media = self.local.acquire(&request.target)?;

        let mut record = self.invoke(request, &media).await?;
        enrich(&mut record, &media);

        Ok(record)
    }

    /// Download the audio of a YouTube URL and transcribe it.
    ///
    /// The download workspace stays alive until the provider call has returned and is
    /// removed afterwards, whatever the outcome.
    pub async fn transcribe_youtube(&self, request: &InvocationRequest) -> Result<TranscriptRecord> {
        let audio = self.youtube.download(&request.target).await?;
        let media = audio.media().clone();

        let outcome = self.invoke(request, &media).await;
        audio.close();

        let mut record = outcome?;
        enrich(&mut record, &media);

        Ok(record)
    }

    /// Build a provider client from the key alone
    pub fn check_api_key(&self, request: &InvocationRequest) -> Result<()> {
        self.factory.connect(&request.api_key, &request.model)?;
        Ok(())
    }

    async fn invoke(&self, request: &InvocationRequest, media: &AcquiredMedia) -> Result<TranscriptRecord> {
        let transcriber = self.factory.connect(&request.api_key, &request.model)?;

        tracing::info!(
            file = %media.local_path.display(),
            language = %request.language,
            model = %request.model,
            "Starting transcription"
        );
        let progress = crate::utils::spinner("Transcribing...");

        let outcome = transcriber
            .transcribe(&media.local_path, &request.language, &request.prompt)
            .await;

        progress.finish_and_clear();

        let record = outcome?;
        tracing::info!(chars = record.text().map(str::len).unwrap_or(0), "Transcription completed");

        Ok(record)
    }
}

/// Add file metadata and provenance to a transcript
pub fn enrich(record: &mut TranscriptRecord, media: &AcquiredMedia) {
    record.insert("file_name", media.file_name());
    record.insert("file_size_mb", crate::utils::bytes_to_mb(media.size_bytes));

    if let Some(url) = &media.original_url {
        record.insert("source", "youtube");
        record.insert("youtube_url", url.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CommandKind;
    use serde_json::json;
    use std::path::PathBuf;

    fn request(command: CommandKind, target: &str) -> InvocationRequest {
        InvocationRequest {
            command,
            target: target.to_string(),
            api_key: "gsk_test_key".to_string(),
            language: "es".to_string(),
            model: "whisper-large-v3-turbo".to_string(),
            prompt: String::new(),
        }
    }

    fn record(value: Value) -> TranscriptRecord {
        match value {
            Value::Object(fields) => TranscriptRecord::new(fields),
            _ => panic!("record must be an object"),
        }
    }

    #[test]
    fn test_enrich_local_file() {
        let mut transcript = record(json!({"text": "hola"}));
        let media = AcquiredMedia {
            local_path: PathBuf::from("/data/entrevista.wav"),
            original_url: None,
            size_bytes: 3 * 1024 * 1024,
        };

        enrich(&mut transcript, &media);

        assert_eq!(transcript.get("file_name"), Some(&json!("entrevista.wav")));
        assert_eq!(transcript.get("file_size_mb"), Some(&json!(3.0)));
        assert_eq!(transcript.get("source"), None);
        assert_eq!(transcript.get("youtube_url"), None);
        assert_eq!(transcript.text(), Some("hola"));
    }

    #[test]
    fn test_enrich_youtube_download() {
        let mut transcript = record(json!({"text": "hi"}));
        let media = AcquiredMedia {
            local_path: PathBuf::from("/tmp/transcriptor-x/Talk.mp3"),
            original_url: Some("https://youtu.be/abc".to_string()),
            size_bytes: 512 * 1024,
        };

        enrich(&mut transcript, &media);

        assert_eq!(transcript.get("file_size_mb"), Some(&json!(0.5)));
        assert_eq!(transcript.get("source"), Some(&json!("youtube")));
        assert_eq!(transcript.get("youtube_url"), Some(&json!("https://youtu.be/abc")));
    }

    #[tokio::test]
    async fn test_missing_file_never_reaches_provider() {
        let mut factory = MockTranscriberFactory::new();
        factory.expect_connect().times(0);

        let pipeline = TranscriptionPipeline::new(&Config::default(), Box::new(factory));
        let err = pipeline
            .transcribe_file(&request(CommandKind::Transcribe, "/no/such/audio.wav"))
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "FileNotFound");
    }

    #[tokio::test]
    async fn test_transcribe_file_passes_parameters_and_enriches() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("nota.wav");
        fs_err::write(&audio, vec![1u8; 1024]).unwrap();

        let mut transcriber = MockTranscriber::new();
        let expected_path = audio.clone();
        transcriber
            .expect_transcribe()
            .withf(move |path, language, prompt| path == expected_path && language == "en" && prompt == "names")
            .times(1)
            .returning(|_, _, _| Ok(record(json!({"text": "hello", "duration": 1.5}))));

        let mut factory = MockTranscriberFactory::new();
        factory
            .expect_connect()
            .withf(|key, model| key == "gsk_test_key" && model == "base")
            .times(1)
            .return_once(move |_, _| Ok(Box::new(transcriber) as Box<dyn Transcriber>));

        let mut req = request(CommandKind::Transcribe, &audio.to_string_lossy());
        req.language = "en".to_string();
        req.model = "base".to_string();
        req.prompt = "names".to_string();

        let pipeline = TranscriptionPipeline::new(&Config::default(), Box::new(factory));
        let transcript = pipeline.transcribe_file(&req).await.unwrap();

        assert_eq!(transcript.text(), Some("hello"));
        assert_eq!(transcript.get("duration"), Some(&json!(1.5)));
        assert_eq!(transcript.get("file_name"), Some(&json!("nota.wav")));
        assert_eq!(transcript.get("file_size_mb"), Some(&json!(1.0 / 1024.0)));
    }

    #[tokio::test]
    async fn test_provider_errors_pass_through_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("nota.mp3");
        fs_err::write(&audio, b"ID3").unwrap();

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().times(1).returning(|_, _, _| {
            Err(ProviderError::Provider {
                status: 503,
                message: "over capacity".to_string(),
            })
        });

        let mut factory = MockTranscriberFactory::new();
        factory
            .expect_connect()
            .return_once(move |_, _| Ok(Box::new(transcriber) as Box<dyn Transcriber>));

        let pipeline = TranscriptionPipeline::new(&Config::default(), Box::new(factory));
        let err = pipeline
            .transcribe_file(&request(CommandKind::Transcribe, &audio.to_string_lossy()))
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "ProviderError");
        assert_eq!(err.to_string(), "Provider error (HTTP 503): over capacity");
    }

    #[test]
    fn test_check_api_key_reports_construction_failure() {
        let mut factory = MockTranscriberFactory::new();
        factory
            .expect_connect()
            .returning(|_, _| Err(ProviderError::InvalidApiKey("API key is empty".to_string())));

        let pipeline = TranscriptionPipeline::new(&Config::default(), Box::new(factory));
        let err = pipeline
            .check_api_key(&request(CommandKind::TestApiKey, ""))
            .unwrap_err();

        assert_eq!(err.error_type(), "InvalidApiKey");
    }

    #[tokio::test]
    async fn test_youtube_download_failure_never_builds_client() {
        let parent = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.downloader.program = "transcriptor-test-no-such-yt-dlp".to_string();
        config.app.temp_dir = Some(parent.path().to_path_buf());

        let mut factory = MockTranscriberFactory::new();
        factory.expect_connect().times(0);

        let pipeline = TranscriptionPipeline::new(&config, Box::new(factory));
        let err = pipeline
            .transcribe_youtube(&request(CommandKind::YouTube, "https://www.youtube.com/watch?v=abc"))
            .await
            .unwrap_err();

        assert_eq!(err.error_type(), "ToolNotInstalled");
        assert_eq!(fs_err::read_dir(parent.path()).unwrap().count(), 0);
    }
}
