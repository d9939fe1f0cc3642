use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart;
use serde_json::{Map, Value};
use std::path::Path;

use super::{ProviderError, TranscriptRecord, Transcriber, TranscriberFactory};
use crate::config::ProviderConfig;
use crate::extractors::AudioFormat;

/// Creates [`GroqTranscriber`]s for an OpenAI-compatible `/audio/transcriptions` endpoint
pub struct GroqFactory {
    base_url: String,
    response_format: String,
}

impl GroqFactory {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            response_format: config.response_format.clone(),
        }
    }
}

impl TranscriberFactory for GroqFactory {
    fn connect(&self, api_key: &str, default_model: &str) -> Result<Box<dyn Transcriber>, ProviderError> {
        let transcriber = GroqTranscriber::new(api_key, default_model, &self.base_url, &self.response_format)?;
        Ok(Box::new(transcriber))
    }
}

pub struct GroqTranscriber {
    client: reqwest::Client,
    base_url: String,
    model: String,
    response_format: String,
}

impl GroqTranscriber {
    /// Validate the key and build the HTTP client. No request is sent.
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        response_format: &str,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ProviderError::InvalidApiKey("API key is empty".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            ProviderError::InvalidApiKey(
                "API key contains characters that are not allowed in an HTTP header".to_string(),
            )
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Network(format!("client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            model: model.to_string(),
            response_format: response_format.to_string(),
        })
    }
}

#[async_trait]
impl Transcriber for GroqTranscriber {
    async fn transcribe(
        &self,
        audio: &Path,
        language: &str,
        prompt: &str,
    ) -> Result<TranscriptRecord, ProviderError> {
        let format = audio
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(AudioFormat::from_extension)
            .ok_or_else(|| {
                ProviderError::UnsupportedFile(format!(
                    "{} (supported formats: {})",
                    audio.display(),
                    AudioFormat::supported_list()
                ))
            })?;

        let audio_data = tokio::fs::read(audio)
            .await
            .map_err(|e| ProviderError::UnsupportedFile(format!("cannot read {}: {}", audio.display(), e)))?;

        if audio_data.is_empty() {
            return Err(ProviderError::UnsupportedFile(format!("{} is empty", audio.display())));
        }

        let file_name = audio
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("audio.{}", format.as_str()));

        let file_part = multipart::Part::bytes(audio_data)
            .file_name(file_name)
            .mime_str(format.mime_type())
            .map_err(|e| ProviderError::UnsupportedFile(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", self.response_format.clone())
            .part("file", file_part);

        if !language.is_empty() {
            form = form.text("language", language.to_string());
        }
        if !prompt.is_empty() {
            form = form.text("prompt", prompt.to_string());
        }

        let url = format!("{}/audio/transcriptions", self.base_url);
        tracing::debug!(%url, model = %self.model, format = format.as_str(), "Sending audio to transcription API");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(format!("body: {}", e)))?;

        if !status.is_success() {
            let message = error_message(&body);
            tracing::debug!(status = status.as_u16(), %message, "Transcription API rejected the request");

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::InvalidApiKey(message),
                code => ProviderError::Provider { status: code, message },
            });
        }

        Ok(parse_record(&body))
    }
}

/// JSON object bodies are the record; anything else becomes `{"text": ...}`.
fn parse_record(body: &str) -> TranscriptRecord {
    let text = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => return TranscriptRecord::new(fields),
        Ok(Value::String(text)) => text,
        _ => body.trim().to_string(),
    };

    let mut fields = Map::new();
    fields.insert("text".to_string(), Value::String(text));
    TranscriptRecord::new(fields)
}

/// Extract `error.message` from an OpenAI-style error body
fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let from_json = parsed.as_ref().and_then(|value| {
        value["error"]["message"]
            .as_str()
            .or_else(|| value["error"].as_str())
            .or_else(|| value["message"].as_str())
    });

    match from_json {
        Some(message) => message.to_string(),
        None if body.trim().is_empty() => "empty response".to_string(),
        None => body.trim().to_string(),
    }
}
