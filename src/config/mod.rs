use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "TRANSCRIPTOR_CONFIG";
pub const API_BASE_ENV: &str = "TRANSCRIPTOR_API_BASE";
pub const YT_DLP_ENV: &str = "TRANSCRIPTOR_YT_DLP";
pub const TEMP_DIR_ENV: &str = "TRANSCRIPTOR_TEMP_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcription provider settings
    pub provider: ProviderConfig,

    /// External downloader settings
    pub downloader: DownloaderConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// `response_format` sent with every transcription request
    pub response_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Executable name or path of yt-dlp
    pub program: String,

    /// Audio format the download is transcoded to
    pub audio_format: String,

    /// yt-dlp audio quality, 0 is best
    pub audio_quality: String,

    /// Appended to the error when the program cannot be found
    pub install_hint: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Parent directory for temporary download workspaces
    pub temp_dir: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            response_format: "verbose_json".to_string(),
        }
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "0".to_string(),
            install_hint: "Install it with: brew install yt-dlp (or pip install yt-dlp)".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file (or defaults) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) if std::env::var_os(CONFIG_ENV).is_some() => {
                anyhow::bail!("config file {} does not exist", path.display())
            }
            _ => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        tracing::debug!(
            base_url = %config.provider.base_url,
            downloader = %config.downloader.program,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        dirs::config_dir().map(|dir| dir.join("transcriptor").join("config.yaml"))
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(API_BASE_ENV) {
            self.provider.base_url = base_url;
        }
        if let Some(program) = lookup(YT_DLP_ENV) {
            self.downloader.program = program;
        }
        if let Some(temp_dir) = lookup(TEMP_DIR_ENV) {
            self.app.temp_dir = Some(PathBuf::from(temp_dir));
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.downloader.program.trim().is_empty() {
            anyhow::bail!("downloader.program must not be empty");
        }

        if self.downloader.audio_format.trim().is_empty() {
            anyhow::bail!("downloader.audio_format must not be empty");
        }

        crate::utils::validate_and_normalize_url(&self.provider.base_url)
            .map_err(|e| anyhow::anyhow!("provider.base_url: {}", e))?;

        Ok(())
    }
}
