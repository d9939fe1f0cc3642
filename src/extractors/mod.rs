use std::path::PathBuf;

pub mod local;
pub mod youtube;

pub use local::LocalFileExtractor;
pub use youtube::{DownloadedAudio, YoutubeExtractor};

/// A local audio file ready to be handed to the transcription provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredMedia {
    /// Path of the file on disk
    pub local_path: PathBuf,

    /// URL the file was downloaded from, `None` for local input
    pub original_url: Option<String>,

    /// File size in bytes
    pub size_bytes: u64,
}

impl AcquiredMedia {
    /// Final path component, used as `file_name` in the transcript
    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Audio containers the transcription provider accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Flac,
    M4a,
    Mp3,
    Mp4,
    Mpeg,
    Mpga,
    Ogg,
    Opus,
    Wav,
    Webm,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Flac => "flac",
            AudioFormat::M4a => "m4a",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Mp4 => "mp4",
            AudioFormat::Mpeg => "mpeg",
            AudioFormat::Mpga => "mpga",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Opus => "opus",
            AudioFormat::Wav => "wav",
            AudioFormat::Webm => "webm",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "flac" => Some(AudioFormat::Flac),
            "m4a" => Some(AudioFormat::M4a),
            "mp3" => Some(AudioFormat::Mp3),
            "mp4" => Some(AudioFormat::Mp4),
            "mpeg" => Some(AudioFormat::Mpeg),
            "mpga" => Some(AudioFormat::Mpga),
            "ogg" => Some(AudioFormat::Ogg),
            "opus" => Some(AudioFormat::Opus),
            "wav" => Some(AudioFormat::Wav),
            "webm" => Some(AudioFormat::Webm),
            _ => None,
        }
    }

    /// Get MIME type for the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Flac => "audio/flac",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Mp3 | AudioFormat::Mpga => "audio/mpeg",
            AudioFormat::Mp4 => "video/mp4",
            AudioFormat::Mpeg => "video/mpeg",
            AudioFormat::Ogg | AudioFormat::Opus => "audio/ogg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Webm => "audio/webm",
        }
    }

    /// Comma separated list for error messages
    pub fn supported_list() -> &'static str {
        "flac, m4a, mp3, mp4, mpeg, mpga, ogg, opus, wav, webm"
    }
}
