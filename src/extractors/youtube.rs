use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

use super::AcquiredMedia;
use crate::config::Config;
use crate::{Result, TranscriptorError};

/// YouTube audio extractor using yt-dlp
pub struct YoutubeExtractor {
    yt_dlp_path: String,
    audio_format: String,
    audio_quality: String,
    install_hint: String,
    temp_parent: Option<PathBuf>,
}

/// Downloaded audio together with the workspace that holds it.
///
/// The workspace is deleted when this value is dropped or closed, so it must be kept
/// alive until transcription has finished.
#[derive(Debug)]
pub struct DownloadedAudio {
    workspace: TempDir,
    media: AcquiredMedia,
}

impl DownloadedAudio {
    pub fn media(&self) -> &AcquiredMedia {
        &self.media
    }

    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }

    /// Remove the workspace now. Failure to delete is logged, not returned.
    pub fn close(self) {
        let path = self.workspace.path().to_path_buf();
        match self.workspace.close() {
            Ok(()) => tracing::debug!(workspace = %path.display(), "Workspace removed"),
            Err(e) => tracing::warn!(workspace = %path.display(), error = %e, "Failed to remove workspace"),
        }
    }
}

impl YoutubeExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            yt_dlp_path: config.downloader.program.clone(),
            audio_format: config.downloader.audio_format.clone(),
            audio_quality: config.downloader.audio_quality.clone(),
            install_hint: config.downloader.install_hint.clone(),
            temp_parent: config.app.temp_dir.clone(),
        }
    }

    /// Download the audio track of `url` into a fresh workspace.
    ///
    /// On any error the workspace created here is removed before returning.
    pub async fn download(&self, url: &str) -> Result<DownloadedAudio> {
        crate::utils::validate_and_normalize_url(url)?;

        let workspace = self.create_workspace()?;
        let output_template = workspace.path().join("%(title)s.%(ext)s");

        tracing::info!(%url, workspace = %workspace.path().display(), "Downloading audio with yt-dlp");
        let progress = crate::utils::spinner("Downloading audio with yt-dlp...");

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "-x",
                "--audio-format",
                self.audio_format.as_str(),
                "--audio-quality",
                self.audio_quality.as_str(),
                "--no-playlist",
                "-o",
            ])
            .arg(&output_template)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        progress.finish_and_clear();

        let output = output.map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match stderr.trim() {
                "" => format!("yt-dlp exited with {}", output.status),
                text => text.to_string(),
            };
            return Err(TranscriptorError::DownloadFailed(detail));
        }

        let audio_path = find_audio_artifact(workspace.path(), &self.audio_format)?
            .ok_or(TranscriptorError::NoAudioProduced)?;
        let size_bytes = fs_err::metadata(&audio_path)?.len();

        tracing::info!(
            file = %audio_path.display(),
            size = %crate::utils::format_file_size(size_bytes),
            "Download complete"
        );

        Ok(DownloadedAudio {
            workspace,
            media: AcquiredMedia {
                local_path: audio_path,
                original_url: Some(url.to_string()),
                size_bytes,
            },
        })
    }

    fn create_workspace(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("transcriptor-");

        let workspace = match &self.temp_parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };

        Ok(workspace)
    }

    fn spawn_error(&self, err: io::Error) -> TranscriptorError {
        if err.kind() == io::ErrorKind::NotFound {
            TranscriptorError::ToolNotInstalled {
                program: self.yt_dlp_path.clone(),
                hint: self.install_hint.clone(),
            }
        } else {
            TranscriptorError::DownloadFailed(format!("could not run {}: {}", self.yt_dlp_path, err))
        }
    }
}

/// First file in `dir` with the given extension, in directory listing order.
///
/// The listing order is platform dependent; with one download per workspace there is
/// normally a single candidate.
fn find_audio_artifact(dir: &Path, extension: &str) -> io::Result<Option<PathBuf>> {
    for entry in fs_err::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
