use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::{Result, TranscriptorError};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|_| TranscriptorError::Usage(format!("Invalid URL format: {}", url)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(TranscriptorError::Usage(
            "URL must use HTTP or HTTPS protocol".to_string(),
        ));
    }

    Ok(parsed)
}

/// Size in mebibytes, as reported in `file_size_mb`
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// First `len` characters of a secret followed by an ellipsis
pub fn secret_prefix(secret: &str, len: usize) -> String {
    let prefix: String = secret.chars().take(len).collect();
    format!("{}...", prefix)
}

/// Spinner on stderr; indicatif hides it when stderr is not a terminal
pub fn spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        progress.set_style(style);
    }
    progress.set_message(message.to_string());
    progress
}
