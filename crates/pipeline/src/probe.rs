//! Media duration probing via `ffprobe`.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("failed to run ffprobe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffprobe failed: {0}")]
    CommandFailed(String),

    #[error("unreadable ffprobe output: {0}")]
    BadOutput(String),
}

/// Duration of a media file in seconds, read from `ffprobe` JSON output.
pub fn media_duration(path: &Path) -> Result<f64, ProbeError> {
    if !path.exists() {
        return Err(ProbeError::FileNotFound(path.display().to_string()));
    }

    debug!("probing duration: {}", path.display());

    let output = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::CommandFailed(stderr.trim().to_string()));
    }

    let json: Value =
        serde_json::from_slice(&output.stdout).map_err(|e| ProbeError::BadOutput(e.to_string()))?;
    parse_duration(&json)
}

/// Extract `format.duration` (a decimal string) from probe JSON.
fn parse_duration(json: &Value) -> Result<f64, ProbeError> {
    json.get("format")
        .and_then(|format| format.get("duration"))
        .and_then(Value::as_str)
        .and_then(|duration| duration.parse::<f64>().ok())
        .ok_or_else(|| ProbeError::BadOutput("no format.duration field".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_duration() {
        let json = json!({"format": {"duration": "57.112000", "format_name": "mp3"}});
        let duration = parse_duration(&json).expect("duration present");
        assert!((duration - 57.112).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_missing_field() {
        let json = json!({"format": {"format_name": "mp3"}});
        assert!(matches!(
            parse_duration(&json),
            Err(ProbeError::BadOutput(_))
        ));
    }

    #[test]
    fn test_missing_file_is_rejected_without_spawning() {
        let err = media_duration(Path::new("/nonexistent/audio.mp3")).expect_err("missing file");
        assert!(matches!(err, ProbeError::FileNotFound(_)));
    }
}
