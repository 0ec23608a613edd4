//! Caption and transcription adapter over the `yt-dlp` and whisper CLIs.
//!
//! Caption strategies shell out to `yt-dlp` for subtitle downloads (converted
//! to SRT and flattened to plain text). The transcription strategy extracts
//! the source audio with `yt-dlp -x` and runs a whisper.cpp-style CLI over
//! it. All tool failures are classified into the closed [`ProviderError`]
//! taxonomy through the table in [`classify_ytdlp_stderr`].

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use shorts_common::ProviderError;
use tracing::{debug, warn};

use crate::{srt, AcquisitionStrategy, CaptionTrack, TranscriptProvider};

/// Tool locations and scratch space for the adapter.
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    /// `yt-dlp` executable.
    pub ytdlp_bin: PathBuf,
    /// whisper.cpp-style CLI executable.
    pub whisper_bin: PathBuf,
    /// Directory holding `ggml-<model>.bin` model files.
    pub model_dir: PathBuf,
    /// Scratch directory for downloaded subtitles and audio.
    pub work_dir: PathBuf,
    /// Cookies file for restricted sources.
    pub cookies: Option<PathBuf>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            ytdlp_bin: PathBuf::from("yt-dlp"),
            whisper_bin: PathBuf::from("whisper-cli"),
            model_dir: PathBuf::from("models"),
            work_dir: std::env::temp_dir(),
            cookies: None,
        }
    }
}

/// Fetches captions with `yt-dlp`, falling back to local speech-to-text for
/// the transcription strategy.
pub struct YtDlpProvider {
    config: YtDlpConfig,
}

impl YtDlpProvider {
    #[must_use]
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    fn fetch_captions(
        &self,
        source: &str,
        languages: &[String],
        auto: bool,
    ) -> Result<CaptionTrack, ProviderError> {
        let stem = self
            .config
            .work_dir
            .join(format!("captions-{}", sanitize(source)));

        let mut cmd = Command::new(&self.config.ytdlp_bin);
        cmd.arg("--skip-download")
            .arg(if auto { "--write-auto-subs" } else { "--write-subs" })
            .arg("--sub-langs")
            .arg(languages.join(","))
            .arg("--convert-subs")
            .arg("srt")
            .arg("-o")
            .arg(&stem)
            .arg(source);
        if let Some(cookies) = &self.config.cookies {
            cmd.arg("--cookies").arg(cookies);
        }

        debug!(
            "fetching {} captions for {} (langs: {})",
            if auto { "auto" } else { "manual" },
            source,
            languages.join(",")
        );

        let output = cmd
            .output()
            .map_err(|e| ProviderError::Transient(format!("failed to run yt-dlp: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_ytdlp_stderr(&stderr));
        }

        // yt-dlp writes `<stem>.<lang>.srt` per downloaded track; take the
        // first requested language that produced one.
        for language in languages {
            let path = self
                .config
                .work_dir
                .join(format!("captions-{}.{}.srt", sanitize(source), language));
            if !path.exists() {
                continue;
            }
            let content = fs::read_to_string(&path)
                .map_err(|e| ProviderError::Transient(format!("unreadable subtitle file: {e}")))?;
            let _ = fs::remove_file(&path);

            let text = srt::flatten(&content);
            if text.is_empty() {
                warn!("subtitle track {} for {} was empty", language, source);
                continue;
            }
            return Ok(CaptionTrack {
                text,
                language: language.clone(),
            });
        }

        Err(ProviderError::NotAvailable(format!(
            "no subtitles written for languages [{}]",
            languages.join(",")
        )))
    }

    fn transcribe(&self, source: &str, model: &str) -> Result<CaptionTrack, ProviderError> {
        let audio = self.download_audio(source)?;
        let result = self.run_whisper(&audio, model);
        let _ = fs::remove_file(&audio);
        result
    }

    fn download_audio(&self, source: &str) -> Result<PathBuf, ProviderError> {
        let target = self
            .config
            .work_dir
            .join(format!("audio-{}.wav", sanitize(source)));

        let mut cmd = Command::new(&self.config.ytdlp_bin);
        cmd.arg("-x")
            .arg("--audio-format")
            .arg("wav")
            .arg("-o")
            .arg(&target)
            .arg(source);
        if let Some(cookies) = &self.config.cookies {
            cmd.arg("--cookies").arg(cookies);
        }

        debug!("downloading audio for transcription: {}", source);

        let output = cmd
            .output()
            .map_err(|e| ProviderError::Transient(format!("failed to run yt-dlp: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_ytdlp_stderr(&stderr));
        }
        if !target.exists() {
            return Err(ProviderError::Transient(
                "yt-dlp reported success but wrote no audio file".to_string(),
            ));
        }
        Ok(target)
    }

    fn run_whisper(&self, audio: &Path, model: &str) -> Result<CaptionTrack, ProviderError> {
        let model_path = self.config.model_dir.join(format!("ggml-{model}.bin"));
        if !model_path.exists() {
            return Err(ProviderError::Fatal(format!(
                "transcription model not found: {}",
                model_path.display()
            )));
        }

        let out_stem = audio.with_extension("");
        let output = Command::new(&self.config.whisper_bin)
            .arg("-m")
            .arg(&model_path)
            .arg("-f")
            .arg(audio)
            .arg("-otxt")
            .arg("-of")
            .arg(&out_stem)
            .output()
            .map_err(|e| ProviderError::Transient(format!("failed to run whisper: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Fatal(format!(
                "whisper exited with {}: {}",
                output.status,
                stderr.lines().next().unwrap_or("").trim()
            )));
        }

        let transcript_path = out_stem.with_extension("txt");
        let text = fs::read_to_string(&transcript_path)
            .map_err(|e| ProviderError::Fatal(format!("missing whisper output: {e}")))?;
        let _ = fs::remove_file(&transcript_path);

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ProviderError::NotAvailable(
                "transcription produced no text".to_string(),
            ));
        }
        // The plain-text output carries no language tag.
        Ok(CaptionTrack {
            text,
            language: "und".to_string(),
        })
    }
}

impl TranscriptProvider for YtDlpProvider {
    fn fetch(
        &self,
        source: &str,
        strategy: &AcquisitionStrategy,
    ) -> Result<CaptionTrack, ProviderError> {
        match strategy {
            AcquisitionStrategy::PreferredCaptions { languages }
            | AcquisitionStrategy::FallbackCaptions { languages } => {
                self.fetch_captions(source, languages, false)
            }
            AcquisitionStrategy::AutoCaptions { language } => {
                self.fetch_captions(source, std::slice::from_ref(language), true)
            }
            AcquisitionStrategy::Transcription { model } => self.transcribe(source, model),
        }
    }
}

/// Classify `yt-dlp` stderr into the provider error taxonomy.
///
/// | stderr contains | classification |
/// |---|---|
/// | "subtitles are disabled" | `Disabled` |
/// | "private video", "video unavailable", "has been removed" | `Disabled` |
/// | "no subtitles", "not available" | `NotAvailable` |
/// | "429", "too many requests", "rate-limit" | `RateLimited` |
/// | "timed out", "timeout", "temporary failure", "connection" | `Transient` |
/// | anything else | `Fatal` |
///
/// Source-level conditions come first: they mean no acquisition strategy can
/// succeed, while a missing track only rules out the current one.
#[must_use]
pub fn classify_ytdlp_stderr(stderr: &str) -> ProviderError {
    let lower = stderr.to_ascii_lowercase();
    let detail = stderr.lines().last().unwrap_or("").trim().to_string();

    if lower.contains("subtitles are disabled")
        || lower.contains("private video")
        || lower.contains("video unavailable")
        || lower.contains("has been removed")
    {
        ProviderError::Disabled(detail)
    } else if lower.contains("no subtitles") || lower.contains("not available") {
        ProviderError::NotAvailable(detail)
    } else if lower.contains("429")
        || lower.contains("too many requests")
        || lower.contains("rate-limit")
    {
        ProviderError::RateLimited(detail)
    } else if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("temporary failure")
        || lower.contains("connection")
    {
        ProviderError::Transient(detail)
    } else {
        ProviderError::Fatal(detail)
    }
}

fn sanitize(source: &str) -> String {
    source
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}
