//! Transcript resolution subcommand.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use serde_json::json;
use transcript::ytdlp::{YtDlpConfig, YtDlpProvider};
use transcript::{AcquisitionStrategy, TranscriptResolver};

#[derive(Args)]
pub struct TranscriptCommand {
    /// Source URL or id
    source: String,

    /// Caption languages tried first
    #[arg(long, value_delimiter = ',', default_value = "en")]
    languages: Vec<String>,

    /// Caption languages tried after the preferred ones
    #[arg(long, value_delimiter = ',')]
    fallback_languages: Vec<String>,

    /// Auto-caption language; defaults to the first preferred language
    #[arg(long)]
    auto_language: Option<String>,

    /// Transcription model tried as the last resort
    #[arg(long, env = "WHISPER_MODEL", default_value = "base")]
    model: String,

    /// Skip the transcription fallback and use captions only
    #[arg(long)]
    captions_only: bool,

    /// Write the transcript to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// yt-dlp executable
    #[arg(long, env = "YTDLP_BIN", default_value = "yt-dlp")]
    ytdlp_bin: PathBuf,

    /// whisper-style CLI executable
    #[arg(long, env = "WHISPER_BIN", default_value = "whisper-cli")]
    whisper_bin: PathBuf,

    /// Directory holding ggml-<model>.bin files
    #[arg(long, env = "WHISPER_MODEL_DIR", default_value = "models")]
    model_dir: PathBuf,

    /// Cookies file passed to yt-dlp
    #[arg(long, env = "COOKIES_FILE")]
    cookies: Option<PathBuf>,
}

impl TranscriptCommand {
    pub fn run(self) -> Result<()> {
        let provider = YtDlpProvider::new(YtDlpConfig {
            ytdlp_bin: self.ytdlp_bin.clone(),
            whisper_bin: self.whisper_bin.clone(),
            model_dir: self.model_dir.clone(),
            cookies: self.cookies.clone(),
            ..YtDlpConfig::default()
        });
        let resolver = TranscriptResolver::new(Box::new(provider));

        match resolver.resolve(&self.source, &self.strategies()) {
            Ok(result) => {
                let rendered = if self.json {
                    serde_json::to_string_pretty(&json!({
                        "text": result.text,
                        "language": result.language,
                        "strategy": result.strategy,
                    }))?
                } else {
                    result.text
                };

                match &self.output {
                    Some(path) => {
                        fs::write(path, format!("{rendered}\n"))
                            .with_context(|| format!("writing {}", path.display()))?;
                        println!("Saved transcript to {}", path.display());
                    }
                    None => println!("{rendered}"),
                }
                Ok(())
            }
            Err(failure) => {
                for (strategy, outcome) in &failure.attempted {
                    eprintln!("  {strategy}: {outcome:?}");
                }
                bail!(failure)
            }
        }
    }

    fn strategies(&self) -> Vec<AcquisitionStrategy> {
        let mut strategies = vec![AcquisitionStrategy::PreferredCaptions {
            languages: self.languages.clone(),
        }];
        if !self.fallback_languages.is_empty() {
            strategies.push(AcquisitionStrategy::FallbackCaptions {
                languages: self.fallback_languages.clone(),
            });
        }
        let auto_language = self
            .auto_language
            .clone()
            .or_else(|| self.languages.first().cloned())
            .unwrap_or_else(|| "en".to_string());
        strategies.push(AcquisitionStrategy::AutoCaptions {
            language: auto_language,
        });
        if !self.captions_only {
            strategies.push(AcquisitionStrategy::Transcription {
                model: self.model.clone(),
            });
        }
        strategies
    }
}
