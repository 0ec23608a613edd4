//! Narration synthesis subcommand.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use shorts_pipeline::narration::{self, RestSpeechConfig, RestSpeechProvider};

#[derive(Args)]
pub struct NarrateCommand {
    /// Input text file
    #[arg(long = "in")]
    input: PathBuf,

    /// Output WAV path
    #[arg(long = "out")]
    output: PathBuf,

    /// Prebuilt voice name
    #[arg(long, default_value = "Sadachbia")]
    voice: String,

    /// Reading tone woven into the request
    #[arg(long, default_value = "a warm and friendly tone")]
    tone: String,

    /// Text-to-speech endpoint
    #[arg(long, env = "SPEECH_API_ENDPOINT")]
    endpoint: String,

    /// Text-to-speech API key
    #[arg(long, env = "SPEECH_API_KEY", hide_env_values = true)]
    api_key: String,
}

impl NarrateCommand {
    pub fn run(self) -> Result<()> {
        let raw = fs::read_to_string(&self.input)
            .with_context(|| format!("reading {}", self.input.display()))?;
        let text = format!("Read aloud in {}:\n{}", self.tone, raw.trim());

        let provider =
            RestSpeechProvider::new(RestSpeechConfig::new(self.endpoint.clone(), self.api_key.clone()))
                .context("setting up speech provider")?;

        let written = narration::synthesize_narration(&provider, &text, &self.voice, &self.output)?;
        println!("Saved narration to {}", written.display());
        Ok(())
    }
}
