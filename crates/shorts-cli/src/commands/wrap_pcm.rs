//! Raw-PCM wrapping subcommand.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use audio_container::{encode_wav, PcmDescriptor};
use clap::Args;

#[derive(Args)]
pub struct WrapPcmCommand {
    /// Raw PCM input file
    #[arg(long = "in")]
    input: PathBuf,

    /// Output WAV path
    #[arg(long = "out")]
    output: PathBuf,

    /// Encoding parameter string
    #[arg(long, default_value = "audio/L16;rate=24000")]
    mime: String,
}

impl WrapPcmCommand {
    pub fn run(self) -> Result<()> {
        let payload = fs::read(&self.input)
            .with_context(|| format!("reading {}", self.input.display()))?;

        let descriptor = PcmDescriptor::from_mime(&self.mime);
        let wav = encode_wav(&payload, &descriptor);

        fs::write(&self.output, wav)
            .with_context(|| format!("writing {}", self.output.display()))?;
        println!(
            "Wrapped {} PCM byte(s) at {} Hz / {}-bit into {}",
            payload.len(),
            descriptor.sample_rate_hz,
            descriptor.bits_per_sample,
            self.output.display()
        );
        Ok(())
    }
}
