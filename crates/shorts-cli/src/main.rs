//! Shorts assembly CLI.
//!
//! Command-line surface over the assembly pipeline: full video generation,
//! transcript resolution, narration synthesis, and raw-PCM wrapping.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::generate::GenerateCommand;
use commands::narrate::NarrateCommand;
use commands::transcript::TranscriptCommand;
use commands::wrap_pcm::WrapPcmCommand;

#[derive(Parser)]
#[command(
    name = "shorts",
    version,
    about = "Assemble short narrated videos from generative back-ends",
    long_about = "Chains transcript resolution, scene prompt planning, image \
                  generation, and muxing into short vertical videos.\n\
                  External tools used: yt-dlp (captions), a whisper-style CLI \
                  (transcription), ffprobe/ffmpeg (duration probe and muxing)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: narration audio in, short vertical video out
    Generate(GenerateCommand),

    /// Resolve a transcript for a remote source and print it
    Transcript(TranscriptCommand),

    /// Synthesize narration audio from a text file
    Narrate(NarrateCommand),

    /// Wrap a raw PCM payload in a WAV container
    WrapPcm(WrapPcmCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate(cmd) => cmd.run(),
        Commands::Transcript(cmd) => cmd.run(),
        Commands::Narrate(cmd) => cmd.run(),
        Commands::WrapPcm(cmd) => cmd.run(),
    }
}
