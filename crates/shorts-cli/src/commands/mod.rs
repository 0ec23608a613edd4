//! Subcommand implementations.

pub mod generate;
pub mod narrate;
pub mod transcript;
pub mod wrap_pcm;
