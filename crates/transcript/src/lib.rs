//! Transcript acquisition with ordered fallback strategies.
//!
//! A transcript for a remote source can come from several places: captions
//! published by the source owner, auto-generated captions, or full
//! speech-to-text transcription. Strategies are tried in caller-supplied
//! priority order against a single [`TranscriptProvider`]; the first success
//! wins, and a source-level disabled condition aborts the remaining chain.

pub mod srt;
pub mod ytdlp;

use serde::{Deserialize, Serialize};
use shorts_common::ProviderError;
use std::fmt;
use tracing::{debug, info, warn};

/// One way of obtaining transcript text, tried in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionStrategy {
    /// Captions published by the source owner, in preferred languages.
    PreferredCaptions { languages: Vec<String> },
    /// Owner captions in acceptable fallback languages.
    FallbackCaptions { languages: Vec<String> },
    /// Auto-generated captions in a single language.
    AutoCaptions { language: String },
    /// Full speech-to-text transcription with a named model.
    Transcription { model: String },
}

impl fmt::Display for AcquisitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferredCaptions { languages } => {
                write!(f, "preferred-captions[{}]", languages.join(","))
            }
            Self::FallbackCaptions { languages } => {
                write!(f, "fallback-captions[{}]", languages.join(","))
            }
            Self::AutoCaptions { language } => write!(f, "auto-captions[{language}]"),
            Self::Transcription { model } => write!(f, "transcription[{model}]"),
        }
    }
}

/// Caption or transcription payload returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub text: String,
    pub language: String,
}

/// Uniform capability over caption hosts and transcription back-ends.
pub trait TranscriptProvider {
    fn fetch(
        &self,
        source: &str,
        strategy: &AcquisitionStrategy,
    ) -> Result<CaptionTrack, ProviderError>;
}

/// A successfully resolved transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    /// The strategy that produced the text.
    pub strategy: AcquisitionStrategy,
    pub language: String,
}

/// Recorded result of one failed strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyOutcome {
    /// The requested track is missing; later strategies may still succeed.
    NotAvailable,
    /// Transcripts are switched off for the source; nothing later can
    /// succeed either.
    SourceDisabled,
    /// Failure local to this attempt (throttling, network, provider fault).
    Transient(String),
}

impl StrategyOutcome {
    /// Map a provider error into the per-strategy outcome.
    ///
    /// Only `Disabled` stops the chain. `RateLimited` and `Fatal` fold into
    /// `Transient` with the detail preserved: they say nothing about sibling
    /// strategies that use a different mechanism.
    fn from_provider(err: ProviderError) -> Self {
        match err {
            ProviderError::NotAvailable(_) => Self::NotAvailable,
            ProviderError::Disabled(_) => Self::SourceDisabled,
            ProviderError::RateLimited(detail)
            | ProviderError::Transient(detail)
            | ProviderError::Fatal(detail) => Self::Transient(detail),
        }
    }
}

/// Every strategy failed, or the source turned out to be disabled.
#[derive(Debug)]
pub struct ResolutionFailure {
    pub source: String,
    /// Each attempted strategy with its outcome, in attempt order.
    pub attempted: Vec<(AcquisitionStrategy, StrategyOutcome)>,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no transcript for '{}' after {} attempted strategies",
            self.source,
            self.attempted.len()
        )
    }
}

impl std::error::Error for ResolutionFailure {}

/// Tries acquisition strategies in order against one provider.
pub struct TranscriptResolver {
    provider: Box<dyn TranscriptProvider>,
}

impl TranscriptResolver {
    #[must_use]
    pub fn new(provider: Box<dyn TranscriptProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a transcript for `source`, trying `strategies` in order.
    ///
    /// Returns on the first success; strictly later strategies are never
    /// invoked. A [`StrategyOutcome::SourceDisabled`] outcome aborts the
    /// remaining chain. On exhaustion the failure carries every attempted
    /// `(strategy, outcome)` pair.
    pub fn resolve(
        &self,
        source: &str,
        strategies: &[AcquisitionStrategy],
    ) -> Result<Transcript, ResolutionFailure> {
        let mut attempted = Vec::with_capacity(strategies.len());

        for strategy in strategies {
            debug!("trying transcript strategy {} for {}", strategy, source);

            match self.provider.fetch(source, strategy) {
                Ok(track) => {
                    info!(
                        "resolved transcript for {} via {} ({} chars, lang={})",
                        source,
                        strategy,
                        track.text.len(),
                        track.language
                    );
                    return Ok(Transcript {
                        text: track.text,
                        strategy: strategy.clone(),
                        language: track.language,
                    });
                }
                Err(err) => {
                    let outcome = StrategyOutcome::from_provider(err);
                    warn!("strategy {} failed for {}: {:?}", strategy, source, outcome);
                    let disabled = matches!(outcome, StrategyOutcome::SourceDisabled);
                    attempted.push((strategy.clone(), outcome));
                    if disabled {
                        break;
                    }
                }
            }
        }

        Err(ResolutionFailure {
            source: source.to_string(),
            attempted,
        })
    }
}
