//! Scene asset generation with retry, backoff, and graceful substitution.
//!
//! One visual asset is generated per scene prompt, in scene order. All
//! generation back-ends share a single rate ceiling, so scenes are paced with
//! a fixed gap and throttled attempts back off exponentially. A scene that
//! exhausts its attempt budget reuses the previous scene's asset instead of
//! failing the whole run.

pub mod rest;

use std::path::PathBuf;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shorts_common::{Clock, ProviderError, SystemClock};
use thiserror::Error;
use tracing::{debug, info, warn};

static OVERLAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[TEXT:\s*([^\]]+)\]").expect("overlay pattern"));
static NUMBERING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("numbering pattern"));

/// Reference to a generated, persisted visual asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef(pub PathBuf);

/// One scene's generation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenePrompt {
    pub index: usize,
    /// Visual description handed to the image back-end.
    pub visual: String,
    /// Overlay text extracted from a `[TEXT: ...]` annotation.
    pub overlay: Option<String>,
}

impl ScenePrompt {
    /// Parse a planner output line into a prompt.
    ///
    /// Strips any leading list numbering. At most one `[TEXT: ...]`
    /// annotation is honored per line (the first); every bracket occurrence
    /// is removed from the visual text.
    #[must_use]
    pub fn parse(index: usize, line: &str) -> Self {
        let line = NUMBERING_RE.replace(line.trim(), "");

        let overlay = OVERLAY_RE
            .captures(&line)
            .map(|captures| captures[1].trim().to_string())
            .filter(|text| !text.is_empty());
        let visual = OVERLAY_RE.replace_all(&line, "").trim().to_string();

        Self {
            index,
            visual,
            overlay,
        }
    }
}

/// Generation pacing and retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Attempts per scene before giving up on it.
    pub max_attempts: u32,
    /// First backoff delay; doubles after each further throttled attempt.
    pub base_delay: Duration,
    /// Fixed pause before every scene after the first.
    pub scene_gap: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(10),
            scene_gap: Duration::from_secs(3),
        }
    }
}

/// Backoff schedule: `base * 2^(attempt-1)` for 1-based attempts.
#[must_use]
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exponent)
}

/// Outcome of a single generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    RateLimited,
    OtherFailure(String),
}

/// Record of one attempt against the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAttempt {
    pub scene_index: usize,
    /// 1-based attempt number within the scene.
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
}

/// One filled slot of the generated sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneAsset {
    pub scene_index: usize,
    pub reference: AssetRef,
    /// Copied from the previous scene after this scene's budget ran out.
    pub substituted: bool,
}

/// Ordered scene assets. Entries hold resolved references, never links: a
/// substituted slot stores a copy of the earlier slot's reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSequence {
    entries: Vec<SceneAsset>,
}

impl AssetSequence {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[SceneAsset] {
        &self.entries
    }

    #[must_use]
    pub fn substituted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.substituted).count()
    }

    /// References in scene order.
    pub fn references(&self) -> impl Iterator<Item = &AssetRef> {
        self.entries.iter().map(|e| &e.reference)
    }
}

/// Asset generation back-end. Implementations persist the artifact and
/// return a reference to it.
pub trait AssetProvider {
    fn generate(&self, prompt: &ScenePrompt) -> Result<AssetRef, ProviderError>;
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Every scene exhausted its budget with nothing to substitute.
    #[error("no assets generated ({} attempts recorded)", .attempts.len())]
    NoAssetsGenerated { attempts: Vec<AssetAttempt> },

    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),
}

/// Generates one asset per scene with backoff and substitution.
pub struct AssetGenerator {
    provider: Box<dyn AssetProvider>,
    clock: Box<dyn Clock>,
    config: GeneratorConfig,
}

impl AssetGenerator {
    #[must_use]
    pub fn new(provider: Box<dyn AssetProvider>, config: GeneratorConfig) -> Self {
        Self::with_clock(provider, config, Box::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(
        provider: Box<dyn AssetProvider>,
        config: GeneratorConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    /// Generate one asset per prompt, in prompt order.
    ///
    /// A throttled attempt backs off and retries up to the configured budget;
    /// any other failure stops the scene immediately. A scene whose budget
    /// runs out copies the previous scene's reference when one exists. Scenes
    /// that fail before the first success have nothing to copy and are left
    /// out of the sequence; if nothing succeeds at all the whole operation
    /// fails with the attempt log.
    pub fn generate(&self, prompts: &[ScenePrompt]) -> Result<AssetSequence, GenerationError> {
        if self.config.max_attempts == 0 {
            return Err(GenerationError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if prompts.is_empty() {
            return Ok(AssetSequence::default());
        }

        let mut slots: Vec<Option<AssetRef>> = vec![None; prompts.len()];
        let mut substituted = vec![false; prompts.len()];
        let mut attempts = Vec::new();

        for (scene, prompt) in prompts.iter().enumerate() {
            if scene > 0 {
                // Shared rate ceiling across scenes, independent of retry backoff.
                self.clock.sleep(self.config.scene_gap);
            }
            debug!("generating asset for scene {}", scene);

            for attempt in 1..=self.config.max_attempts {
                match self.provider.generate(prompt) {
                    Ok(reference) => {
                        attempts.push(AssetAttempt {
                            scene_index: scene,
                            attempt_number: attempt,
                            outcome: AttemptOutcome::Success,
                        });
                        info!("scene {}: asset ready after {} attempt(s)", scene, attempt);
                        slots[scene] = Some(reference);
                        break;
                    }
                    Err(ProviderError::RateLimited(detail)) => {
                        attempts.push(AssetAttempt {
                            scene_index: scene,
                            attempt_number: attempt,
                            outcome: AttemptOutcome::RateLimited,
                        });
                        if attempt < self.config.max_attempts {
                            let delay = backoff_delay(self.config.base_delay, attempt);
                            warn!(
                                "scene {}: rate limited ({}), retrying in {:?} (attempt {}/{})",
                                scene, detail, delay, attempt, self.config.max_attempts
                            );
                            self.clock.sleep(delay);
                        } else {
                            warn!(
                                "scene {}: rate limited on final attempt ({})",
                                scene, detail
                            );
                        }
                    }
                    Err(err) => {
                        attempts.push(AssetAttempt {
                            scene_index: scene,
                            attempt_number: attempt,
                            outcome: AttemptOutcome::OtherFailure(err.to_string()),
                        });
                        warn!("scene {}: generation failed without retry: {}", scene, err);
                        break;
                    }
                }
            }

            if slots[scene].is_none() {
                if scene > 0 && slots[scene - 1].is_some() {
                    slots[scene] = slots[scene - 1].clone();
                    substituted[scene] = true;
                    info!("scene {}: substituting previous scene's asset", scene);
                }
                // A scene before the first success has nothing to copy.
            }
        }

        if slots.iter().all(Option::is_none) {
            return Err(GenerationError::NoAssetsGenerated { attempts });
        }

        let entries = slots
            .into_iter()
            .enumerate()
            .filter_map(|(scene_index, slot)| {
                slot.map(|reference| SceneAsset {
                    scene_index,
                    reference,
                    substituted: substituted[scene_index],
                })
            })
            .collect();

        Ok(AssetSequence { entries })
    }
}
