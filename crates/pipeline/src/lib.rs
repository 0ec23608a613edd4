//! Short-video assembly pipeline.
//!
//! Sequencing: transcript → scene prompts → assets → rendered video. Input
//! validation happens before any external capability is invoked, and every
//! failure is a value carrying enough context to diagnose without re-running.

pub mod narration;
pub mod planner;
pub mod probe;
pub mod render;

use std::path::{Path, PathBuf};

use scene_gen::{AssetGenerator, AssetSequence, GenerationError, ScenePrompt};
use serde::Serialize;
use shorts_common::ProviderError;
use thiserror::Error;
use tracing::info;
use transcript::{AcquisitionStrategy, ResolutionFailure, TranscriptResolver};

/// Where the transcript for prompt planning comes from.
#[derive(Debug, Clone)]
pub enum TranscriptSpec {
    /// Resolve from a remote source via the fallback chain.
    Remote {
        source: String,
        strategies: Vec<AcquisitionStrategy>,
    },
    /// Caller-supplied transcript text.
    Provided(String),
}

/// One assembly job.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Narration audio muxed under the final video.
    pub narration: PathBuf,
    /// Transcript source for scene planning.
    pub transcript: TranscriptSpec,
    /// Seconds of video per scene.
    pub scene_duration: f64,
    /// Total duration; probed from the narration audio when absent.
    pub total_duration: Option<f64>,
    /// Final video path.
    pub output: PathBuf,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineArtifacts {
    pub job_id: String,
    pub transcript: String,
    pub prompts: Vec<ScenePrompt>,
    pub assets: AssetSequence,
    pub video: PathBuf,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error("prompt planning failed: {0}")]
    Planning(#[source] ProviderError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Probe(#[from] probe::ProbeError),

    #[error(transparent)]
    Render(#[from] render::RenderError),
}

/// Number of scenes covering `total` seconds at `per_scene` seconds each.
///
/// Rejects non-positive or non-finite durations.
pub fn scene_count(total: f64, per_scene: f64) -> Result<usize, PipelineError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(PipelineError::InvalidInput(format!(
            "total duration must be positive, got {total}"
        )));
    }
    if !per_scene.is_finite() || per_scene <= 0.0 {
        return Err(PipelineError::InvalidInput(format!(
            "per-scene duration must be positive, got {per_scene}"
        )));
    }
    Ok((total / per_scene).ceil() as usize)
}

/// Prompt-planning capability: derives scene prompt lines from a transcript.
pub trait PromptPlanner {
    fn plan(&self, transcript: &str, scenes: usize) -> Result<Vec<String>, ProviderError>;
}

/// Final assembly collaborator (muxing/transcoding).
pub trait Renderer {
    fn render(
        &self,
        narration: &Path,
        assets: &AssetSequence,
        frame_duration: f64,
        output: &Path,
    ) -> Result<PathBuf, render::RenderError>;
}

/// Sequences resolver, planner, generator, and renderer for one job.
pub struct PipelineDriver {
    resolver: Option<TranscriptResolver>,
    planner: Box<dyn PromptPlanner>,
    generator: AssetGenerator,
    renderer: Box<dyn Renderer>,
}

impl PipelineDriver {
    #[must_use]
    pub fn new(
        planner: Box<dyn PromptPlanner>,
        generator: AssetGenerator,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self {
            resolver: None,
            planner,
            generator,
            renderer,
        }
    }

    /// Attach a transcript resolver for jobs with a remote transcript source.
    #[must_use]
    pub fn with_resolver(mut self, resolver: TranscriptResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run one assembly job end to end.
    pub fn run(&self, job: &JobSpec) -> Result<PipelineArtifacts, PipelineError> {
        let job_id = uuid::Uuid::new_v4().to_string();

        // Validate before touching any external capability.
        if !(job.scene_duration.is_finite() && job.scene_duration > 0.0) {
            return Err(PipelineError::InvalidInput(format!(
                "per-scene duration must be positive, got {}",
                job.scene_duration
            )));
        }
        if let Some(total) = job.total_duration {
            if !(total.is_finite() && total > 0.0) {
                return Err(PipelineError::InvalidInput(format!(
                    "total duration must be positive, got {total}"
                )));
            }
        }

        let total = match job.total_duration {
            Some(total) => total,
            None => probe::media_duration(&job.narration)?,
        };
        let scenes = scene_count(total, job.scene_duration)?;
        info!(
            "job {}: {} scene(s) over {:.2}s of narration",
            job_id, scenes, total
        );

        let transcript_text = match &job.transcript {
            TranscriptSpec::Provided(text) => text.clone(),
            TranscriptSpec::Remote { source, strategies } => {
                let resolver = self.resolver.as_ref().ok_or_else(|| {
                    PipelineError::InvalidInput(
                        "remote transcript requested but no resolver configured".to_string(),
                    )
                })?;
                resolver.resolve(source, strategies)?.text
            }
        };

        let lines = self
            .planner
            .plan(&transcript_text, scenes)
            .map_err(PipelineError::Planning)?;
        let prompts: Vec<ScenePrompt> = lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .take(scenes)
            .enumerate()
            .map(|(index, line)| ScenePrompt::parse(index, line))
            .collect();
        if prompts.is_empty() {
            return Err(PipelineError::Planning(ProviderError::Fatal(
                "planner returned no usable prompt lines".to_string(),
            )));
        }
        info!("job {}: planned {} prompt(s)", job_id, prompts.len());

        let assets = self.generator.generate(&prompts)?;
        info!(
            "job {}: {} asset(s), {} substituted",
            job_id,
            assets.len(),
            assets.substituted_count()
        );

        // Stretch the frames across the full narration, matching the audio
        // even when early scenes produced no asset.
        let frame_duration = total / assets.len() as f64;
        let video = self
            .renderer
            .render(&job.narration, &assets, frame_duration, &job.output)?;
        info!("job {}: rendered {}", job_id, video.display());

        Ok(PipelineArtifacts {
            job_id,
            transcript: transcript_text,
            prompts,
            assets,
            video,
        })
    }
}
