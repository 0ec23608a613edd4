//! Full pipeline: narration audio in, short vertical video out.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use scene_gen::rest::{RestImageConfig, RestImageProvider};
use scene_gen::{AssetGenerator, GeneratorConfig};
use shorts_pipeline::planner::{RestPlannerConfig, RestPromptPlanner};
use shorts_pipeline::render::FfmpegRenderer;
use shorts_pipeline::{JobSpec, PipelineDriver, TranscriptSpec};
use transcript::ytdlp::{YtDlpConfig, YtDlpProvider};
use transcript::{AcquisitionStrategy, TranscriptResolver};

#[derive(Args)]
pub struct GenerateCommand {
    /// Narration audio file muxed under the final video
    #[arg(long, env = "NARRATION_FILE")]
    audio: PathBuf,

    /// Remote source (URL or id) to resolve the transcript from
    #[arg(long, env = "SOURCE_URL")]
    source: Option<String>,

    /// Transcript text file, used when no --source is given
    #[arg(long, conflicts_with = "source")]
    transcript: Option<PathBuf>,

    /// Seconds of video per scene
    #[arg(long, env = "SCENE_DURATION", default_value_t = 5.0)]
    scene_duration: f64,

    /// Total duration override; probed from the audio when omitted
    #[arg(long)]
    total_duration: Option<f64>,

    /// Output video path; a timestamped name is used when omitted
    #[arg(long, env = "OUTPUT_VIDEO")]
    output: Option<PathBuf>,

    /// Aspect ratio of generated frames
    #[arg(long, env = "ASPECT_RATIO", default_value = "9:16")]
    aspect_ratio: String,

    /// Directory receiving generated frames
    #[arg(long, default_value = "generated_frames")]
    frames_dir: PathBuf,

    /// Image generation endpoint
    #[arg(long, env = "IMAGE_API_ENDPOINT")]
    image_endpoint: String,

    /// Image generation API key
    #[arg(long, env = "IMAGE_API_KEY", hide_env_values = true)]
    image_api_key: String,

    /// Prompt planning endpoint
    #[arg(long, env = "PLANNER_API_ENDPOINT")]
    planner_endpoint: String,

    /// Prompt planning API key
    #[arg(long, env = "PLANNER_API_KEY", hide_env_values = true)]
    planner_api_key: String,

    /// Generation attempts per scene
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Caption languages tried first when resolving from --source
    #[arg(long, value_delimiter = ',', default_value = "en")]
    languages: Vec<String>,

    /// Caption languages tried after the preferred ones
    #[arg(long, value_delimiter = ',')]
    fallback_languages: Vec<String>,

    /// Transcription model tried as the last resort
    #[arg(long, env = "WHISPER_MODEL", default_value = "base")]
    model: String,

    /// Cookies file passed to yt-dlp
    #[arg(long, env = "COOKIES_FILE")]
    cookies: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl GenerateCommand {
    pub fn run(self) -> Result<()> {
        let output = self.output.clone().unwrap_or_else(default_output_name);

        let transcript_spec = match (&self.source, &self.transcript) {
            (Some(source), _) => TranscriptSpec::Remote {
                source: source.clone(),
                strategies: self.strategies(),
            },
            (None, Some(path)) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading transcript {}", path.display()))?;
                TranscriptSpec::Provided(text)
            }
            (None, None) => bail!("either --source or --transcript is required"),
        };

        let planner = RestPromptPlanner::new(RestPlannerConfig::new(
            self.planner_endpoint.clone(),
            self.planner_api_key.clone(),
        ))
        .context("setting up prompt planner")?;

        let mut image_config = RestImageConfig::new(
            self.image_endpoint.clone(),
            self.image_api_key.clone(),
            self.frames_dir.clone(),
        );
        image_config.aspect_ratio = self.aspect_ratio.clone();
        let provider = RestImageProvider::new(image_config).context("setting up image provider")?;

        let generator = AssetGenerator::new(
            Box::new(provider),
            GeneratorConfig {
                max_attempts: self.max_attempts,
                ..GeneratorConfig::default()
            },
        );

        let mut driver = PipelineDriver::new(
            Box::new(planner),
            generator,
            Box::new(FfmpegRenderer::default()),
        );
        if self.source.is_some() {
            let ytdlp = YtDlpProvider::new(YtDlpConfig {
                cookies: self.cookies.clone(),
                ..YtDlpConfig::default()
            });
            driver = driver.with_resolver(TranscriptResolver::new(Box::new(ytdlp)));
        }

        let job = JobSpec {
            narration: self.audio.clone(),
            transcript: transcript_spec,
            scene_duration: self.scene_duration,
            total_duration: self.total_duration,
            output,
        };
        let artifacts = driver.run(&job)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&artifacts)?);
        } else {
            println!("Created {}", artifacts.video.display());
            println!(
                "  scenes: {} ({} substituted)",
                artifacts.assets.len(),
                artifacts.assets.substituted_count()
            );
        }
        Ok(())
    }

    /// Strategy ladder: preferred captions, fallback captions, auto captions,
    /// then full transcription.
    fn strategies(&self) -> Vec<AcquisitionStrategy> {
        let mut strategies = vec![AcquisitionStrategy::PreferredCaptions {
            languages: self.languages.clone(),
        }];
        if !self.fallback_languages.is_empty() {
            strategies.push(AcquisitionStrategy::FallbackCaptions {
                languages: self.fallback_languages.clone(),
            });
        }
        strategies.push(AcquisitionStrategy::AutoCaptions {
            language: self
                .languages
                .first()
                .cloned()
                .unwrap_or_else(|| "en".to_string()),
        });
        strategies.push(AcquisitionStrategy::Transcription {
            model: self.model.clone(),
        });
        strategies
    }
}

fn default_output_name() -> PathBuf {
    PathBuf::from(format!(
        "shorts_{}.mp4",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}
