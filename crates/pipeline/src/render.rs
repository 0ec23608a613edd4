//! Slideshow rendering via the `ffmpeg` CLI.
//!
//! The asset frames are listed in a concat-demuxer script, each shown for a
//! fixed duration, then muxed with the narration audio into an H.264/AAC
//! video. `-shortest` bounds the video to the narration length.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use scene_gen::AssetSequence;
use thiserror::Error;
use tracing::info;

use crate::Renderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to render: empty asset sequence")]
    NoAssets,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ffmpeg failed: {0}")]
    FfmpegFailed(String),
}

/// Muxes asset frames and narration with the `ffmpeg` concat demuxer.
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    pub fps: u32,
}

impl Default for FfmpegRenderer {
    fn default() -> Self {
        Self { fps: 24 }
    }
}

/// Build the concat-demuxer script for the frame list.
///
/// The demuxer requires the final entry to be repeated without a duration
/// for the last frame's duration to take effect.
fn build_concat_script(assets: &AssetSequence, frame_duration: f64) -> String {
    let mut script = String::from("ffconcat version 1.0\n");
    for asset in assets.entries() {
        script.push_str(&format!(
            "file '{}'\nduration {frame_duration}\n",
            asset.reference.0.display()
        ));
    }
    if let Some(last) = assets.entries().last() {
        script.push_str(&format!("file '{}'\n", last.reference.0.display()));
    }
    script
}

impl Renderer for FfmpegRenderer {
    fn render(
        &self,
        narration: &Path,
        assets: &AssetSequence,
        frame_duration: f64,
        output: &Path,
    ) -> Result<PathBuf, RenderError> {
        if assets.is_empty() {
            return Err(RenderError::NoAssets);
        }

        let script_path = output.with_extension("frames.txt");
        fs::write(&script_path, build_concat_script(assets, frame_duration))?;

        let result = Command::new("ffmpeg")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(&script_path)
            .arg("-i")
            .arg(narration)
            .arg("-c:v")
            .arg("libx264")
            .arg("-r")
            .arg(self.fps.to_string())
            .arg("-pix_fmt")
            .arg("yuv420p")
            .arg("-c:a")
            .arg("aac")
            .arg("-shortest")
            .arg("-y")
            .arg(output)
            .output();
        let _ = fs::remove_file(&script_path);

        let result = result?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(RenderError::FfmpegFailed(
                stderr.lines().last().unwrap_or("").trim().to_string(),
            ));
        }
        if !output.exists() {
            return Err(RenderError::FfmpegFailed(
                "output file was not created".to_string(),
            ));
        }

        info!(
            "rendered {} frame(s) into {}",
            assets.len(),
            output.display()
        );
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_gen::{AssetGenerator, AssetProvider, AssetRef, GeneratorConfig, ScenePrompt};
    use shorts_common::{Clock, ProviderError};
    use std::time::Duration;

    struct NullClock;

    impl Clock for NullClock {
        fn sleep(&self, _duration: Duration) {}
    }

    struct NamedProvider;

    impl AssetProvider for NamedProvider {
        fn generate(&self, prompt: &ScenePrompt) -> Result<AssetRef, ProviderError> {
            Ok(AssetRef(PathBuf::from(format!(
                "frames/frame_{:03}.png",
                prompt.index
            ))))
        }
    }

    fn sequence(scenes: usize) -> AssetSequence {
        let prompts: Vec<ScenePrompt> = (0..scenes)
            .map(|index| ScenePrompt {
                index,
                visual: String::new(),
                overlay: None,
            })
            .collect();
        AssetGenerator::with_clock(
            Box::new(NamedProvider),
            GeneratorConfig::default(),
            Box::new(NullClock),
        )
        .generate(&prompts)
        .expect("all scenes succeed")
    }

    #[test]
    fn test_concat_script_lists_every_frame() {
        let script = build_concat_script(&sequence(2), 5.0);
        assert_eq!(
            script,
            "ffconcat version 1.0\n\
             file 'frames/frame_000.png'\nduration 5\n\
             file 'frames/frame_001.png'\nduration 5\n\
             file 'frames/frame_001.png'\n"
        );
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let renderer = FfmpegRenderer::default();
        let result = renderer.render(
            Path::new("narration.mp3"),
            &AssetSequence::default(),
            5.0,
            Path::new("out.mp4"),
        );
        assert!(matches!(result, Err(RenderError::NoAssets)));
    }
}
