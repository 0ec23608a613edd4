//! Shared test doubles for the integration suites.
//!
//! Scripted providers replay fixed response sequences; the recording clock
//! and renderer capture what the pipeline asked for without sleeping or
//! spawning external tools.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use scene_gen::{AssetProvider, AssetRef, AssetSequence, ScenePrompt};
use shorts_common::{Clock, ProviderError};
use shorts_pipeline::render::RenderError;
use shorts_pipeline::{PromptPlanner, Renderer};
use transcript::{AcquisitionStrategy, CaptionTrack, TranscriptProvider};

#[derive(Clone, Default)]
pub struct RecordingClock {
    pub sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

#[derive(Clone)]
pub struct ScriptedTranscripts {
    responses: Rc<RefCell<Vec<Result<CaptionTrack, ProviderError>>>>,
    pub tried: Rc<RefCell<Vec<AcquisitionStrategy>>>,
}

impl ScriptedTranscripts {
    pub fn new(responses: Vec<Result<CaptionTrack, ProviderError>>) -> Self {
        Self {
            responses: Rc::new(RefCell::new(responses)),
            tried: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl TranscriptProvider for ScriptedTranscripts {
    fn fetch(
        &self,
        _source: &str,
        strategy: &AcquisitionStrategy,
    ) -> Result<CaptionTrack, ProviderError> {
        self.tried.borrow_mut().push(strategy.clone());
        self.responses.borrow_mut().remove(0)
    }
}

#[derive(Clone)]
pub struct ScriptedAssets {
    responses: Rc<RefCell<Vec<Result<AssetRef, ProviderError>>>>,
    pub calls: Rc<RefCell<usize>>,
}

impl ScriptedAssets {
    pub fn new(responses: Vec<Result<AssetRef, ProviderError>>) -> Self {
        Self {
            responses: Rc::new(RefCell::new(responses)),
            calls: Rc::new(RefCell::new(0)),
        }
    }
}

impl AssetProvider for ScriptedAssets {
    fn generate(&self, _prompt: &ScenePrompt) -> Result<AssetRef, ProviderError> {
        *self.calls.borrow_mut() += 1;
        self.responses.borrow_mut().remove(0)
    }
}

pub struct FixedPlanner {
    pub lines: Vec<String>,
}

impl PromptPlanner for FixedPlanner {
    fn plan(&self, _transcript: &str, _scenes: usize) -> Result<Vec<String>, ProviderError> {
        Ok(self.lines.clone())
    }
}

#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub rendered: Rc<RefCell<Vec<(usize, f64)>>>,
}

impl Renderer for RecordingRenderer {
    fn render(
        &self,
        _narration: &Path,
        assets: &AssetSequence,
        frame_duration: f64,
        output: &Path,
    ) -> Result<PathBuf, RenderError> {
        self.rendered
            .borrow_mut()
            .push((assets.len(), frame_duration));
        Ok(output.to_path_buf())
    }
}

pub fn rate_limited() -> Result<AssetRef, ProviderError> {
    Err(ProviderError::RateLimited("HTTP 429: quota".to_string()))
}

pub fn asset(name: &str) -> AssetRef {
    AssetRef(PathBuf::from(name))
}

pub fn track(text: &str, language: &str) -> CaptionTrack {
    CaptionTrack {
        text: text.to_string(),
        language: language.to_string(),
    }
}
