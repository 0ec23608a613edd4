//! REST image-generation adapter.
//!
//! Posts the visual prompt to an image endpoint and stores the returned
//! bytes under the configured frames directory. HTTP failures are classified
//! through the shared status table.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use shorts_common::{classify_http_status, ProviderError};
use tracing::debug;

use crate::{AssetProvider, AssetRef, ScenePrompt};

/// Settings for the image-generation endpoint.
#[derive(Debug, Clone)]
pub struct RestImageConfig {
    /// Endpoint accepting a JSON prompt and answering with raw image bytes.
    pub endpoint: String,
    pub api_key: String,
    /// Output aspect ratio, e.g. "9:16".
    pub aspect_ratio: String,
    /// Directory that receives `frame_<index>.png` files.
    pub output_dir: PathBuf,
    pub timeout: Duration,
}

impl RestImageConfig {
    #[must_use]
    pub fn new(endpoint: String, api_key: String, output_dir: PathBuf) -> Self {
        Self {
            endpoint,
            api_key,
            aspect_ratio: "9:16".to_string(),
            output_dir,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Generates one image per prompt over HTTP and stores it on disk.
pub struct RestImageProvider {
    config: RestImageConfig,
    client: reqwest::blocking::Client,
}

impl RestImageProvider {
    pub fn new(config: RestImageConfig) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Fatal(format!("http client setup failed: {e}")))?;
        Ok(Self { config, client })
    }
}

impl AssetProvider for RestImageProvider {
    fn generate(&self, prompt: &ScenePrompt) -> Result<AssetRef, ProviderError> {
        debug!(
            "requesting image for scene {} ({} prompt chars)",
            prompt.index,
            prompt.visual.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "prompt": prompt.visual,
                "aspect_ratio": self.config.aspect_ratio,
                "sample_count": 1,
            }))
            .send()
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::Transient(format!("image endpoint unreachable: {e}"))
                } else {
                    ProviderError::Fatal(format!("image request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_http_status(status.as_u16(), &body));
        }

        let bytes = response
            .bytes()
            .map_err(|e| ProviderError::Transient(format!("image body read failed: {e}")))?;

        fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            ProviderError::Fatal(format!(
                "cannot create {}: {e}",
                self.config.output_dir.display()
            ))
        })?;
        let path = self
            .config
            .output_dir
            .join(format!("frame_{:03}.png", prompt.index));
        fs::write(&path, &bytes)
            .map_err(|e| ProviderError::Fatal(format!("cannot write {}: {e}", path.display())))?;

        Ok(AssetRef(path))
    }
}
