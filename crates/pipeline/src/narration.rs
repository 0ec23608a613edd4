//! Narration synthesis: text → speech payload → WAV on disk.
//!
//! Speech back-ends answer with either a finished WAV container or raw PCM
//! tagged with an `audio/L16;rate=24000`-style parameter string. Raw payloads
//! are framed through the container encoder before writing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use audio_container::{encode_wav, PcmDescriptor};
use serde_json::json;
use shorts_common::{classify_http_status, ProviderError};
use thiserror::Error;
use tracing::{debug, info};

/// Synthesized audio payload with its declared encoding parameters.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub data: Vec<u8>,
    /// MIME-style parameter string, e.g. `audio/L16;rate=24000`.
    pub mime: String,
}

/// Text-to-speech capability.
pub trait SpeechProvider {
    fn synthesize(&self, text: &str, voice: &str) -> Result<SpeechAudio, ProviderError>;
}

#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(#[from] ProviderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Synthesize `text` and write a WAV file at `output`.
///
/// Payloads already carrying a WAV container are written unchanged; raw PCM
/// payloads are framed using the parameters declared in the MIME string.
pub fn synthesize_narration(
    provider: &dyn SpeechProvider,
    text: &str,
    voice: &str,
    output: &Path,
) -> Result<PathBuf, NarrationError> {
    let audio = provider.synthesize(text, voice)?;
    debug!(
        "received {} byte(s) of '{}' audio",
        audio.data.len(),
        audio.mime
    );

    let already_wav = audio.mime.trim().to_ascii_lowercase().starts_with("audio/wav")
        || audio.data.starts_with(b"RIFF");
    let bytes = if already_wav {
        audio.data
    } else {
        encode_wav(&audio.data, &PcmDescriptor::from_mime(&audio.mime))
    };

    fs::write(output, &bytes)?;
    info!("narration written to {}", output.display());
    Ok(output.to_path_buf())
}

/// Settings for the text-to-speech endpoint.
#[derive(Debug, Clone)]
pub struct RestSpeechConfig {
    /// Endpoint accepting `{"text", "voice"}` and answering audio bytes with
    /// the encoding declared in `Content-Type`.
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl RestSpeechConfig {
    #[must_use]
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(120),
        }
    }
}

/// REST text-to-speech adapter.
pub struct RestSpeechProvider {
    config: RestSpeechConfig,
    client: reqwest::blocking::Client,
}

impl RestSpeechProvider {
    pub fn new(config: RestSpeechConfig) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Fatal(format!("http client setup failed: {e}")))?;
        Ok(Self { config, client })
    }
}

impl SpeechProvider for RestSpeechProvider {
    fn synthesize(&self, text: &str, voice: &str) -> Result<SpeechAudio, ProviderError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "text": text, "voice": voice }))
            .send()
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::Transient(format!("speech endpoint unreachable: {e}"))
                } else {
                    ProviderError::Fatal(format!("speech request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_http_status(status.as_u16(), &body));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("audio/L16;rate=24000")
            .to_string();
        let data = response
            .bytes()
            .map_err(|e| ProviderError::Transient(format!("speech body read failed: {e}")))?
            .to_vec();

        if data.is_empty() {
            return Err(ProviderError::NotAvailable(
                "speech endpoint returned no audio".to_string(),
            ));
        }
        Ok(SpeechAudio { data, mime })
    }
}
