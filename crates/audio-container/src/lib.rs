//! PCM audio container framing.
//!
//! Speech back-ends return raw PCM payloads tagged with a loose
//! `audio/L16;rate=24000`-style parameter string. This crate decodes that
//! string into a [`PcmDescriptor`] and frames the payload in a fixed 44-byte
//! RIFF/WAVE header. Encoding is pure and deterministic: identical inputs
//! always produce byte-identical output.

use serde::{Deserialize, Serialize};

/// Size of the RIFF/WAVE/fmt/data header preceding the payload.
pub const WAV_HEADER_LEN: usize = 44;

/// Declared encoding of a raw PCM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmDescriptor {
    pub sample_rate_hz: u32,
    pub bits_per_sample: u16,
    pub channel_count: u16,
}

impl Default for PcmDescriptor {
    fn default() -> Self {
        Self {
            sample_rate_hz: 24_000,
            bits_per_sample: 16,
            channel_count: 1,
        }
    }
}

impl PcmDescriptor {
    /// Decode encoding parameters from a free-text MIME-style string.
    ///
    /// Tokens are `;`-separated, trimmed, and matched case-insensitively:
    /// `rate=<N>` sets the sample rate and `audio/l<bits>` sets the bit
    /// depth. A token whose value fails to parse keeps the prior setting;
    /// unrecognized tokens are ignored. The channel count is never carried by
    /// the string and stays at 1.
    #[must_use]
    pub fn from_mime(params: &str) -> Self {
        let mut descriptor = Self::default();

        for token in params.split(';') {
            let token = token.trim().to_ascii_lowercase();
            if let Some(value) = token.strip_prefix("rate=") {
                if let Ok(rate) = value.trim().parse::<u32>() {
                    descriptor.sample_rate_hz = rate;
                }
            } else if let Some(value) = token.strip_prefix("audio/l") {
                if let Ok(bits) = value.trim().parse::<u16>() {
                    descriptor.bits_per_sample = bits;
                }
            }
        }

        descriptor
    }

    /// Bytes per sample frame across all channels.
    #[must_use]
    pub fn block_align(&self) -> u16 {
        self.channel_count * (self.bits_per_sample / 8)
    }

    /// Bytes of payload per second of audio.
    #[must_use]
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate_hz * u32::from(self.block_align())
    }
}

/// Frame raw PCM payload bytes in a RIFF/WAVE container.
///
/// Produces the fixed 44-byte header followed by the payload unmodified. All
/// multi-byte header fields are little-endian.
#[must_use]
pub fn encode_wav(payload: &[u8], descriptor: &PcmDescriptor) -> Vec<u8> {
    let data_len = payload.len() as u32;
    let mut out = Vec::with_capacity(WAV_HEADER_LEN + payload.len());

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // integer PCM
    out.extend_from_slice(&descriptor.channel_count.to_le_bytes());
    out.extend_from_slice(&descriptor.sample_rate_hz.to_le_bytes());
    out.extend_from_slice(&descriptor.byte_rate().to_le_bytes());
    out.extend_from_slice(&descriptor.block_align().to_le_bytes());
    out.extend_from_slice(&descriptor.bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(payload);

    out
}
