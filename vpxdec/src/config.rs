/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Session configuration.

use crate::error::{DecoderError, Result};
use crate::image::OutputFormat;
use crate::registry::{self, CodecId};
use serde::{Deserialize, Serialize};

/// Upper bound on the worker threads handed to an engine.
pub const MAX_THREADS: u32 = 16;

/// What to do when the alpha image and the color image disagree on size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaDimensionPolicy {
    /// Keep the color dimensions, copy the overlapping region and leave the
    /// rest of the alpha plane opaque. The alpha image's size never changes
    /// the host's dimensions.
    #[default]
    Permissive,
    /// Reject the packet.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub codec: CodecId,
    /// Requested engine threads. Clamped to `1..=MAX_THREADS` at open.
    pub thread_count: u32,
    /// Decode a second bitstream from the packet side data as alpha.
    pub alpha: bool,
    pub alpha_dimensions: AlphaDimensionPolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            codec: CodecId::Vp8,
            thread_count: 1,
            alpha: false,
            alpha_dimensions: AlphaDimensionPolicy::Permissive,
        }
    }
}

impl DecoderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DecoderError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if registry::find(self.codec, self.alpha).is_none() {
            return Err(DecoderError::InvalidConfig(format!(
                "no {:?} decoder{}",
                self.codec,
                if self.alpha { " with alpha support" } else { "" }
            )));
        }
        Ok(())
    }

    /// Thread count actually passed to the engines.
    pub fn effective_threads(&self) -> u32 {
        self.thread_count.clamp(1, MAX_THREADS)
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.alpha {
            OutputFormat::Yuva420p
        } else {
            OutputFormat::Yuv420p
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_count_is_clamped() {
        let mut config = DecoderConfig {
            thread_count: 32,
            ..Default::default()
        };
        assert_eq!(config.effective_threads(), 16);
        config.thread_count = 0;
        assert_eq!(config.effective_threads(), 1);
        config.thread_count = 8;
        assert_eq!(config.effective_threads(), 8);
    }

    #[test]
    fn alpha_selects_four_plane_output() {
        let config = DecoderConfig {
            alpha: true,
            ..Default::default()
        };
        assert_eq!(config.output_format(), OutputFormat::Yuva420p);
        assert_eq!(DecoderConfig::default().output_format(), OutputFormat::Yuv420p);
    }

    #[test]
    fn parses_partial_json() {
        let config =
            DecoderConfig::from_json(r#"{"alpha": true, "alpha_dimensions": "strict"}"#).unwrap();
        assert!(config.alpha);
        assert_eq!(config.alpha_dimensions, AlphaDimensionPolicy::Strict);
        assert_eq!(config.codec, CodecId::Vp8);
        assert_eq!(config.thread_count, 1);
    }

    #[test]
    fn rejects_vp9_alpha_and_bad_json() {
        let err = DecoderConfig::from_json(r#"{"codec": "vp9", "alpha": true}"#).unwrap_err();
        assert!(matches!(err, DecoderError::InvalidConfig(_)));
        assert!(DecoderConfig::from_json("{not json").is_err());
    }
}
