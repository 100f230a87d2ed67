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

//! Static decoder table. Each entry names a decoder variant the host can ask
//! for; engine instances are created per session and never stored here.

use crate::config::DecoderConfig;
use serde::{Deserialize, Serialize};

/// Compressed bitstream families the adapter can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecId {
    Vp8,
    Vp9,
}

/// Capability flags advertised to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The engine picks its own worker count up to the configured limit.
    pub auto_threads: bool,
    /// Output frames come from the host's buffer provider.
    pub direct_rendering: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderDescriptor {
    pub name: &'static str,
    pub long_name: &'static str,
    pub codec: CodecId,
    /// Composites a side-channel alpha bitstream into YUVA420 output.
    pub alpha: bool,
    pub capabilities: Capabilities,
}

impl DecoderDescriptor {
    /// Session configuration selecting this decoder.
    pub fn config(&self, thread_count: u32) -> DecoderConfig {
        DecoderConfig {
            codec: self.codec,
            thread_count,
            alpha: self.alpha,
            ..DecoderConfig::default()
        }
    }
}

const CAPABILITIES: Capabilities = Capabilities {
    auto_threads: true,
    direct_rendering: true,
};

static DECODERS: [DecoderDescriptor; 3] = [
    DecoderDescriptor {
        name: "libvpx",
        long_name: "libvpx VP8",
        codec: CodecId::Vp8,
        alpha: false,
        capabilities: CAPABILITIES,
    },
    DecoderDescriptor {
        name: "libvpxalpha",
        long_name: "libvpx VP8 alpha",
        codec: CodecId::Vp8,
        alpha: true,
        capabilities: CAPABILITIES,
    },
    DecoderDescriptor {
        name: "libvpx-vp9",
        long_name: "libvpx VP9",
        codec: CodecId::Vp9,
        alpha: false,
        capabilities: CAPABILITIES,
    },
];

pub fn all() -> &'static [DecoderDescriptor] {
    &DECODERS
}

pub fn find_by_name(name: &str) -> Option<&'static DecoderDescriptor> {
    DECODERS.iter().find(|d| d.name == name)
}

pub fn find(codec: CodecId, alpha: bool) -> Option<&'static DecoderDescriptor> {
    DECODERS
        .iter()
        .find(|d| d.codec == codec && d.alpha == alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, a) in all().iter().enumerate() {
            for b in &all()[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn alpha_variant_exists_only_for_vp8() {
        assert_eq!(find(CodecId::Vp8, true).unwrap().name, "libvpxalpha");
        assert!(find(CodecId::Vp9, true).is_none());
        assert_eq!(find(CodecId::Vp9, false).unwrap().long_name, "libvpx VP9");
    }

    #[test]
    fn descriptor_builds_matching_config() {
        let config = find_by_name("libvpxalpha").unwrap().config(4);
        assert!(config.alpha);
        assert_eq!(config.codec, CodecId::Vp8);
        assert_eq!(config.thread_count, 4);
        assert!(find_by_name("libaom").is_none());
    }
}
