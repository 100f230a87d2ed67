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

//! The narrow contract consumed from a bitstream decoding engine.
//!
//! An engine is fed one coded payload at a time and then asked for at most
//! one decoded image. The image borrows the engine, so it cannot outlive the
//! next feed.

use crate::image::Image;
use std::fmt;

pub mod mock;
#[cfg(feature = "native")]
pub mod vpx;

/// Parameters every engine is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads the engine may use internally, already clamped.
    pub threads: u32,
}

/// Failure reported by an engine: its error string plus an optional detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub message: String,
    pub detail: Option<String>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

impl std::error::Error for EngineError {}

/// Length of a coded payload as the `u32` engines take.
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub(crate) fn payload_len(len: usize) -> Result<u32, EngineError> {
    u32::try_from(len)
        .map_err(|_| EngineError::new("Packet too large").with_detail(format!("{len} bytes")))
}

/// A bitstream decoder state machine. Implementations release their native
/// resources on drop.
pub trait DecoderEngine: Send {
    /// Feeds one coded payload. A failure leaves the engine usable for the
    /// next payload.
    fn feed(&mut self, data: &[u8]) -> Result<(), EngineError>;

    /// Returns the next decoded image, if the last feed produced one.
    fn next_image(&mut self) -> Option<Image<'_>>;
}

/// Builds engines for a session.
pub trait EngineFactory {
    type Engine: DecoderEngine;

    fn create(&self, config: &EngineConfig) -> Result<Self::Engine, EngineError>;

    /// Engine version string, logged when a session opens.
    fn version(&self) -> String {
        String::from("unknown")
    }

    /// Engine build configuration, logged at debug level.
    fn build_config(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_len_accepts_u32_sizes() {
        assert_eq!(payload_len(0), Ok(0));
        assert_eq!(payload_len(u32::MAX as usize), Ok(u32::MAX));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn payload_len_rejects_oversized_payloads() {
        let err = payload_len(u32::MAX as usize + 1).unwrap_err();
        assert_eq!(err.message, "Packet too large");
        assert_eq!(err.detail.as_deref(), Some("4294967296 bytes"));
    }
}
