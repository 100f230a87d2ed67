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

//! Error types shared by every decode stage.

use crate::image::ImageFormat;
use std::fmt;
use thiserror::Error;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Which of the two engines in a session an error or log line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineRole {
    Color,
    Alpha,
}

impl fmt::Display for EngineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineRole::Color => f.write_str("color"),
            EngineRole::Alpha => f.write_str("alpha"),
        }
    }
}

/// Coarse classification handed back to the host alongside an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The coded data (or its side payload) could not be decoded.
    InvalidData,
    /// The engine produced a pixel layout this adapter does not handle.
    Unsupported,
    /// The host could not provide an output frame.
    OutOfResources,
    /// The session could not be configured or its engines built.
    InvalidConfig,
}

/// Errors that can occur while opening a session or decoding a packet
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecoderError {
    #[error("Failed to initialize {role} decoder: {message}")]
    Init { role: EngineRole, message: String },

    #[error("Failed to decode {role} frame: {message}{}", detail_suffix(.detail))]
    Decode {
        role: EngineRole,
        message: String,
        detail: Option<String>,
    },

    #[error("Unsupported output {role} colorspace ({format})")]
    UnsupportedFormat { role: EngineRole, format: ImageFormat },

    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Alpha image is {alpha_width}x{alpha_height} but color image is {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        alpha_width: u32,
        alpha_height: u32,
    },

    #[error("Alpha side data too short: {0} bytes")]
    TruncatedSideData(usize),

    #[error("Frame allocation failed: {0}")]
    Allocation(String),

    #[error("Plane copy out of bounds: {0}")]
    PlaneBounds(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(" ({detail})"),
        None => String::new(),
    }
}

impl DecoderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DecoderError::Decode { .. }
            | DecoderError::InvalidDimensions { .. }
            | DecoderError::DimensionMismatch { .. }
            | DecoderError::TruncatedSideData(_)
            | DecoderError::PlaneBounds(_) => ErrorCode::InvalidData,
            DecoderError::UnsupportedFormat { .. } => ErrorCode::Unsupported,
            DecoderError::Allocation(_) => ErrorCode::OutOfResources,
            DecoderError::Init { .. } | DecoderError::InvalidConfig(_) => ErrorCode::InvalidConfig,
        }
    }

    /// True when the error prevents the session from existing at all. Every
    /// other error only aborts the packet being decoded.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DecoderError::Init { .. } | DecoderError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_carries_detail_in_message() {
        let err = DecoderError::Decode {
            role: EngineRole::Alpha,
            message: "Bitstream not supported by this decoder".to_string(),
            detail: Some("Invalid frame header".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode alpha frame: Bitstream not supported by this decoder (Invalid frame header)"
        );
        assert_eq!(err.code(), ErrorCode::InvalidData);
        assert!(!err.is_fatal());
    }

    #[test]
    fn codes_distinguish_data_format_and_allocation() {
        let unsupported = DecoderError::UnsupportedFormat {
            role: EngineRole::Color,
            format: ImageFormat::Other(0x106),
        };
        assert_eq!(unsupported.code(), ErrorCode::Unsupported);
        assert_eq!(
            DecoderError::Allocation("no buffer".into()).code(),
            ErrorCode::OutOfResources
        );
        let init = DecoderError::Init {
            role: EngineRole::Color,
            message: "oops".into(),
        };
        assert_eq!(init.code(), ErrorCode::InvalidConfig);
        assert!(init.is_fatal());
    }
}
