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

//! The host side of the adapter: stream dimensions, output pixel format and
//! frame allocation.

use crate::error::{DecoderError, Result};
use crate::image::{OutputFormat, VideoFrame};

/// Default row alignment for allocated planes.
pub const DEFAULT_ALIGN: usize = 32;

/// Services the decoder needs from the media pipeline it is plugged into.
pub trait FrameHost {
    /// Dimensions the host currently expects frames to have.
    fn dimensions(&self) -> (u32, u32);

    /// Announces new stream dimensions. Called before allocating the first
    /// frame at the new size.
    fn set_dimensions(&mut self, width: u32, height: u32) -> Result<()>;

    fn pixel_format(&self) -> Option<OutputFormat>;

    /// Fixes the output pixel format for the stream.
    fn set_pixel_format(&mut self, format: OutputFormat);

    /// Provides a frame of the current pixel format and dimensions.
    fn allocate_frame(&mut self) -> Result<VideoFrame>;
}

/// Rejects empty images and ones whose padded area would overflow.
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    let padded = (u64::from(width) + 128) * (u64::from(height) + 128);
    if width == 0 || height == 0 || padded >= (i32::MAX / 8) as u64 {
        return Err(DecoderError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// In-memory host that allocates padded, top-down frames.
#[derive(Debug, Clone)]
pub struct StreamContext {
    width: u32,
    height: u32,
    pixel_format: Option<OutputFormat>,
    align: usize,
    dimension_changes: u64,
}

impl Default for StreamContext {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl StreamContext {
    /// A context expecting `width`x`height` frames, as declared by the container.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_format: None,
            align: DEFAULT_ALIGN,
            dimension_changes: 0,
        }
    }

    pub fn with_align(mut self, align: usize) -> Self {
        self.align = align.max(1);
        self
    }

    /// Number of accepted `set_dimensions` calls.
    pub fn dimension_changes(&self) -> u64 {
        self.dimension_changes
    }
}

impl FrameHost for StreamContext {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_dimensions(&mut self, width: u32, height: u32) -> Result<()> {
        check_dimensions(width, height)?;
        self.width = width;
        self.height = height;
        self.dimension_changes += 1;
        Ok(())
    }

    fn pixel_format(&self) -> Option<OutputFormat> {
        self.pixel_format
    }

    fn set_pixel_format(&mut self, format: OutputFormat) {
        self.pixel_format = Some(format);
    }

    fn allocate_frame(&mut self) -> Result<VideoFrame> {
        let format = self
            .pixel_format
            .ok_or_else(|| DecoderError::Allocation("no pixel format selected".to_string()))?;
        if self.width == 0 || self.height == 0 {
            return Err(DecoderError::Allocation(format!(
                "cannot allocate a {}x{} frame",
                self.width, self.height
            )));
        }
        Ok(VideoFrame::new(format, self.width, self.height, self.align))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_needs_format_and_size() {
        let mut host = StreamContext::new(16, 16);
        assert!(matches!(host.allocate_frame(), Err(DecoderError::Allocation(_))));
        host.set_pixel_format(OutputFormat::Yuva420p);
        let frame = host.allocate_frame().unwrap();
        assert_eq!(frame.planes.len(), 4);
        assert_eq!((frame.width, frame.height), (16, 16));

        let mut empty = StreamContext::default();
        empty.set_pixel_format(OutputFormat::Yuv420p);
        assert!(empty.allocate_frame().is_err());
    }

    #[test]
    fn set_dimensions_validates_and_counts() {
        let mut host = StreamContext::new(16, 16);
        host.set_dimensions(32, 8).unwrap();
        assert_eq!(host.dimensions(), (32, 8));
        assert_eq!(host.dimension_changes(), 1);
        assert!(host.set_dimensions(0, 8).is_err());
        assert!(host.set_dimensions(100_000, 100_000).is_err());
        assert_eq!(host.dimensions(), (32, 8));
        assert_eq!(host.dimension_changes(), 1);
    }

    #[test]
    fn alignment_is_applied_to_strides() {
        let mut host = StreamContext::new(10, 4).with_align(64);
        host.set_pixel_format(OutputFormat::Yuv420p);
        let frame = host.allocate_frame().unwrap();
        assert!(frame.planes.iter().all(|p| p.stride == 64));
    }
}
