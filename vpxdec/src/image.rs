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

//! Planar image types: the transient images engines hand out, the output
//! frames the host allocates, and the row-wise copy primitives between them.

use crate::error::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Sample value written to alpha planes that have no alpha bitstream behind them.
pub const OPAQUE_ALPHA: u8 = 0xFF;

/// Index of the alpha plane in a four-plane frame.
pub const ALPHA_PLANE: usize = 3;

/// Pixel layout tag reported by an engine for a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Planar 8-bit 4:2:0, the only layout this adapter composites.
    I420,
    /// Anything else, carrying the engine's raw format code.
    Other(u32),
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::I420 => f.write_str("I420"),
            ImageFormat::Other(code) => write!(f, "{code}"),
        }
    }
}

/// Pixel format of the frames handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Yuv420p,
    Yuva420p,
}

impl OutputFormat {
    pub fn plane_count(&self) -> usize {
        match self {
            OutputFormat::Yuv420p => 3,
            OutputFormat::Yuva420p => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, OutputFormat::Yuva420p)
    }

    /// Bytes per row and number of rows of `plane` for a `width`x`height` image.
    pub fn plane_size(&self, plane: usize, width: u32, height: u32) -> (usize, usize) {
        i420_plane_size(plane, width, height)
    }
}

/// Luma and alpha are full size; chroma is halved in both directions, rounding up.
fn i420_plane_size(plane: usize, width: u32, height: u32) -> (usize, usize) {
    let (w, h) = (width as usize, height as usize);
    match plane {
        1 | 2 => (w.div_ceil(2), h.div_ceil(2)),
        _ => (w, h),
    }
}

/// Byte range of `width` bytes of row `row`, where row 0 starts at `offset`
/// and each following row is `stride` bytes away (negative for bottom-up).
fn row_range(len: usize, offset: usize, stride: isize, row: usize, width: usize) -> Option<Range<usize>> {
    let start = (offset as isize).checked_add((row as isize).checked_mul(stride)?)?;
    if start < 0 {
        return None;
    }
    let start = start as usize;
    let end = start.checked_add(width)?;
    (end <= len).then_some(start..end)
}

/// A borrowed plane of an engine-owned image.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    pub data: &'a [u8],
    /// Position of row 0 within `data`.
    pub offset: usize,
    pub stride: isize,
}

impl<'a> PlaneView<'a> {
    /// A top-down plane whose first row starts at the beginning of `data`.
    pub fn new(data: &'a [u8], stride: usize) -> Self {
        Self {
            data,
            offset: 0,
            stride: stride as isize,
        }
    }

    pub fn empty() -> Self {
        Self {
            data: &[],
            offset: 0,
            stride: 0,
        }
    }

    pub fn row(&self, row: usize, width: usize) -> Option<&'a [u8]> {
        let data = self.data;
        row_range(data.len(), self.offset, self.stride, row, width).map(|range| &data[range])
    }
}

/// A decoded image as returned by an engine. Only valid until the engine is
/// fed again, which the borrow enforces.
#[derive(Debug, Clone, Copy)]
pub struct Image<'a> {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub planes: [PlaneView<'a>; 3],
}

impl Image<'_> {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn luma(&self) -> &PlaneView<'_> {
        &self.planes[0]
    }
}

/// One plane of an output frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlane {
    pub data: Vec<u8>,
    pub offset: usize,
    pub stride: isize,
    /// Meaningful bytes per row; `|stride|` may be larger.
    pub width: usize,
    pub rows: usize,
}

impl FramePlane {
    /// Allocates a zeroed plane with the stride rounded up to `align` bytes.
    /// A bottom-up plane stores row 0 last and walks backwards.
    pub fn new(width: usize, rows: usize, align: usize, bottom_up: bool) -> Self {
        let align = align.max(1);
        let stride = width.div_ceil(align) * align;
        let data = vec![0u8; stride * rows];
        if bottom_up {
            Self {
                data,
                offset: stride * rows.saturating_sub(1),
                stride: -(stride as isize),
                width,
                rows,
            }
        } else {
            Self {
                data,
                offset: 0,
                stride: stride as isize,
                width,
                rows,
            }
        }
    }

    /// The full `|stride|` bytes of `row`, padding included.
    pub fn line(&self, row: usize) -> Option<&[u8]> {
        let span = self.stride.unsigned_abs();
        row_range(self.data.len(), self.offset, self.stride, row, span).map(|r| &self.data[r])
    }

    pub fn line_mut(&mut self, row: usize) -> Option<&mut [u8]> {
        let span = self.stride.unsigned_abs();
        row_range(self.data.len(), self.offset, self.stride, row, span).map(|r| &mut self.data[r])
    }

    /// The `width` meaningful bytes of `row`.
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        row_range(self.data.len(), self.offset, self.stride, row, self.width).map(|r| &self.data[r])
    }
}

/// A frame allocated by the host and filled by the decoder. Ownership passes
/// to the caller once decoding succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub planes: Vec<FramePlane>,
}

impl VideoFrame {
    pub fn new(format: OutputFormat, width: u32, height: u32, align: usize) -> Self {
        let planes = (0..format.plane_count())
            .map(|plane| {
                let (w, h) = format.plane_size(plane, width, height);
                FramePlane::new(w, h, align, false)
            })
            .collect();
        Self {
            format,
            width,
            height,
            planes,
        }
    }

    pub fn plane(&self, plane: usize) -> Option<&FramePlane> {
        self.planes.get(plane)
    }

    pub fn plane_mut(&mut self, plane: usize) -> Option<&mut FramePlane> {
        self.planes.get_mut(plane)
    }

    pub fn alpha(&self) -> Option<&FramePlane> {
        if self.format.has_alpha() {
            self.planes.get(ALPHA_PLANE)
        } else {
            None
        }
    }

    /// Planes concatenated with the stride padding removed.
    pub fn to_packed(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for plane in &self.planes {
            for row in 0..plane.rows {
                if let Some(bytes) = plane.row(row) {
                    out.extend_from_slice(bytes);
                }
            }
        }
        out
    }
}

/// Copies `rows` rows of `byte_width` bytes from `src` into `dst`, each side
/// advancing by its own stride.
pub fn copy_plane(dst: &mut FramePlane, src: &PlaneView<'_>, byte_width: usize, rows: usize) -> Result<()> {
    for row in 0..rows {
        let from = src.row(row, byte_width).ok_or_else(|| {
            DecoderError::PlaneBounds(format!("source row {row} shorter than {byte_width} bytes"))
        })?;
        let to = dst
            .line_mut(row)
            .and_then(|line| line.get_mut(..byte_width))
            .ok_or_else(|| {
                DecoderError::PlaneBounds(format!("destination row {row} shorter than {byte_width} bytes"))
            })?;
        to.copy_from_slice(from);
    }
    Ok(())
}

/// Sets every byte of the first `rows` lines of `dst` to `value`, covering
/// the whole `|stride|` of each line.
pub fn fill_plane(dst: &mut FramePlane, value: u8, rows: usize) -> Result<()> {
    for row in 0..rows {
        dst.line_mut(row)
            .ok_or_else(|| DecoderError::PlaneBounds(format!("destination row {row} out of range")))?
            .fill(value);
    }
    Ok(())
}

/// Copies the three color planes of an I420 image into the first three
/// planes of `dst`.
pub fn copy_image(dst: &mut VideoFrame, src: &Image<'_>) -> Result<()> {
    for (index, view) in src.planes.iter().enumerate() {
        let (byte_width, rows) = i420_plane_size(index, src.width, src.height);
        let plane = dst
            .plane_mut(index)
            .ok_or_else(|| DecoderError::PlaneBounds(format!("output frame has no plane {index}")))?;
        copy_plane(plane, view, byte_width, rows)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_planes_round_up_odd_dimensions() {
        let format = OutputFormat::Yuva420p;
        assert_eq!(format.plane_size(0, 33, 17), (33, 17));
        assert_eq!(format.plane_size(1, 33, 17), (17, 9));
        assert_eq!(format.plane_size(2, 33, 17), (17, 9));
        assert_eq!(format.plane_size(3, 33, 17), (33, 17));
    }

    #[test]
    fn frame_planes_are_padded_to_alignment() {
        let frame = VideoFrame::new(OutputFormat::Yuv420p, 20, 10, 32);
        assert_eq!(frame.planes.len(), 3);
        assert_eq!(frame.planes[0].stride, 32);
        assert_eq!(frame.planes[1].stride, 32);
        assert_eq!(frame.planes[1].rows, 5);
        assert!(frame.alpha().is_none());
    }

    #[test]
    fn copy_plane_respects_both_strides() {
        // 3x2 source with a stride of 5.
        let src_bytes = [1, 2, 3, 0, 0, 4, 5, 6];
        let src = PlaneView::new(&src_bytes, 5);
        let mut dst = FramePlane::new(3, 2, 8, false);
        copy_plane(&mut dst, &src, 3, 2).unwrap();
        assert_eq!(dst.row(0).unwrap(), &[1, 2, 3]);
        assert_eq!(dst.row(1).unwrap(), &[4, 5, 6]);
        assert_eq!(&dst.data[3..8], &[0; 5]);
    }

    #[test]
    fn bottom_up_plane_stores_first_row_last() {
        let src_bytes = [7u8; 4];
        let other = [9u8; 4];
        let mut dst = FramePlane::new(4, 2, 4, true);
        assert_eq!(dst.stride, -4);
        copy_plane(&mut dst, &PlaneView::new(&src_bytes, 4), 4, 1).unwrap();
        assert_eq!(&dst.data[4..8], &src_bytes);
        assert_eq!(&dst.data[0..4], &[0; 4]);
        dst.line_mut(1).unwrap().copy_from_slice(&other);
        assert_eq!(&dst.data[0..4], &other);
    }

    #[test]
    fn fill_plane_covers_padding() {
        let mut dst = FramePlane::new(3, 2, 16, true);
        fill_plane(&mut dst, OPAQUE_ALPHA, 2).unwrap();
        assert!(dst.data.iter().all(|&b| b == OPAQUE_ALPHA));
    }

    #[test]
    fn short_source_is_reported_not_read_past() {
        let src_bytes = [1u8; 6];
        let mut dst = FramePlane::new(4, 2, 4, false);
        let err = copy_plane(&mut dst, &PlaneView::new(&src_bytes, 4), 4, 2).unwrap_err();
        assert!(matches!(err, DecoderError::PlaneBounds(_)));
    }

    #[test]
    fn packed_output_drops_padding() {
        let mut frame = VideoFrame::new(OutputFormat::Yuv420p, 2, 2, 16);
        fill_plane(frame.plane_mut(0).unwrap(), 1, 2).unwrap();
        fill_plane(frame.plane_mut(1).unwrap(), 2, 1).unwrap();
        fill_plane(frame.plane_mut(2).unwrap(), 3, 1).unwrap();
        assert_eq!(frame.to_packed(), vec![1, 1, 1, 1, 2, 3]);
    }
}
