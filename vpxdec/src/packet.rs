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

//! Coded packets and the side data the demuxer attaches to them.

use crate::error::{DecoderError, Result};

/// Bytes preceding the alpha bitstream inside a block-additional payload.
/// They hold the big-endian BlockAddID of the additional block.
pub const ALPHA_HEADER_LEN: usize = 8;

/// BlockAddID used for the alpha channel of VP8/VP9 in Matroska/WebM.
pub const ALPHA_BLOCK_ADD_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideDataKind {
    /// Matroska BlockAdditional data, which carries the alpha bitstream.
    BlockAdditional,
    Other(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideData {
    pub kind: SideDataKind,
    pub data: Vec<u8>,
}

/// One coded packet as split out by the demuxer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
    pub side_data: Vec<SideData>,
}

impl Packet {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            side_data: Vec::new(),
        }
    }

    /// Packet whose block-additional side data wraps `alpha` behind the
    /// standard header.
    pub fn with_alpha(data: Vec<u8>, alpha: &[u8]) -> Self {
        let mut payload = Vec::with_capacity(ALPHA_HEADER_LEN + alpha.len());
        payload.extend_from_slice(&ALPHA_BLOCK_ADD_ID.to_be_bytes());
        payload.extend_from_slice(alpha);
        Self {
            data,
            side_data: vec![SideData {
                kind: SideDataKind::BlockAdditional,
                data: payload,
            }],
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn side_data(&self, kind: SideDataKind) -> Option<&[u8]> {
        self.side_data
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.data.as_slice())
    }

    /// The alpha bitstream carried by this packet, if any, with the
    /// block-additional header stripped.
    pub fn alpha_bitstream(&self) -> Option<Result<&[u8]>> {
        self.side_data(SideDataKind::BlockAdditional)
            .map(strip_alpha_header)
    }
}

pub fn strip_alpha_header(payload: &[u8]) -> Result<&[u8]> {
    payload
        .get(ALPHA_HEADER_LEN..)
        .ok_or(DecoderError::TruncatedSideData(payload.len()))
}
