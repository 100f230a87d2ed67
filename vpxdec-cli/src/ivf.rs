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

//! Minimal IVF demuxer for VP8/VP9 elementary streams.

use std::io::{self, Read};
use thiserror::Error;
use vpxdec::CodecId;

const SIGNATURE: &[u8; 4] = b"DKIF";
const HEADER_LEN: usize = 32;
const FRAME_HEADER_LEN: usize = 12;
const MAX_PREALLOC: u32 = 1 << 20;

#[derive(Error, Debug)]
pub enum IvfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Not an IVF file")]
    BadSignature,

    #[error("Unsupported IVF header size {0}")]
    HeaderSize(u16),

    #[error("Truncated IVF frame {0}")]
    Truncated(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IvfHeader {
    pub fourcc: [u8; 4],
    pub width: u16,
    pub height: u16,
    pub rate: u32,
    pub scale: u32,
    pub frame_count: u32,
}

impl IvfHeader {
    pub fn codec(&self) -> Option<CodecId> {
        match &self.fourcc {
            b"VP80" => Some(CodecId::Vp8),
            b"VP90" => Some(CodecId::Vp9),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IvfFrame {
    pub pts: u64,
    pub data: Vec<u8>,
}

pub struct IvfReader<R> {
    reader: R,
    header: IvfHeader,
    frames_read: u64,
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

impl<R: Read> IvfReader<R> {
    pub fn new(mut reader: R) -> Result<Self, IvfError> {
        let mut header = [0u8; HEADER_LEN];
        reader.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => IvfError::BadSignature,
            _ => IvfError::Io(e),
        })?;
        if &header[0..4] != SIGNATURE {
            return Err(IvfError::BadSignature);
        }
        let header_len = u16_at(&header, 6);
        if header_len as usize != HEADER_LEN {
            return Err(IvfError::HeaderSize(header_len));
        }
        let mut fourcc = [0u8; 4];
        fourcc.copy_from_slice(&header[8..12]);
        Ok(Self {
            reader,
            header: IvfHeader {
                fourcc,
                width: u16_at(&header, 12),
                height: u16_at(&header, 14),
                rate: u32_at(&header, 16),
                scale: u32_at(&header, 20),
                frame_count: u32_at(&header, 24),
            },
            frames_read: 0,
        })
    }

    pub fn header(&self) -> &IvfHeader {
        &self.header
    }

    /// Reads the next frame, or `None` at a clean end of file.
    pub fn next_frame(&mut self) -> Result<Option<IvfFrame>, IvfError> {
        let mut frame_header = [0u8; FRAME_HEADER_LEN];
        let mut filled = 0;
        while filled < FRAME_HEADER_LEN {
            match self.reader.read(&mut frame_header[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < FRAME_HEADER_LEN {
            return Err(IvfError::Truncated(self.frames_read));
        }

        let size = u32_at(&frame_header, 0);
        let pts = u64::from_le_bytes(frame_header[4..12].try_into().unwrap_or_default());
        // The declared size is untrusted; grow the buffer only as bytes arrive.
        let mut data = Vec::with_capacity(size.min(MAX_PREALLOC) as usize);
        let read = (&mut self.reader).take(u64::from(size)).read_to_end(&mut data)?;
        if read < size as usize {
            return Err(IvfError::Truncated(self.frames_read));
        }
        self.frames_read += 1;
        Ok(Some(IvfFrame { pts, data }))
    }
}
