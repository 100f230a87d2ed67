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

//! A libvpx decode adapter that turns coded VP8/VP9 packets into planar
//! YUV420 frames, or YUVA420 frames when the alpha channel travels as a
//! second bitstream in the packet's side data.

mod alpha;
mod assembler;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod image;
pub mod packet;
pub mod registry;
pub mod session;

pub use config::{AlphaDimensionPolicy, DecoderConfig};
pub use error::{DecoderError, EngineRole, ErrorCode, Result};
pub use host::{FrameHost, StreamContext};
pub use image::{Image, ImageFormat, OutputFormat, PlaneView, VideoFrame};
pub use packet::{Packet, SideData, SideDataKind};
pub use registry::{CodecId, DecoderDescriptor};
pub use session::{DecodeOutput, Session};
