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

//! Color-side decoding: feed the engine, pull one image, keep the host's
//! dimensions in step and copy the planes into a freshly allocated frame.

use crate::engine::{DecoderEngine, EngineError};
use crate::error::{DecoderError, EngineRole, Result};
use crate::host::FrameHost;
use crate::image::{copy_image, Image, ImageFormat, VideoFrame};
use crate::packet::Packet;
use crate::session::DecodeOutput;

/// A color image pulled from the engine, not yet copied anywhere.
pub(crate) struct DecodedColor<'a> {
    pub image: Image<'a>,
    pub dimensions_changed: bool,
}

pub(crate) fn decode_error(role: EngineRole, error: EngineError) -> DecoderError {
    log::error!("Failed to decode {role} frame: {}", error.message);
    if let Some(detail) = &error.detail {
        log::error!("  Additional information: {detail}");
    }
    DecoderError::Decode {
        role,
        message: error.message,
        detail: error.detail,
    }
}

pub(crate) fn check_format(role: EngineRole, image: &Image<'_>) -> Result<()> {
    if image.format != ImageFormat::I420 {
        log::error!("Unsupported output {role} colorspace ({})", image.format);
        return Err(DecoderError::UnsupportedFormat {
            role,
            format: image.format,
        });
    }
    Ok(())
}

/// Requests a resize from the host when the decoded size differs from what
/// it expects. Returns whether a resize happened.
fn sync_dimensions<H: FrameHost>(host: &mut H, image: &Image<'_>) -> Result<bool> {
    let (width, height) = host.dimensions();
    if image.dimensions() == (width, height) {
        return Ok(false);
    }
    log::info!(
        "dimension change! {width}x{height} -> {}x{}",
        image.width,
        image.height
    );
    host.set_dimensions(image.width, image.height)?;
    Ok(true)
}

/// Feeds `data` to the color engine and pulls at most one image from it.
pub(crate) fn decode_color<'e, E, H>(
    engine: &'e mut E,
    host: &mut H,
    data: &[u8],
) -> Result<Option<DecodedColor<'e>>>
where
    E: DecoderEngine,
    H: FrameHost,
{
    engine
        .feed(data)
        .map_err(|e| decode_error(EngineRole::Color, e))?;
    let Some(image) = engine.next_image() else {
        return Ok(None);
    };
    check_format(EngineRole::Color, &image)?;
    let dimensions_changed = sync_dimensions(host, &image)?;
    Ok(Some(DecodedColor {
        image,
        dimensions_changed,
    }))
}

/// Allocates the output frame and copies the color planes of `image` into it.
pub(crate) fn assemble<H: FrameHost>(host: &mut H, image: &Image<'_>) -> Result<VideoFrame> {
    let mut frame = host.allocate_frame()?;
    copy_image(&mut frame, image)?;
    Ok(frame)
}

/// One packet through a color-only session.
pub(crate) fn decode_plain<E, H>(engine: &mut E, host: &mut H, packet: &Packet) -> Result<DecodeOutput>
where
    E: DecoderEngine,
    H: FrameHost,
{
    let Some(decoded) = decode_color(engine, host, &packet.data)? else {
        return Ok(DecodeOutput::empty(packet.size()));
    };
    let frame = assemble(host, &decoded.image)?;
    Ok(DecodeOutput {
        frame: Some(frame),
        bytes_consumed: packet.size(),
        dimensions_changed: decoded.dimensions_changed,
    })
}
