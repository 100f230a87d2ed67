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

//! Alpha resolution for YUVA sessions.
//!
//! A packet without block-additional side data decodes like a color-only
//! packet and gets a fully opaque alpha plane. A packet with side data drives
//! both engines and composites the alpha engine's luma into plane 3.

use crate::assembler::{assemble, check_format, decode_color, decode_error, decode_plain};
use crate::config::AlphaDimensionPolicy;
use crate::engine::DecoderEngine;
use crate::error::{DecoderError, EngineRole, Result};
use crate::host::FrameHost;
use crate::image::{
    copy_plane, fill_plane, FramePlane, Image, OutputFormat, VideoFrame, ALPHA_PLANE, OPAQUE_ALPHA,
};
use crate::packet::Packet;
use crate::session::DecodeOutput;

fn alpha_plane(frame: &mut VideoFrame) -> Result<&mut FramePlane> {
    frame
        .plane_mut(ALPHA_PLANE)
        .ok_or_else(|| DecoderError::PlaneBounds("output frame has no alpha plane".to_string()))
}

/// Sets every row of the alpha plane to fully opaque.
pub(crate) fn fill_opaque(frame: &mut VideoFrame) -> Result<()> {
    let rows = frame.height as usize;
    fill_plane(alpha_plane(frame)?, OPAQUE_ALPHA, rows)
}

/// Compares the alpha image with the dimensions the host now expects, which
/// the color image has just set.
fn check_alpha_dimensions<H: FrameHost>(
    host: &H,
    alpha: &Image<'_>,
    policy: AlphaDimensionPolicy,
) -> Result<bool> {
    let (width, height) = host.dimensions();
    if alpha.dimensions() == (width, height) {
        return Ok(true);
    }
    match policy {
        AlphaDimensionPolicy::Strict => Err(DecoderError::DimensionMismatch {
            width,
            height,
            alpha_width: alpha.width,
            alpha_height: alpha.height,
        }),
        AlphaDimensionPolicy::Permissive => {
            log::warn!(
                "alpha dimension mismatch! color {width}x{height}, alpha {}x{}",
                alpha.width,
                alpha.height
            );
            Ok(false)
        }
    }
}

/// Copies the alpha image's luma into plane 3, using the color image's width
/// and row count.
fn composite_alpha(frame: &mut VideoFrame, color: &Image<'_>, alpha: &Image<'_>, matched: bool) -> Result<()> {
    let (bwidth, rows) = OutputFormat::Yuva420p.plane_size(ALPHA_PLANE, color.width, color.height);
    log::debug!("Alpha decoder: bwidth {bwidth}");
    let plane = alpha_plane(frame)?;
    if matched {
        return copy_plane(plane, alpha.luma(), bwidth, rows);
    }
    let all_rows = plane.rows;
    fill_plane(plane, OPAQUE_ALPHA, all_rows)?;
    copy_plane(
        plane,
        alpha.luma(),
        bwidth.min(alpha.width as usize),
        rows.min(alpha.height as usize),
    )
}

/// One packet through a YUVA session.
pub(crate) fn decode_alpha<E, H>(
    color: &mut E,
    alpha: &mut E,
    host: &mut H,
    packet: &Packet,
    policy: AlphaDimensionPolicy,
) -> Result<DecodeOutput>
where
    E: DecoderEngine,
    H: FrameHost,
{
    let Some(bitstream) = packet.alpha_bitstream() else {
        let mut output = decode_plain(color, host, packet)?;
        if let Some(frame) = output.frame.as_mut() {
            log::debug!("Alpha decoder: got YUV image without alpha");
            fill_opaque(frame)?;
        }
        return Ok(output);
    };

    let decoded = decode_color(color, host, &packet.data)?;
    let bitstream = bitstream?;
    alpha
        .feed(bitstream)
        .map_err(|e| decode_error(EngineRole::Alpha, e))?;
    let alpha_image = alpha.next_image();

    let Some(decoded) = decoded else {
        log::debug!("Alpha decoder: color engine produced no image");
        return Ok(DecodeOutput::empty(packet.size()));
    };

    let frame = match alpha_image {
        Some(alpha_image) => {
            check_format(EngineRole::Alpha, &alpha_image)?;
            let matched = check_alpha_dimensions(host, &alpha_image, policy)?;
            let mut frame = assemble(host, &decoded.image)?;
            composite_alpha(&mut frame, &decoded.image, &alpha_image, matched)?;
            frame
        }
        None => {
            log::warn!("Alpha decoder: alpha engine produced no image, using opaque alpha");
            let mut frame = assemble(host, &decoded.image)?;
            fill_opaque(&mut frame)?;
            frame
        }
    };

    Ok(DecodeOutput {
        frame: Some(frame),
        bytes_consumed: packet.size(),
        dimensions_changed: decoded.dimensions_changed,
    })
}
