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

//! Decoder sessions: the color engine, the optional alpha engine, and the
//! per-packet entry point that routes between them.

use crate::alpha::decode_alpha;
use crate::assembler::decode_plain;
use crate::config::{AlphaDimensionPolicy, DecoderConfig};
use crate::engine::{DecoderEngine, EngineConfig, EngineError, EngineFactory};
use crate::error::{DecoderError, EngineRole, Result};
use crate::host::FrameHost;
use crate::image::{OutputFormat, VideoFrame};
use crate::packet::Packet;

/// What one packet produced.
#[derive(Debug)]
pub struct DecodeOutput {
    /// The decoded frame, owned by the caller from here on.
    pub frame: Option<VideoFrame>,
    pub bytes_consumed: usize,
    /// The host was asked to resize while decoding this packet.
    pub dimensions_changed: bool,
}

impl DecodeOutput {
    pub(crate) fn empty(bytes_consumed: usize) -> Self {
        Self {
            frame: None,
            bytes_consumed,
            dimensions_changed: false,
        }
    }

    pub fn produced_frame(&self) -> bool {
        self.frame.is_some()
    }
}

fn init_error(role: EngineRole, error: EngineError) -> DecoderError {
    log::error!("Failed to initialize {role} decoder: {error}");
    DecoderError::Init {
        role,
        message: error.to_string(),
    }
}

/// A decoding session over one stream. Both engines live exactly as long as
/// the session and are released when it is closed or dropped.
pub struct Session<E: DecoderEngine> {
    color: E,
    alpha: Option<E>,
    thread_count: u32,
    alpha_dimensions: AlphaDimensionPolicy,
}

impl<E: DecoderEngine> Session<E> {
    /// Builds the engine(s) and fixes the host's output pixel format. If the
    /// alpha engine cannot be built, the color engine is released before the
    /// error is returned.
    pub fn open<F, H>(factory: &F, config: &DecoderConfig, host: &mut H) -> Result<Self>
    where
        F: EngineFactory<Engine = E>,
        H: FrameHost,
    {
        config.validate()?;
        let thread_count = config.effective_threads();
        log::info!("decoder threads {thread_count}");
        log::info!("engine version {}", factory.version());
        log::debug!("{}", factory.build_config());

        let engine_config = EngineConfig {
            threads: thread_count,
        };
        let color = factory
            .create(&engine_config)
            .map_err(|e| init_error(EngineRole::Color, e))?;
        let alpha = if config.alpha {
            log::info!("Initializing alpha decoder");
            Some(
                factory
                    .create(&engine_config)
                    .map_err(|e| init_error(EngineRole::Alpha, e))?,
            )
        } else {
            None
        };

        host.set_pixel_format(config.output_format());
        Ok(Self {
            color,
            alpha,
            thread_count,
            alpha_dimensions: config.alpha_dimensions,
        })
    }

    /// Decodes one packet. Errors abort this packet only; the session stays
    /// usable for the next one.
    pub fn decode<H: FrameHost>(&mut self, host: &mut H, packet: &Packet) -> Result<DecodeOutput> {
        match self.alpha.as_mut() {
            None => decode_plain(&mut self.color, host, packet),
            Some(alpha) => decode_alpha(&mut self.color, alpha, host, packet, self.alpha_dimensions),
        }
    }

    /// Releases the color engine, then the alpha engine if there is one.
    pub fn close(self) {
        log::debug!(
            "closing decoder session ({})",
            if self.has_alpha() { "color + alpha" } else { "color" }
        );
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.has_alpha() {
            OutputFormat::Yuva420p
        } else {
            OutputFormat::Yuv420p
        }
    }
}
