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

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Context};
use tracing::{debug, info, warn};
use vpxdec::engine::vpx::VpxFactory;
use vpxdec::{AlphaDimensionPolicy, DecoderConfig, Packet, Session, StreamContext};
use vpxdec_cli::cli_args::Decode;
use vpxdec_cli::ivf::IvfReader;

fn open_ivf(path: &Path) -> anyhow::Result<IvfReader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(IvfReader::new(BufReader::new(file))?)
}

fn build_config(args: &Decode, fourcc_codec: Option<vpxdec::CodecId>) -> anyhow::Result<DecoderConfig> {
    let mut config = match &args.config {
        Some(path) => DecoderConfig::from_json(&fs::read_to_string(path)?)?,
        None => DecoderConfig::default(),
    };
    if let Some(codec) = fourcc_codec {
        config.codec = codec;
    }
    if let Some(name) = args.decoder {
        config.codec = name.0.codec;
        config.alpha = name.0.alpha;
    }
    if args.alpha.is_some() {
        config.alpha = true;
    }
    if let Some(threads) = args.threads {
        config.thread_count = threads;
    }
    if args.strict_alpha {
        config.alpha_dimensions = AlphaDimensionPolicy::Strict;
    }
    config.validate()?;
    Ok(config)
}

pub fn decode(args: Decode) -> anyhow::Result<()> {
    let mut color = open_ivf(&args.input)?;
    let header = *color.header();
    let config = build_config(&args, header.codec())?;
    let descriptor = vpxdec::registry::find(config.codec, config.alpha)
        .ok_or_else(|| anyhow!("no decoder for {:?}", config.codec))?;
    info!(
        "decoding {} ({}x{}, {} frames) with {}",
        args.input.display(),
        header.width,
        header.height,
        header.frame_count,
        descriptor.long_name
    );

    let mut alpha = args.alpha.as_deref().map(open_ivf).transpose()?;
    let mut host = StreamContext::new(header.width.into(), header.height.into());
    let factory = VpxFactory::new(config.codec);
    let mut session = Session::open(&factory, &config, &mut host)?;
    let mut output = BufWriter::new(File::create(&args.output)?);

    let started = Instant::now();
    let (mut decoded, mut failed) = (0u64, 0u64);
    while let Some(frame) = color.next_frame()? {
        let pts = frame.pts;
        let alpha_frame = match alpha.as_mut() {
            Some(reader) => reader.next_frame()?,
            None => None,
        };
        let packet = match alpha_frame {
            Some(alpha_frame) => Packet::with_alpha(frame.data, &alpha_frame.data),
            None => Packet::new(frame.data),
        };

        match session.decode(&mut host, &packet) {
            Ok(result) => {
                if let Some(frame) = result.frame {
                    if result.dimensions_changed {
                        info!("pts {pts}: frame size is now {}x{}", frame.width, frame.height);
                    }
                    output.write_all(&frame.to_packed())?;
                    decoded += 1;
                } else {
                    debug!("pts {pts}: no frame");
                }
            }
            Err(e) => {
                warn!("pts {pts}: {e} ({:?})", e.code());
                failed += 1;
            }
        }
    }
    output.flush()?;
    session.close();

    info!(
        "wrote {decoded} {} frames to {} in {:?} ({failed} packets failed)",
        if config.alpha { "yuva420p" } else { "yuv420p" },
        args.output.display(),
        started.elapsed()
    );
    Ok(())
}
