use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use vpxdec::{registry, DecoderDescriptor};

/// VP8/VP9 decoder
///
/// Decodes IVF elementary streams through libvpx and writes raw planar frames.
/// A second IVF file can carry the alpha channel, producing YUVA420 output.
#[derive(Parser, Debug)]
#[clap(name = "vpxdec")]
pub struct Opt {
    #[clap(subcommand)]
    pub mode: Mode,
}

/// A decoder picked from the registry by name.
#[derive(Clone, Copy, Debug)]
pub struct DecoderName(pub &'static DecoderDescriptor);

#[derive(Error, Debug)]
pub enum ParseDecoderNameError {
    #[error("Unknown decoder: {0} (run `vpxdec info` to list decoders)")]
    Unknown(String),
}

impl FromStr for DecoderName {
    type Err = ParseDecoderNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        registry::find_by_name(s)
            .map(DecoderName)
            .ok_or_else(|| ParseDecoderNameError::Unknown(s.to_string()))
    }
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Decode an IVF stream to raw frames.
    Decode(Decode),

    /// List the available decoders.
    Info(Info),
}

#[derive(Args, Debug, Clone)]
pub struct Decode {
    /// IVF file with the color stream.
    #[clap(long = "input", short = 'i')]
    pub input: PathBuf,

    /// IVF file with the alpha stream. Frame N is attached to color frame N.
    #[clap(long = "alpha", short = 'a')]
    pub alpha: Option<PathBuf>,

    /// Where to write the decoded frames, planes tightly packed.
    #[clap(long = "output", short = 'o')]
    pub output: PathBuf,

    /// Force a decoder instead of picking one from the IVF fourcc.
    #[clap(long = "decoder")]
    pub decoder: Option<DecoderName>,

    /// Engine worker threads. Values above 16 are clamped.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub threads: Option<u32>,

    /// JSON decoder configuration. Command line flags take precedence.
    #[clap(long = "config")]
    pub config: Option<PathBuf>,

    /// Reject packets whose alpha image size differs from the color image.
    #[clap(long = "strict-alpha")]
    pub strict_alpha: bool,
}

#[derive(Args, Debug)]
pub struct Info {
    /// Show a single decoder.
    #[clap(long = "decoder")]
    pub decoder: Option<DecoderName>,
}
