use clap::Parser;
mod modes;

use modes::decode::decode;
use modes::info::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;
use vpxdec_cli::cli_args::{Mode, Opt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish()
        .try_init()?;

    let opt = Opt::parse();

    match opt.mode {
        Mode::Decode(d) => decode(d)?,
        Mode::Info(i) => info(i),
    };

    Ok(())
}
