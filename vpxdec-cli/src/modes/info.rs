use vpxdec::{registry, DecoderDescriptor};
use vpxdec_cli::cli_args::Info;

pub fn info(info: Info) {
    match info.decoder {
        Some(name) => print_decoder(name.0),
        None => {
            println!("There are {} available decoders.", registry::all().len());
            for descriptor in registry::all() {
                print_decoder(descriptor);
            }
        }
    }
}

fn print_decoder(descriptor: &DecoderDescriptor) {
    println!(
        "{:<12} {:<18} codec={:?} output={}{}",
        descriptor.name,
        descriptor.long_name,
        descriptor.codec,
        if descriptor.alpha { "yuva420p" } else { "yuv420p" },
        if descriptor.capabilities.auto_threads {
            " threads=auto"
        } else {
            ""
        },
    );
}
