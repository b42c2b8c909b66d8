use aurora_modbus_tools::commands;
use clap::Parser as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(clap::Parser)]
#[clap(version, about, author)]
enum Commands {
    Registers(commands::registers::Args),
    Ranges(commands::ranges::Args),
    Decode(commands::decode::Args),
}

fn end<E: std::error::Error>(r: Result<(), E>) {
    std::process::exit(match r {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            let mut cause = e.source();
            while let Some(e) = cause {
                eprintln!("  because: {e}");
                cause = e.source();
            }
            1
        }
    });
}

fn main() {
    let filter = std::env::var("AURORA_MODBUS_TOOLS_LOG")
        .ok()
        .and_then(|description| {
            description
                .parse::<tracing_subscriber::filter::targets::Targets>()
                .ok()
        })
        .unwrap_or_default();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    match Commands::parse() {
        Commands::Registers(args) => end(commands::registers::run(args)),
        Commands::Ranges(args) => end(commands::ranges::run(args)),
        Commands::Decode(args) => end(commands::decode::run(args)),
    }
}
