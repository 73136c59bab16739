use clap::Parser;
use pesowatch::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let crate_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter(None, log::LevelFilter::Warn)
        .filter(Some("pesowatch"), crate_level)
        .parse_default_env()
        .init();

    run(cli)
}
