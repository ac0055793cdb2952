use std::process::ExitCode;

use clap::Parser;
use rootswatch_cli::{log_filter, run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = log_filter(std::env::var("RUST_LOG").ok().as_deref(), cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
