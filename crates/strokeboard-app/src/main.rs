//! Main application entry point.

use clap::Parser;
use strokeboard_app::{Cli, run};

fn main() {
    env_logger::init();
    log::info!("Starting Strokeboard");

    let cli = Cli::parse();
    if let Err(e) = run(cli, &mut std::io::stdout().lock()) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
