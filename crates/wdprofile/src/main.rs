// Author: Dustin Pilgrim
// License: MIT

mod cli;
mod config;
mod logging;
mod output_heads;
mod paths;
mod print;
mod run;
mod wayland_outputs;

use clap::Parser;

fn main() {
    let args = cli::Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| paths::default_log_path("wdprofile.log"));

    if let Err(e) = logging::init_logging(&log_path, args.verbose) {
        // logging should never block saving a layout
        eprintln!("wdprofile: failed to init logging: {e}");
    }

    if let Err(e) = run::run(args) {
        eventline::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
