//! # Lyre
//!
//! A terminal audio player for the music stored on this machine.

use log::error;

mod cli;
mod controls;
mod logging;
mod runner;
mod ui;

fn main() {
    let log_buffer = logging::init();
    let args = cli::args::build_cli().get_matches();

    let code = match runner::run(&args, log_buffer) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            -1
        }
    };

    std::process::exit(code)
}
