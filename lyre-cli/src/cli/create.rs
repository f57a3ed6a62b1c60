//! `lyre create`: print default payloads.

use clap::ArgMatches;
use lyre_lib::settings::Settings;

use super::CliError;

pub fn run(args: &ArgMatches) -> Result<i32, CliError> {
    match args.subcommand() {
        Some(("settings-json", _)) => {
            println!("{}", Settings::default().to_json_pretty()?);
            Ok(0)
        }
        _ => Ok(-1),
    }
}
