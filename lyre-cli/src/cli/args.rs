//! CLI argument definitions for `lyre`.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    Command::new("Lyre")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse and play the music stored on this machine")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .global(true)
                .help("Settings JSON file (see `lyre create settings-json`)"),
        )
        .arg(
            Arg::new("include-hidden")
                .long("include-hidden")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Also scan hidden files and directories"),
        )
        .arg(
            Arg::new("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("How often the playback worker refreshes its status"),
        )
        .arg(
            Arg::new("silent")
                .long("silent")
                .action(ArgAction::SetTrue)
                .help("Keep time without opening an audio device"),
        )
        .arg(
            Arg::new("INPUT")
                .help("The music directory to scan")
                .required(false)
                .index(1),
        )
        .subcommand(
            Command::new("scan")
                .about("Scan a music directory and print the sorted catalog as JSON")
                .arg(
                    Arg::new("INPUT")
                        .help("The music directory to scan")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand_required(true)
                .subcommand(
                    Command::new("settings-json").about("Print the default settings JSON"),
                ),
        )
}
