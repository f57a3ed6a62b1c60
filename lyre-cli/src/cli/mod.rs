//! Argument parsing and the non-interactive subcommands.

pub mod args;
pub mod create;
pub mod scan;

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use lyre_lib::library::LibraryError;
use lyre_lib::settings::{Settings, SettingsError};
use thiserror::Error;

/// Failures that end the process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no music directory given; pass one or set library.root in --config")]
    NoLibrary,
}

/// Settings from `--config` (or defaults) with command-line overrides applied.
pub fn load_settings(args: &ArgMatches) -> Result<Settings, CliError> {
    let mut settings = match args.get_one::<String>("config") {
        Some(path) => Settings::load(Path::new(path))?,
        None => Settings::default(),
    };

    // Only the top-level command defines `--tick-ms`.
    if let Ok(Some(tick_ms)) = args.try_get_one::<u64>("tick-ms") {
        settings.worker.tick_ms = *tick_ms;
    }
    if let Some(root) = args.get_one::<String>("INPUT") {
        settings.library.root = Some(PathBuf::from(root));
    }
    if args.get_flag("include-hidden") {
        settings.library.include_hidden = true;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        std::fs::write(
            &config,
            r#"{ "library": { "root": "/from/config" }, "worker": { "tick_ms": 10 } }"#,
        )
        .unwrap();

        let args = args::build_cli().get_matches_from([
            "lyre",
            "--config",
            config.to_str().unwrap(),
            "--tick-ms",
            "25",
            "/from/args",
        ]);
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.worker.tick_ms, 25);
        assert_eq!(settings.library.root, Some(PathBuf::from("/from/args")));
    }

    #[test]
    fn config_root_is_used_without_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        std::fs::write(&config, r#"{ "library": { "root": "/music" } }"#).unwrap();

        let args = args::build_cli().get_matches_from(["lyre", "-c", config.to_str().unwrap()]);
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.library.root, Some(PathBuf::from("/music")));
        assert_eq!(settings.worker.tick_ms, 50);
    }
}
