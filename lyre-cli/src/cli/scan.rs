//! `lyre scan`: one synchronous library scan printed as JSON.

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;
use lyre_lib::catalog::Catalog;
use lyre_lib::library::{DirectorySource, TrackSource};

use super::{load_settings, CliError};

pub fn run(args: &ArgMatches) -> Result<i32, CliError> {
    let settings = load_settings(args)?;
    let root = settings
        .library
        .root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut source = DirectorySource::from_settings(&root, &settings.library);
    let catalog = Catalog::from_scan(source.query()?);
    info!("scanned {} tracks under {}", catalog.len(), root.display());

    println!("{}", serde_json::to_string_pretty(catalog.tracks())?);
    Ok(0)
}
