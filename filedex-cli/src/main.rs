// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Filedex CLI entry point

use clap::Parser;

mod cli;
use cli::{Cli, Commands};

use filedex::{Address, Catalog, Database, EnumerationIndex, FileRecord, PathIndex, StringIndex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    // Anything without a scheme is a local file database.
    let url = if cli.url.contains("://") {
        cli.url.clone()
    } else {
        format!("file://{}", cli.url)
    };
    let address = Address::parse(&url)?;

    // With --root a factory is available in case the database is fresh;
    // without it, a fresh database is fatal.
    let seed = match &cli.root {
        Some(root) => Some(default_catalog(root)?),
        None => None,
    };
    let db = Database::open(&address, seed.map(|catalog| move || catalog))?;

    let result = match cli.command {
        Some(Commands::Crawl) => cli::handle_crawl(&db),
        None => cli::handle_shell(&db),
    };

    db.close()?;
    result
}

/// The stock catalog for a fresh database: name, kind and path indices
/// over [`FileRecord`].
fn default_catalog(
    root: &std::path::Path,
) -> Result<Catalog<FileRecord>, Box<dyn std::error::Error>> {
    let mut catalog = Catalog::new(root)?;
    catalog.add_index("name", StringIndex::new(false));
    catalog.add_index("kind", EnumerationIndex::new(["file", "dir"], None)?);
    catalog.add_index("path", PathIndex::new(None));
    Ok(catalog)
}
