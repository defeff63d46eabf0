// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filedex", version, about = "A catalog for the filesystem")]
pub struct Cli {
    /// Storage URL, e.g. file://./catalog.db or net://localhost:9100.
    /// Anything without a scheme is treated as file://
    pub url: String,

    /// Directory to catalog when the database is created fresh
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the crawler until interrupted
    Crawl,
}
