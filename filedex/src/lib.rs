// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Filedex - a continuously-updated catalog for a filesystem subtree
//!
//! Filedex assigns a stable identifier to every file and directory under
//! a configured root, keeps secondary indices over their attributes, and
//! answers boolean queries over those indices. The catalog is designed so
//! that you never index or unindex files yourself: a crawler keeps it in
//! sync — change a file's modtime and it is re-indexed, remove the file
//! and it is unindexed.
//!
//! # Features
//!
//! - **Stable resource ids**: rids survive modtime changes and re-crawls
//! - **Pluggable indices**: short strings (substring searches),
//!   enumerations, and paths (level-windowed tree searches)
//! - **Background crawler**: polling add/update and unindex passes with
//!   checkpoint commits
//! - **DNF queries**: AND/NOT/OR constraint groupings, lazily evaluated,
//!   with sorted and limited iteration
//! - **Embedded persistence**: the whole catalog lives under one key of
//!   a Sled database, with per-thread snapshot connections
//!
//! Not designed to track an entire filesystem, just a partial tree.
//!
//! # Usage
//!
//! ```text
//! # open (or create) a catalog and enter the shell
//! filedex file://./catalog.db --root ~/Documents
//!
//! # or keep the catalog in sync until interrupted
//! filedex file://./catalog.db crawl
//! ```

pub mod catalog;
pub mod collection;
pub mod index;
pub mod resource;
pub mod store;

pub use catalog::crawler::{crawl_once, start_crawling, CrawlHandle};
pub use catalog::{Catalog, CatalogError, CatalogResult};
pub use collection::{Collection, Combinator, Query, QueryError, QueryResult, Term};
pub use index::{
    AnyIndex, EnumerationIndex, Index, IndexError, IndexResult, PathIndex, Rid, RidSet,
    StringIndex,
};
pub use resource::{AttrValue, FileRecord, Resource};
pub use store::{Address, Connection, Database, StoreError, StoreResult};

/// Filedex version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filedex crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
