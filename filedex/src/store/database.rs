// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Database handle and per-thread connections
//!
//! The database persists exactly one value: the catalog snapshot, under
//! the `catalog` key of the backend's default tree. Each thread opens its
//! own [`Connection`], which deserializes the last committed snapshot and
//! works on it in memory; `commit` writes the snapshot back and flushes,
//! `abort` re-reads the last committed state. A query that starts after a
//! commit therefore observes all of that commit's mutations, and a query
//! that starts mid-crawl observes a consistent prior snapshot.

use log::warn;
use std::fs;
use std::path::PathBuf;

use super::address::Address;
use super::error::{StoreError, StoreResult};
use crate::catalog::Catalog;
use crate::resource::Resource;

const CATALOG_KEY: &[u8] = b"catalog";

/// Lock sentinel beside the database directory. Removed on drop so a
/// clean shutdown releases the database for the next process.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!("failed to remove lock file {}: {}", self.path.display(), err);
        }
    }
}

/// An open database holding one catalog.
pub struct Database {
    db: sled::Db,
    _lock: LockGuard,
}

impl Database {
    /// Open the database at an address, creating it if absent.
    ///
    /// When the database holds no catalog yet the factory is invoked to
    /// build one and the result is committed; with no factory that case
    /// is [`StoreError::MissingCatalog`]. A `<path>.lock` sentinel beside
    /// the database directory means another process has it open.
    pub fn open<R, F>(address: &Address, factory: Option<F>) -> StoreResult<Self>
    where
        R: Resource,
        F: FnOnce() -> Catalog<R>,
    {
        let path = match address {
            Address::File(path) => path,
            other => {
                return Err(StoreError::Unsupported(format!(
                    "client-server storage not available in this build: {}",
                    other
                )))
            }
        };
        if path.exists() && !path.is_dir() {
            return Err(StoreError::BadAddress(format!(
                "{} does not point to a database directory",
                path.display()
            )));
        }
        if !path.exists() {
            warn!("creating new database at {}", path.display());
        }

        let lock_path = PathBuf::from(format!("{}.lock", path.display()));
        if lock_path.exists() {
            return Err(StoreError::Locked(path.display().to_string()));
        }
        fs::write(&lock_path, std::process::id().to_string())?;
        let lock = LockGuard { path: lock_path };

        let db = sled::open(path)?;

        match db.get(CATALOG_KEY)? {
            Some(bytes) => {
                // The snapshot must decode as a catalog of the caller's
                // resource type before we hand out connections.
                bincode::deserialize::<Catalog<R>>(&bytes)?;
            }
            None => match factory {
                Some(factory) => {
                    let bytes = bincode::serialize(&factory())?;
                    db.insert(CATALOG_KEY, bytes)?;
                    db.flush()?;
                }
                None => return Err(StoreError::MissingCatalog),
            },
        }

        Ok(Database { db, _lock: lock })
    }

    /// Open a database that must already hold a catalog.
    pub fn open_existing<R: Resource>(address: &Address) -> StoreResult<Self> {
        let factory: Option<fn() -> Catalog<R>> = None;
        Self::open(address, factory)
    }

    /// Open a connection for the calling thread.
    pub fn connect<R: Resource>(&self) -> StoreResult<Connection<R>> {
        let catalog = load_catalog(&self.db)?;
        Ok(Connection {
            db: self.db.clone(),
            catalog,
        })
    }

    /// Flush and release the database, removing the lock sentinel.
    pub fn close(self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn load_catalog<R: Resource>(db: &sled::Db) -> StoreResult<Catalog<R>> {
    let bytes = db.get(CATALOG_KEY)?.ok_or(StoreError::MissingCatalog)?;
    Ok(bincode::deserialize(&bytes)?)
}

/// One thread's handle on the catalog.
///
/// Mutations accumulate in memory until `commit`; `abort` discards them.
/// Connections are not shared between threads; the crawler and the query
/// path each hold their own.
pub struct Connection<R: Resource> {
    db: sled::Db,
    catalog: Catalog<R>,
}

impl<R: Resource> Connection<R> {
    pub fn catalog(&self) -> &Catalog<R> {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog<R> {
        &mut self.catalog
    }

    /// Persist the in-memory catalog as the new committed snapshot.
    pub fn commit(&mut self) -> StoreResult<()> {
        let bytes = bincode::serialize(&self.catalog)?;
        self.db.insert(CATALOG_KEY, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Discard in-memory mutations and re-read the committed snapshot.
    pub fn abort(&mut self) -> StoreResult<()> {
        self.catalog = load_catalog(&self.db)?;
        Ok(())
    }

    /// Observe the latest committed snapshot. Equivalent to `abort`;
    /// named for the read path.
    pub fn refresh(&mut self) -> StoreResult<()> {
        self.abort()
    }
}
