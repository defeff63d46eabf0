// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! The crawler: keeps the catalog in sync with the live filesystem
//!
//! One pass (`crawl_once`) walks the subtree and adds or re-indexes every
//! visible path, committing a checkpoint every few entries, then unindexes
//! paths that no longer exist in a single closing transaction. The
//! background form runs passes on its own thread and connection until its
//! stop flag is raised; stopping is a signal, the in-flight pass finishes.

use log::warn;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, UNIX_EPOCH};
use walkdir::WalkDir;

use super::{hidden, CatalogError, CatalogResult};
use crate::resource::Resource;
use crate::store::Connection;

/// Entries between checkpoint commits during the add/update pass; bounds
/// crash-loss and lock hold time.
const CHECKPOINT_INTERVAL: usize = 20;

/// Pause between background passes.
const CRAWL_PAUSE: Duration = Duration::from_millis(100);

/// One add/update pass followed by one unindex pass. Aborts the in-flight
/// transaction on error.
pub fn crawl_once<R: Resource>(conn: &mut Connection<R>) -> CatalogResult<()> {
    let result = add_update_pass(conn).and_then(|_| unindex_pass(conn));
    if result.is_err() {
        if let Err(err) = conn.abort() {
            warn!("abort after failed crawl pass also failed: {}", err);
        }
    }
    result
}

fn add_update_pass<R: Resource>(conn: &mut Connection<R>) -> CatalogResult<()> {
    let root = PathBuf::from(conn.catalog().root());
    let prefixes = conn.catalog().hidden_prefixes().to_vec();

    let filter_root = root.clone();
    let walker = WalkDir::new(&root)
        .into_iter()
        .filter_entry(move |entry| !hidden(&filter_root, &prefixes, entry.path()));

    let mut processed = 0usize;
    let mut dirty = false;
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("crawl skipping unreadable entry: {}", err);
                continue;
            }
        };
        let mtime = match modified_ns(entry.path()) {
            Ok(mtime) => mtime,
            Err(err) => {
                warn!("failed to stat {}: {}", entry.path().display(), err);
                continue;
            }
        };
        match conn.catalog_mut().observe(entry.path(), mtime) {
            Ok(mutated) => dirty |= mutated,
            Err(CatalogError::Io { path, source }) => {
                warn!("failed to read {}: {}", path, source);
                continue;
            }
            Err(err) => return Err(err),
        }
        processed += 1;
        if processed % CHECKPOINT_INTERVAL == 0 && dirty {
            conn.commit()?;
            dirty = false;
        }
    }
    if dirty {
        conn.commit()?;
    }
    Ok(())
}

fn unindex_pass<R: Resource>(conn: &mut Connection<R>) -> CatalogResult<()> {
    let missing: Vec<String> = conn
        .catalog()
        .paths()
        .filter(|path| !Path::new(path).exists())
        .map(String::from)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    for path in &missing {
        conn.catalog_mut().forget_path(path);
    }
    conn.commit()?;
    Ok(())
}

fn modified_ns(path: &Path) -> io::Result<u64> {
    let modified = fs::symlink_metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0))
}

/// Handle on a background crawler thread.
pub struct CrawlHandle {
    stop: Arc<AtomicBool>,
    thread: thread::JoinHandle<()>,
}

impl CrawlHandle {
    /// Signal the crawler to stop and wait for the current pass to
    /// finish.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.thread.join().is_err() {
            warn!("crawler thread panicked");
        }
    }
}

/// Start the background crawler on its own thread. The crawler owns the
/// given connection; failed passes are logged and retried on the next
/// loop iteration.
pub fn start_crawling<R: Resource>(mut conn: Connection<R>) -> io::Result<CrawlHandle> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let thread = thread::Builder::new()
        .name("filedex-crawler".to_string())
        .spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                if let Err(err) = crawl_once(&mut conn) {
                    warn!("crawl pass failed: {}", err);
                }
                thread::sleep(CRAWL_PAUSE);
            }
        })?;
    Ok(CrawlHandle { stop, thread })
}
