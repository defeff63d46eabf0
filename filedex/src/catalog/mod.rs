// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! The catalog: resource identity, modtimes, and installed indices
//!
//! The catalog owns rid allocation, the path -> (rid, modtime) and
//! rid -> record maps, the live rid-set, and the named indices. It is
//! the single persistent root object; the crawler (see [`crawler`])
//! keeps it in sync with the filesystem.

pub mod crawler;
mod error;

pub use error::{CatalogError, CatalogResult};

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, MAIN_SEPARATOR};

use crate::index::{AnyIndex, Index, IndexError, Rid, RidSet};
use crate::resource::Resource;

/// Default component prefixes the crawler hides.
const HIDDEN_PREFIXES: &[char] = &['.', '_'];

/// The persistent root object: resource identity plus every installed
/// index, for one filesystem subtree.
///
/// Invariants held at every commit: `ridtimes`, `resources` and `rids`
/// agree on membership and size, and every installed index either holds
/// an entry for a live rid or logged a missing-attribute warning when
/// that rid was learned.
#[derive(Serialize, Deserialize)]
pub struct Catalog<R> {
    root: String,
    hidden_prefixes: Vec<char>,
    indices: BTreeMap<String, AnyIndex>,
    /// path -> (rid, modtime in nanoseconds since the epoch)
    ridtimes: BTreeMap<String, (Rid, u64)>,
    resources: BTreeMap<Rid, R>,
    rids: RidSet,
    /// Allocation cursor; process-local so a restart re-randomizes.
    #[serde(skip)]
    next_rid: Option<Rid>,
    /// Rids forgotten in this process, never handed out again.
    #[serde(skip)]
    retired: RidSet,
}

impl<R: Resource> Catalog<R> {
    /// Create an empty catalog over a subtree. The root is canonicalized
    /// and must name a directory.
    pub fn new(root: impl AsRef<Path>) -> CatalogResult<Self> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|source| CatalogError::Io {
            path: root.display().to_string(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(CatalogError::NotADirectory(
                canonical.display().to_string(),
            ));
        }
        let mut root = canonical.to_string_lossy().into_owned();
        while root.len() > 1 && root.ends_with(MAIN_SEPARATOR) {
            root.pop();
        }
        Ok(Catalog {
            root,
            hidden_prefixes: HIDDEN_PREFIXES.to_vec(),
            indices: BTreeMap::new(),
            ridtimes: BTreeMap::new(),
            resources: BTreeMap::new(),
            rids: RidSet::new(),
            next_rid: None,
            retired: RidSet::new(),
        })
    }

    /// Install an index under a name; the name doubles as the record
    /// attribute the index learns from.
    pub fn add_index(&mut self, name: &str, index: impl Into<AnyIndex>) {
        self.indices.insert(name.to_string(), index.into());
    }

    /// Builder form of [`add_index`](Catalog::add_index).
    pub fn with_index(mut self, name: &str, index: impl Into<AnyIndex>) -> Self {
        self.add_index(name, index);
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn rids(&self) -> &RidSet {
        &self.rids
    }

    pub fn len(&self) -> usize {
        self.rids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rids.is_empty()
    }

    pub fn index(&self, name: &str) -> Option<&AnyIndex> {
        self.indices.get(name)
    }

    pub fn indices(&self) -> impl Iterator<Item = (&str, &AnyIndex)> {
        self.indices.iter().map(|(name, index)| (name.as_str(), index))
    }

    pub fn resource(&self, rid: Rid) -> Option<&R> {
        self.resources.get(&rid)
    }

    /// The (rid, modtime) recorded for a path, if any.
    pub fn ridtime(&self, path: &str) -> Option<(Rid, u64)> {
        self.ridtimes.get(path).copied()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.ridtimes.keys().map(String::as_str)
    }

    pub fn hidden_prefixes(&self) -> &[char] {
        &self.hidden_prefixes
    }

    /// Override the component prefixes the crawler hides.
    pub fn set_hidden_prefixes(&mut self, prefixes: Vec<char>) {
        self.hidden_prefixes = prefixes;
    }

    /// Whether the crawler hides this path: true when any component
    /// below the root starts with a hidden prefix.
    pub fn ignores(&self, path: &Path) -> bool {
        hidden(Path::new(&self.root), &self.hidden_prefixes, path)
    }

    /// Reset every installed index and empty the primary maps. Callers
    /// run this inside a transaction.
    pub fn reset(&mut self) {
        for index in self.indices.values_mut() {
            index.reset();
        }
        self.ridtimes.clear();
        self.resources.clear();
        self.rids.clear();
    }

    /// Record one observed path. Creates the resource on first sight,
    /// rebuilds it when the modtime changed, otherwise does nothing.
    /// Returns whether the catalog was mutated.
    pub fn observe(&mut self, path: &Path, mtime: u64) -> CatalogResult<bool> {
        let key = path.to_string_lossy().into_owned();
        match self.ridtimes.get(&key).copied() {
            None => {
                let record = build_record::<R>(path, &key)?;
                let rid = self.allocate_rid();
                self.learn_record(rid, &record)?;
                self.ridtimes.insert(key, (rid, mtime));
                self.resources.insert(rid, record);
                self.rids.insert(rid);
                Ok(true)
            }
            Some((rid, stored)) => {
                if stored == mtime {
                    return Ok(false);
                }
                let record = build_record::<R>(path, &key)?;
                self.forget_indices(rid);
                self.learn_record(rid, &record)?;
                self.ridtimes.insert(key, (rid, mtime));
                self.resources.insert(rid, record);
                Ok(true)
            }
        }
    }

    /// Drop a path and its resource from the catalog and every index.
    /// Returns whether the path was known.
    pub fn forget_path(&mut self, path: &str) -> bool {
        match self.ridtimes.remove(path) {
            None => false,
            Some((rid, _)) => {
                self.forget_indices(rid);
                self.resources.remove(&rid);
                self.rids.remove(&rid);
                self.retired.insert(rid);
                true
            }
        }
    }

    /// Allocate sequentially from a random start point; a collision
    /// restarts from a fresh random point.
    fn allocate_rid(&mut self) -> Rid {
        let mut candidate = self.next_rid.take().unwrap_or_else(random_rid);
        while self.rids.contains(&candidate) || self.retired.contains(&candidate) {
            candidate = random_rid();
        }
        self.next_rid = Some(candidate.checked_add(1).unwrap_or(0));
        candidate
    }

    fn learn_record(&mut self, rid: Rid, record: &R) -> CatalogResult<()> {
        for (name, index) in self.indices.iter_mut() {
            match record.attribute(name) {
                None => warn!(
                    "resource '{}' has no corresponding attribute for index '{}'",
                    record.path(),
                    name
                ),
                Some(value) => index.learn(rid, &value)?,
            }
        }
        Ok(())
    }

    /// An index may legitimately hold nothing for a rid (the attribute
    /// was missing at learn time), so `UnknownRid` is not an error here.
    fn forget_indices(&mut self, rid: Rid) {
        for index in self.indices.values_mut() {
            match index.forget(rid) {
                Ok(()) => {}
                Err(IndexError::UnknownRid(_)) => {}
                Err(err) => warn!("forgetting rid {} failed: {}", rid, err),
            }
        }
    }
}

fn build_record<R: Resource>(path: &Path, key: &str) -> CatalogResult<R> {
    R::from_path(path).map_err(|source| CatalogError::Io {
        path: key.to_string(),
        source,
    })
}

fn random_rid() -> Rid {
    fastrand::i32(0..=i32::MAX)
}

/// True when any component of `path` below `root` starts with one of the
/// hidden prefixes.
pub(crate) fn hidden(root: &Path, prefixes: &[char], path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components().any(|component| match component {
        Component::Normal(name) => name
            .to_string_lossy()
            .chars()
            .next()
            .map_or(false, |first| prefixes.contains(&first)),
        _ => false,
    })
}
