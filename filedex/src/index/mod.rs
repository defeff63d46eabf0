// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Secondary index family
//!
//! This module provides:
//! - The learn/forget/search contract every index satisfies
//! - A string index with substring searches
//! - An enumeration index over a fixed value list
//! - A path index with level-windowed tree searches
//! - Rid-set algebra shared by the indices and the query evaluator
//!
//! Indices reference rids only, never resource records; the catalog owns
//! the single rid-to-record mapping.

pub mod enumeration;
mod error;
pub mod path;
pub mod rids;
pub mod string;

pub use enumeration::EnumerationIndex;
pub use error::{IndexError, IndexResult};
pub use path::PathIndex;
pub use string::StringIndex;

use crate::resource::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Resource identifier: a 31-bit non-negative integer, unique within a
/// catalog.
pub type Rid = i32;

/// An ordered set of rids.
pub type RidSet = BTreeSet<Rid>;

/// The contract every index satisfies.
///
/// Search methods are dispatched by name through a static table (see
/// [`Index::searches`]); a collection constraint `<index> <search> <arg>`
/// resolves its search against that table. The optional sorted view
/// streams rids in the key order of the index's ordered value mapping.
pub trait Index {
    /// Drop all learned associations, restoring the empty state.
    fn reset(&mut self);

    /// Associate a rid with an attribute value.
    fn learn(&mut self, rid: Rid, value: &AttrValue) -> IndexResult<()>;

    /// Remove every association for a rid.
    fn forget(&mut self, rid: Rid) -> IndexResult<()>;

    /// Run a named search with a single string argument.
    fn search(&self, search: &str, arg: &str) -> IndexResult<RidSet>;

    /// The search names this index dispatches, sorted.
    fn searches(&self) -> &'static [&'static str];

    /// The search used when a constraint names only the index.
    fn default_search(&self) -> &'static str {
        "is"
    }

    /// Rids in the key order of the index's ordered value mapping, or
    /// `None` when this index has no sorted view.
    fn sorted(&self) -> Option<Box<dyn Iterator<Item = Rid> + '_>>;

    /// Type label shown by the shell's `indices` listing.
    fn kind(&self) -> &'static str;
}

/// The closed family of index types a catalog can install.
///
/// Kept as an enum so a catalog full of indices serializes with serde and
/// search dispatch stays static.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyIndex {
    String(StringIndex),
    Enumeration(EnumerationIndex),
    Path(PathIndex),
}

impl Index for AnyIndex {
    fn reset(&mut self) {
        match self {
            AnyIndex::String(i) => i.reset(),
            AnyIndex::Enumeration(i) => i.reset(),
            AnyIndex::Path(i) => i.reset(),
        }
    }

    fn learn(&mut self, rid: Rid, value: &AttrValue) -> IndexResult<()> {
        match self {
            AnyIndex::String(i) => i.learn(rid, value),
            AnyIndex::Enumeration(i) => i.learn(rid, value),
            AnyIndex::Path(i) => i.learn(rid, value),
        }
    }

    fn forget(&mut self, rid: Rid) -> IndexResult<()> {
        match self {
            AnyIndex::String(i) => i.forget(rid),
            AnyIndex::Enumeration(i) => i.forget(rid),
            AnyIndex::Path(i) => i.forget(rid),
        }
    }

    fn search(&self, search: &str, arg: &str) -> IndexResult<RidSet> {
        match self {
            AnyIndex::String(i) => i.search(search, arg),
            AnyIndex::Enumeration(i) => i.search(search, arg),
            AnyIndex::Path(i) => i.search(search, arg),
        }
    }

    fn searches(&self) -> &'static [&'static str] {
        match self {
            AnyIndex::String(i) => i.searches(),
            AnyIndex::Enumeration(i) => i.searches(),
            AnyIndex::Path(i) => i.searches(),
        }
    }

    fn sorted(&self) -> Option<Box<dyn Iterator<Item = Rid> + '_>> {
        match self {
            AnyIndex::String(i) => i.sorted(),
            AnyIndex::Enumeration(i) => i.sorted(),
            AnyIndex::Path(i) => i.sorted(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AnyIndex::String(i) => i.kind(),
            AnyIndex::Enumeration(i) => i.kind(),
            AnyIndex::Path(i) => i.kind(),
        }
    }
}

impl From<StringIndex> for AnyIndex {
    fn from(index: StringIndex) -> Self {
        AnyIndex::String(index)
    }
}

impl From<EnumerationIndex> for AnyIndex {
    fn from(index: EnumerationIndex) -> Self {
        AnyIndex::Enumeration(index)
    }
}

impl From<PathIndex> for AnyIndex {
    fn from(index: PathIndex) -> Self {
        AnyIndex::Path(index)
    }
}
