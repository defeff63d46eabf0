// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Resource abstraction
//!
//! A resource is the record the catalog keeps for a single filesystem
//! entry. The catalog never interprets a record's fields; it only builds
//! records through [`Resource::from_path`] and reads named attributes when
//! feeding the installed indices. Embedders supply their own record type,
//! or use the provided [`FileRecord`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// An attribute value read off a resource record by name.
///
/// `Unset` means the attribute exists but carries no value; an
/// enumeration index replaces it with its configured default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Unset,
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{}", s),
            AttrValue::Int(n) => write!(f, "{}", n),
            AttrValue::Unset => Ok(()),
        }
    }
}

/// A persistent record for one filesystem entry.
///
/// The catalog stores records opaquely and addresses them by rid. Each
/// installed index is associated by name with an attribute on the record;
/// a `None` from [`attribute`](Resource::attribute) makes the catalog log
/// a warning and skip that index for that rid.
pub trait Resource: Clone + Send + Serialize + DeserializeOwned + 'static {
    /// Build a record from a path on disk.
    fn from_path(path: &Path) -> io::Result<Self>;

    /// The absolute path this record was built from.
    fn path(&self) -> &str;

    /// Read an attribute by name; `None` when no such attribute exists.
    fn attribute(&self, name: &str) -> Option<AttrValue>;

    /// The attribute names this record type exposes, sorted, for the
    /// shell's report and completions.
    fn fields() -> &'static [&'static str];
}

/// The default record type: one filesystem entry with its common stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    path: String,
    name: String,
    ext: String,
    kind: String,
    size: u64,
    mtime: u64,
}

impl Resource for FileRecord {
    fn from_path(path: &Path) -> io::Result<Self> {
        let meta = path.symlink_metadata()?;
        let mtime = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = if meta.is_dir() { "dir" } else { "file" };
        Ok(FileRecord {
            path: path.to_string_lossy().into_owned(),
            name,
            ext,
            kind: kind.to_string(),
            size: meta.len(),
            mtime,
        })
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn attribute(&self, name: &str) -> Option<AttrValue> {
        match name {
            "path" => Some(AttrValue::Str(self.path.clone())),
            "name" => Some(AttrValue::Str(self.name.clone())),
            "ext" => Some(AttrValue::Str(self.ext.clone())),
            "kind" => Some(AttrValue::Str(self.kind.clone())),
            "size" => Some(AttrValue::Int(self.size as i64)),
            "mtime" => Some(AttrValue::Int(self.mtime as i64)),
            _ => None,
        }
    }

    fn fields() -> &'static [&'static str] {
        &["ext", "kind", "mtime", "name", "path", "size"]
    }
}
