// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! An index for absolute paths.
//!
//! Specializes the string index for path-shaped values and adds
//! level-aware tree searches. A path is split on the platform separator,
//! keeping the leading empty segment, so `/a/b` occupies levels 0 (`""`),
//! 1 (`a`) and 2 (`b`). Search arguments take the form
//! `<path> [upper:lower]`; the optional window bounds the tree levels a
//! search applies to, relative to the level of the requested path.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::MAIN_SEPARATOR;

use super::error::{IndexError, IndexResult};
use super::rids::{difference, intersection, multiunion, singleton};
use super::string::StringIndex;
use super::{Index, Rid, RidSet};
use crate::resource::AttrValue;

pub const SEARCHES: &[&str] = &[
    "above",
    "below",
    "contains",
    "endswith",
    "in",
    "is",
    "startswith",
];

/// Tree level: zero-based position in the separator-split path.
type Level = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathIndex {
    /// Substring machinery over the full path string.
    strings: StringIndex,
    /// path -> rid (one:one, inverse of rid2path)
    path2rid: BTreeMap<String, Rid>,
    rid2path: BTreeMap<Rid, String>,
    /// (level, segment) -> rids (one:many)
    parts: BTreeMap<(Level, String), RidSet>,
    /// rid -> (level, segment) tokens, used at forget time
    rids: BTreeMap<Rid, BTreeSet<(Level, String)>>,
    /// level of a path's last segment -> rids
    levels: BTreeMap<Level, RidSet>,
}

impl PathIndex {
    /// Case sensitivity defaults per platform: insensitive on Windows,
    /// sensitive elsewhere.
    pub fn new(case_sensitive: Option<bool>) -> Self {
        PathIndex {
            strings: StringIndex::new(case_sensitive.unwrap_or(!cfg!(windows))),
            path2rid: BTreeMap::new(),
            rid2path: BTreeMap::new(),
            parts: BTreeMap::new(),
            rids: BTreeMap::new(),
            levels: BTreeMap::new(),
        }
    }

    pub fn case_sensitive(&self) -> bool {
        self.strings.case_sensitive()
    }

    /// The rid at exactly this path, as a set.
    pub fn is(&self, arg: &str) -> IndexResult<RidSet> {
        let (path, _, _) = self.path_and_limits(arg)?;
        Ok(singleton(self.path2rid.get(&path).copied()))
    }

    /// All resources at or below a path, within the level window.
    pub fn below(&self, arg: &str) -> IndexResult<RidSet> {
        let (path, upper, lower) = self.path_and_limits(arg)?;
        Ok(self.below_at(&path, upper, lower))
    }

    /// All resources at or above a path, within the level window.
    ///
    /// Calls `below` on the path and every ancestor, with the limits
    /// passed straight through except that they default to `0:1` rather
    /// than open ("breadcrumbs": the ancestor chain itself, no subtrees).
    /// Use an explicit `0:` for the full subtree of every ancestor.
    pub fn above(&self, arg: &str) -> IndexResult<RidSet> {
        let (path, upper, lower) = self.path_and_limits(arg)?;
        if !self.path2rid.contains_key(&path) {
            return Ok(RidSet::new());
        }
        let (upper, lower) = if upper.is_none() && lower.is_none() {
            (Some(0), Some(1))
        } else {
            (upper, lower)
        };

        let sep = MAIN_SEPARATOR.to_string();
        let segments: Vec<&str> = path.split(MAIN_SEPARATOR).collect();
        let results = (0..segments.len()).map(|level| {
            let ancestor = segments[..=level].join(sep.as_str());
            self.below_at(&ancestor, upper, lower)
        });
        Ok(multiunion(results))
    }

    /// `below` over an already-normalized path.
    fn below_at(&self, path: &str, upper: Option<Level>, lower: Option<Level>) -> RidSet {
        if !self.path2rid.contains_key(path) {
            return RidSet::new();
        }

        // Rids sharing every prefix segment form the subtree rooted here.
        let segments: Vec<&str> = path.split(MAIN_SEPARATOR).collect();
        let mut acc: Option<RidSet> = None;
        for (level, segment) in segments.iter().enumerate() {
            let token = (level as Level, segment.to_string());
            match self.parts.get(&token) {
                None => return RidSet::new(),
                Some(set) => {
                    acc = Some(match acc {
                        None => set.clone(),
                        Some(acc) => intersection(&acc, set),
                    });
                }
            }
        }
        let mut rids = acc.unwrap_or_default();

        // Limits are relative to the level of the requested path: drop
        // rids above the upper bound, keep only rids above the lower.
        let level = (segments.len() - 1) as Level;
        if let Some(upper) = upper {
            for i in level..level.saturating_add(upper) {
                match self.levels.get(&i) {
                    None => break,
                    Some(set) => rids = difference(&rids, set),
                }
            }
        }
        if let Some(lower) = lower {
            let mut keep: Vec<RidSet> = Vec::new();
            for i in level..level.saturating_add(lower) {
                match self.levels.get(&i) {
                    None => break,
                    Some(set) => keep.push(set.clone()),
                }
            }
            rids = intersection(&rids, &multiunion(keep));
        }
        rids
    }

    /// Split a constraint argument into a normalized path and the
    /// optional `upper:lower` level window.
    fn path_and_limits(&self, arg: &str) -> IndexResult<(String, Option<Level>, Option<Level>)> {
        let parts: Vec<&str> = arg.split_whitespace().collect();
        let (path, limits) = match parts.as_slice() {
            [path] => (*path, None),
            [path, limits] => (*path, Some(*limits)),
            _ => {
                return Err(IndexError::BadArg(format!(
                    "either need path or path and limits: '{}'",
                    arg
                )))
            }
        };

        let (mut upper, mut lower) = (None, None);
        if let Some(limits) = limits {
            if limits.chars().filter(|c| *c == ':').count() != 1 {
                return Err(IndexError::BadArg(format!("no colon: '{}'", limits)));
            }
            let (left, right) = limits.split_once(':').unwrap_or((limits, ""));
            upper = parse_limit(left)?;
            lower = parse_limit(right)?;
            if let (Some(upper), Some(lower)) = (upper, lower) {
                if upper > lower {
                    return Err(IndexError::BadArg(format!(
                        "upper limit greater than lower: {} > {}",
                        upper, lower
                    )));
                }
            }
        }

        // The filesystem root normalizes to the empty string, matching
        // the leading empty segment of every indexed path.
        let mut path = path.to_string();
        if path == MAIN_SEPARATOR.to_string() {
            path = String::new();
        }
        Ok((self.strings.fold_case(&path), upper, lower))
    }
}

fn parse_limit(s: &str) -> IndexResult<Option<Level>> {
    if s.is_empty() {
        return Ok(None);
    }
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(IndexError::BadArg(format!("bad limit: '{}'", s)));
    }
    s.parse::<Level>()
        .map(Some)
        .map_err(|_| IndexError::BadArg(format!("bad limit: '{}'", s)))
}

impl Index for PathIndex {
    fn reset(&mut self) {
        self.strings.reset();
        self.path2rid.clear();
        self.rid2path.clear();
        self.parts.clear();
        self.rids.clear();
        self.levels.clear();
    }

    fn learn(&mut self, rid: Rid, value: &AttrValue) -> IndexResult<()> {
        let raw = match value {
            AttrValue::Str(s) => s,
            other => {
                return Err(IndexError::BadValue(format!(
                    "value is not a string: '{}'",
                    other
                )))
            }
        };
        if !raw.is_empty() && !raw.starts_with(MAIN_SEPARATOR) {
            return Err(IndexError::BadValue(format!(
                "path not specified absolutely: '{}'",
                raw
            )));
        }

        self.strings.learn(rid, value)?;

        let path = self
            .strings
            .fold_case(raw)
            .trim_end_matches(MAIN_SEPARATOR)
            .to_string();
        let segments: Vec<&str> = path.split(MAIN_SEPARATOR).collect();

        self.path2rid.insert(path.clone(), rid);
        self.rid2path.insert(rid, path.clone());

        let mut last = 0;
        for (level, segment) in segments.iter().enumerate() {
            let token = (level as Level, segment.to_string());
            self.parts.entry(token.clone()).or_default().insert(rid);
            self.rids.entry(rid).or_default().insert(token);
            last = level as Level;
        }
        self.levels.entry(last).or_default().insert(rid);
        Ok(())
    }

    fn forget(&mut self, rid: Rid) -> IndexResult<()> {
        self.strings.forget(rid)?;

        let tokens = self.rids.remove(&rid).ok_or(IndexError::UnknownRid(rid))?;
        let mut last = 0;
        for token in tokens {
            if token.0 > last {
                last = token.0;
            }
            if let Some(set) = self.parts.get_mut(&token) {
                set.remove(&rid);
                if set.is_empty() {
                    self.parts.remove(&token);
                }
            }
        }
        if let Some(set) = self.levels.get_mut(&last) {
            set.remove(&rid);
            if set.is_empty() {
                self.levels.remove(&last);
            }
        }

        if let Some(path) = self.rid2path.remove(&rid) {
            self.path2rid.remove(&path);
        }
        Ok(())
    }

    fn search(&self, search: &str, arg: &str) -> IndexResult<RidSet> {
        match search {
            "is" => self.is(arg),
            "below" => self.below(arg),
            "above" => self.above(arg),
            "startswith" | "contains" | "endswith" | "in" => self.strings.search(search, arg),
            other => Err(IndexError::UnknownSearch {
                search: other.to_string(),
                kind: self.kind(),
            }),
        }
    }

    fn searches(&self) -> &'static [&'static str] {
        SEARCHES
    }

    fn sorted(&self) -> Option<Box<dyn Iterator<Item = Rid> + '_>> {
        self.strings.sorted()
    }

    fn kind(&self) -> &'static str {
        "Path"
    }
}
