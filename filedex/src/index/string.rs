// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! An index for short strings.
//!
//! Supported searches: is, startswith, endswith, contains, in. Can be
//! case-insensitive. Learning is quadratic in value length because every
//! contiguous substring is indexed; that is acceptable for the short
//! attribute values this index is meant for.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::error::{IndexError, IndexResult};
use super::rids::multiunion;
use super::{Index, Rid, RidSet};
use crate::resource::AttrValue;

pub const SEARCHES: &[&str] = &["contains", "endswith", "in", "is", "startswith"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringIndex {
    case_sensitive: bool,
    /// value -> rids (one:many)
    values: BTreeMap<String, RidSet>,
    /// prefix -> rids (one:many)
    beginnings: BTreeMap<String, RidSet>,
    /// substring -> rids (one:many)
    middles: BTreeMap<String, RidSet>,
    /// suffix -> rids (one:many)
    endings: BTreeMap<String, RidSet>,
    /// rid -> substrings learned for it, used at forget time
    rids: BTreeMap<Rid, BTreeSet<String>>,
}

impl StringIndex {
    pub fn new(case_sensitive: bool) -> Self {
        StringIndex {
            case_sensitive,
            values: BTreeMap::new(),
            beginnings: BTreeMap::new(),
            middles: BTreeMap::new(),
            endings: BTreeMap::new(),
            rids: BTreeMap::new(),
        }
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub(crate) fn fold_case(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }

    fn lookup(&self, map: &BTreeMap<String, RidSet>, arg: &str) -> RidSet {
        map.get(&self.fold_case(arg)).cloned().unwrap_or_default()
    }

    pub fn is(&self, arg: &str) -> RidSet {
        self.lookup(&self.values, arg)
    }

    pub fn startswith(&self, arg: &str) -> RidSet {
        self.lookup(&self.beginnings, arg)
    }

    pub fn contains(&self, arg: &str) -> RidSet {
        self.lookup(&self.middles, arg)
    }

    pub fn endswith(&self, arg: &str) -> RidSet {
        self.lookup(&self.endings, arg)
    }

    /// Union of the exact-value sets for a comma-separated token list.
    pub fn is_in(&self, arg: &str) -> IndexResult<RidSet> {
        if arg.is_empty() {
            return Err(IndexError::BadArg("no arg given".to_string()));
        }
        if !arg.contains(',') {
            return Err(IndexError::BadArg(format!("no comma: '{}'", arg)));
        }
        let arg = self.fold_case(arg);
        let sets = arg
            .split(',')
            .map(|token| self.values.get(token.trim()).cloned().unwrap_or_default());
        Ok(multiunion(sets))
    }
}

impl Index for StringIndex {
    fn reset(&mut self) {
        self.values.clear();
        self.beginnings.clear();
        self.middles.clear();
        self.endings.clear();
        self.rids.clear();
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
        let value = self.fold_case(raw);

        self.values.entry(value.clone()).or_default().insert(rid);

        // Every contiguous substring feeds the contains search; prefixes
        // and suffixes feed startswith/endswith. The substring set is
        // recorded so forget can undo all of it.
        let chars: Vec<char> = value.chars().collect();
        let n = chars.len();
        let mut substrings: BTreeSet<String> = BTreeSet::new();
        substrings.insert(value.clone());
        for len in 1..=n {
            let prefix: String = chars[..len].iter().collect();
            self.beginnings.entry(prefix).or_default().insert(rid);
            for start in 0..=(n - len) {
                let part: String = chars[start..start + len].iter().collect();
                self.middles.entry(part.clone()).or_default().insert(rid);
                substrings.insert(part);
            }
        }
        for start in 0..n {
            let suffix: String = chars[start..].iter().collect();
            self.endings.entry(suffix).or_default().insert(rid);
        }

        self.rids.insert(rid, substrings);
        Ok(())
    }

    fn forget(&mut self, rid: Rid) -> IndexResult<()> {
        let substrings = self.rids.remove(&rid).ok_or(IndexError::UnknownRid(rid))?;
        let maps = [
            &mut self.values,
            &mut self.beginnings,
            &mut self.middles,
            &mut self.endings,
        ];
        for map in maps {
            for substring in &substrings {
                if let Some(set) = map.get_mut(substring) {
                    set.remove(&rid);
                    if set.is_empty() {
                        map.remove(substring);
                    }
                }
            }
        }
        Ok(())
    }

    fn search(&self, search: &str, arg: &str) -> IndexResult<RidSet> {
        match search {
            "is" => Ok(self.is(arg)),
            "startswith" => Ok(self.startswith(arg)),
            "contains" => Ok(self.contains(arg)),
            "endswith" => Ok(self.endswith(arg)),
            "in" => self.is_in(arg),
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
        Some(Box::new(
            self.values.values().flat_map(|set| set.iter().copied()),
        ))
    }

    fn kind(&self) -> &'static str {
        "String"
    }
}
