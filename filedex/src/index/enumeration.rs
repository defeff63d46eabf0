// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! An index over a fixed list of permitted values.
//!
//! Values outside the permitted list are rejected at learn time. An
//! unset attribute value takes the configured default, when there is one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{IndexError, IndexResult};
use super::rids::multiunion;
use super::{Index, Rid, RidSet};
use crate::resource::AttrValue;

pub const SEARCHES: &[&str] = &["in", "is"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumerationIndex {
    allowed: Vec<String>,
    default: Option<String>,
    /// rid -> value (one:one)
    values: BTreeMap<Rid, String>,
    /// value -> rids (one:many)
    rids: BTreeMap<String, RidSet>,
}

impl EnumerationIndex {
    pub fn new<I, S>(allowed: I, default: Option<&str>) -> IndexResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        if let Some(default) = default {
            if !allowed.iter().any(|v| v == default) {
                return Err(IndexError::BadValue(format!(
                    "default '{}' not in allowed values",
                    default
                )));
            }
        }
        Ok(EnumerationIndex {
            allowed,
            default: default.map(str::to_string),
            values: BTreeMap::new(),
            rids: BTreeMap::new(),
        })
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn is(&self, arg: &str) -> RidSet {
        self.rids.get(arg).cloned().unwrap_or_default()
    }

    /// Union of the value sets for a comma-separated or bracketed list.
    pub fn is_in(&self, arg: &str) -> IndexResult<RidSet> {
        if arg.is_empty() {
            return Err(IndexError::BadArg("no arg given".to_string()));
        }
        if !arg.contains(',') {
            return Err(IndexError::BadArg(format!("no comma: '{}'", arg)));
        }
        let values = parse_value_list(arg)?;
        let sets = values
            .iter()
            .map(|v| self.rids.get(v.as_str()).cloned().unwrap_or_default());
        Ok(multiunion(sets))
    }
}

/// Parse an `in` argument: a `[...]`/`(...)` literal of optionally quoted
/// values, or a bare comma-separated token list.
fn parse_value_list(arg: &str) -> IndexResult<Vec<String>> {
    let inner = match arg.chars().next() {
        Some('[') => arg
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']')),
        Some('(') => arg
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')')),
        _ => return Ok(arg.split(',').map(|v| v.trim().to_string()).collect()),
    };
    let inner = inner.ok_or_else(|| IndexError::BadArg(format!("unterminated list: '{}'", arg)))?;
    Ok(inner.split(',').map(|v| unquote(v.trim())).collect())
}

fn unquote(token: &str) -> String {
    for quote in ['\'', '"'] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            return token[1..token.len() - 1].to_string();
        }
    }
    token.to_string()
}

impl Index for EnumerationIndex {
    fn reset(&mut self) {
        self.values.clear();
        self.rids.clear();
    }

    fn learn(&mut self, rid: Rid, value: &AttrValue) -> IndexResult<()> {
        let value = match value {
            AttrValue::Unset => match &self.default {
                Some(default) => default.clone(),
                None => return Err(IndexError::BadValue("no value and no default".to_string())),
            },
            AttrValue::Str(s) => {
                if !self.allowed.iter().any(|v| v == s) {
                    return Err(IndexError::BadValue(format!("bad value: '{}'", s)));
                }
                s.clone()
            }
            other => {
                return Err(IndexError::BadValue(format!(
                    "value is not a string: '{}'",
                    other
                )))
            }
        };

        self.rids.entry(value.clone()).or_default().insert(rid);
        self.values.insert(rid, value);
        Ok(())
    }

    fn forget(&mut self, rid: Rid) -> IndexResult<()> {
        let value = self.values.remove(&rid).ok_or(IndexError::UnknownRid(rid))?;
        if let Some(set) = self.rids.get_mut(&value) {
            set.remove(&rid);
            if set.is_empty() {
                self.rids.remove(&value);
            }
        }
        Ok(())
    }

    fn search(&self, search: &str, arg: &str) -> IndexResult<RidSet> {
        match search {
            "is" => Ok(self.is(arg)),
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
            self.rids.values().flat_map(|set| set.iter().copied()),
        ))
    }

    fn kind(&self) -> &'static str {
        "Enumeration"
    }
}
