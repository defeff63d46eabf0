// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Rid-set algebra
//!
//! The small set-algebraic vocabulary the indices and the collection
//! evaluator are written in: intersection, difference, and multiway
//! union. All three return owned sets.

use super::{Rid, RidSet};

pub fn intersection(a: &RidSet, b: &RidSet) -> RidSet {
    a.intersection(b).copied().collect()
}

pub fn difference(a: &RidSet, b: &RidSet) -> RidSet {
    a.difference(b).copied().collect()
}

/// Union of many sets, merged smallest-first.
pub fn multiunion<I>(sets: I) -> RidSet
where
    I: IntoIterator<Item = RidSet>,
{
    let mut sets: Vec<RidSet> = sets.into_iter().collect();
    sets.sort_by_key(|s| s.len());
    let mut out = RidSet::new();
    for set in sets {
        out.extend(set);
    }
    out
}

/// A single-element set, or empty when `rid` is `None`.
pub fn singleton(rid: Option<Rid>) -> RidSet {
    rid.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(rids: &[Rid]) -> RidSet {
        rids.iter().copied().collect()
    }

    #[test]
    fn intersection_and_difference() {
        let a = set(&[1, 2, 3]);
        let b = set(&[2, 3, 4]);
        assert_eq!(intersection(&a, &b), set(&[2, 3]));
        assert_eq!(difference(&a, &b), set(&[1]));
    }

    #[test]
    fn multiunion_merges_all() {
        let merged = multiunion(vec![set(&[5]), set(&[1, 2]), set(&[2, 9])]);
        assert_eq!(merged, set(&[1, 2, 5, 9]));
        assert!(multiunion(Vec::<RidSet>::new()).is_empty());
    }
}
