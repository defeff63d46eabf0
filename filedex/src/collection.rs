// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Collections: disjunctive-normal-form queries over the catalog
//!
//! A collection is a set of constraint groupings plus sort/limit
//! metadata. Within a grouping, terms are intersected or subtracted
//! left-to-right; groupings are unioned. `and`/`not` extend the last
//! grouping, `or` starts a new one, so `and`/`not` bind tighter:
//!
//! ```text
//! a AND b OR c NOT d   ==   (a ∩ b) ∪ (c \ d)
//! ```
//!
//! Constraints are `<index> [<search> [<arg>]]`. The index must be
//! installed in the catalog; the search must be in that index's dispatch
//! table (the index's default search when omitted). Nothing touches the
//! database until the collection is first measured or iterated.

use thiserror::Error;

use crate::catalog::Catalog;
use crate::index::rids::{difference, intersection, multiunion};
use crate::index::{Index, IndexError, RidSet};
use crate::resource::Resource;

#[derive(Error, Debug)]
pub enum QueryError {
    /// Unparseable constraint, or one naming an unknown index or search.
    #[error("bad query: {0}")]
    BadQuery(String),

    #[error("bad sort: {0}")]
    BadSort(String),

    #[error("bad limit: {0}")]
    BadLimit(String),

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// How a term combines with the accumulated set of its grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// First term of a grouping: start from this seed set.
    Seed,
    Intersect,
    Difference,
}

/// A validated constraint: index name, canonical search name, argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub index: String,
    pub search: String,
    pub arg: String,
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.arg.is_empty() {
            write!(f, "{} {}", self.index, self.search)
        } else {
            write!(f, "{} {} {}", self.index, self.search, self.arg)
        }
    }
}

/// One term of a grouping. A `None` query with a `Seed` combinator is
/// the universe (all live rids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub combinator: Combinator,
    pub query: Option<Query>,
}

impl Term {
    fn universe() -> Self {
        Term {
            combinator: Combinator::Seed,
            query: None,
        }
    }

    /// Whether this term seeds a grouping with the universe.
    pub fn is_match_all(&self) -> bool {
        self.combinator == Combinator::Seed && self.query.is_none()
    }
}

/// A filtered collection of catalog resources.
pub struct Collection {
    constraints: Vec<Vec<Term>>,
    /// Backing rid-set; populated lazily on first measure or iteration.
    data: Option<RidSet>,
    limit: Option<usize>,
    sort: Option<String>,
}

impl Collection {
    /// Build a collection from an optional seed constraint; none means
    /// the universe.
    pub fn new<R: Resource>(
        catalog: &Catalog<R>,
        constraint: Option<&str>,
    ) -> QueryResult<Collection> {
        let term = match constraint {
            None => Term::universe(),
            Some(constraint) => Term {
                combinator: Combinator::Seed,
                query: Some(validate(catalog, constraint)?),
            },
        };
        Ok(Collection {
            constraints: vec![vec![term]],
            data: None,
            limit: None,
            sort: None,
        })
    }

    /// Exclude resources that don't satisfy the constraint.
    pub fn and<R: Resource>(&mut self, catalog: &Catalog<R>, constraint: &str) -> QueryResult<()> {
        let query = validate(catalog, constraint)?;
        self.push_term(Combinator::Intersect, query);
        Ok(())
    }

    /// Exclude resources that satisfy the constraint.
    pub fn not<R: Resource>(&mut self, catalog: &Catalog<R>, constraint: &str) -> QueryResult<()> {
        let query = validate(catalog, constraint)?;
        self.push_term(Combinator::Difference, query);
        Ok(())
    }

    /// Include resources that satisfy the constraint, starting a new
    /// grouping. An empty constraint seeds the grouping with the
    /// universe, which is how a grouping opens with `not`.
    pub fn or<R: Resource>(
        &mut self,
        catalog: &Catalog<R>,
        constraint: Option<&str>,
    ) -> QueryResult<()> {
        let term = match constraint {
            None => Term::universe(),
            Some(constraint) => Term {
                combinator: Combinator::Seed,
                query: Some(validate(catalog, constraint)?),
            },
        };
        self.constraints.push(vec![term]);
        self.data = None;
        Ok(())
    }

    fn push_term(&mut self, combinator: Combinator, query: Query) {
        if let Some(grouping) = self.constraints.last_mut() {
            grouping.push(Term {
                combinator,
                query: Some(query),
            });
        }
        self.data = None;
    }

    pub fn groupings(&self) -> &[Vec<Term>] {
        &self.constraints
    }

    /// Whether the last grouping is a bare universe seed.
    pub fn last_grouping_is_match_all(&self) -> bool {
        self.constraints
            .last()
            .map_or(false, |grouping| grouping.len() == 1 && grouping[0].is_match_all())
    }

    /// Drop the last grouping when it is a bare universe seed; used by
    /// the shell to trim redundant seeds before an `or`.
    pub fn retract_universe_grouping(&mut self) -> bool {
        if self.last_grouping_is_match_all() {
            self.constraints.pop();
            self.data = None;
            true
        } else {
            false
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) -> QueryResult<()> {
        if limit < 1 {
            return Err(QueryError::BadLimit(format!(
                "limit less than 1: '{}'",
                limit
            )));
        }
        self.limit = Some(limit);
        Ok(())
    }

    /// Set the limit from a decimal string.
    pub fn set_limit_str(&mut self, value: &str) -> QueryResult<()> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(QueryError::BadLimit(format!(
                "int/digit expected: '{}'",
                value
            )));
        }
        let limit: usize = value
            .parse()
            .map_err(|_| QueryError::BadLimit(format!("int/digit expected: '{}'", value)))?;
        self.set_limit(limit)
    }

    pub fn clear_limit(&mut self) {
        self.limit = None;
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Sort by an installed index; the index must offer a sorted view.
    pub fn set_sort<R: Resource>(&mut self, catalog: &Catalog<R>, name: &str) -> QueryResult<()> {
        let index = catalog
            .index(name)
            .ok_or_else(|| QueryError::BadSort(format!("no such index: '{}'", name)))?;
        if index.sorted().is_none() {
            return Err(QueryError::BadSort(format!("index '{}' not sortable", name)));
        }
        self.sort = Some(name.to_string());
        Ok(())
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Evaluate the constraints against the catalog's indices. Within a
    /// grouping the terms fold left-to-right; grouping results union.
    pub fn refresh<R: Resource>(&mut self, catalog: &Catalog<R>) -> QueryResult<()> {
        let mut results: Vec<RidSet> = Vec::new();
        for grouping in &self.constraints {
            let mut acc: Option<RidSet> = None;
            for term in grouping {
                let set = match &term.query {
                    None => catalog.rids().clone(),
                    Some(query) => eval(catalog, query)?,
                };
                acc = Some(match term.combinator {
                    Combinator::Seed => set,
                    Combinator::Intersect => intersection(&acc.unwrap_or_default(), &set),
                    Combinator::Difference => difference(&acc.unwrap_or_default(), &set),
                });
            }
            if let Some(result) = acc {
                results.push(result);
            }
        }
        self.data = Some(multiunion(results));
        Ok(())
    }

    fn ensure<R: Resource>(&mut self, catalog: &Catalog<R>) -> QueryResult<&RidSet> {
        if self.data.is_none() {
            self.refresh(catalog)?;
        }
        Ok(self.data.as_ref().unwrap_or(&EMPTY))
    }

    /// Number of resources iteration would yield (limit-capped).
    pub fn len<R: Resource>(&mut self, catalog: &Catalog<R>) -> QueryResult<usize> {
        let matched = self.matched(catalog)?;
        Ok(match self.limit {
            Some(limit) if matched > limit => limit,
            _ => matched,
        })
    }

    /// Size of the backing set, ignoring the limit.
    pub fn matched<R: Resource>(&mut self, catalog: &Catalog<R>) -> QueryResult<usize> {
        Ok(self.ensure(catalog)?.len())
    }

    /// Materialize the resources, in rid order or in the sort index's
    /// key order, stopping at the limit.
    pub fn resources<'a, R: Resource>(
        &mut self,
        catalog: &'a Catalog<R>,
    ) -> QueryResult<Vec<&'a R>> {
        self.ensure(catalog)?;
        let data = self.data.as_ref().unwrap_or(&EMPTY);
        let limit = self.limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();

        match &self.sort {
            None => {
                for rid in data {
                    if out.len() == limit {
                        break;
                    }
                    if let Some(resource) = catalog.resource(*rid) {
                        out.push(resource);
                    }
                }
            }
            Some(name) => {
                let index = catalog
                    .index(name)
                    .ok_or_else(|| QueryError::BadSort(format!("no such index: '{}'", name)))?;
                let sorted = index
                    .sorted()
                    .ok_or_else(|| QueryError::BadSort(format!("index '{}' not sortable", name)))?;
                for rid in sorted {
                    if out.len() == limit {
                        break;
                    }
                    if data.contains(&rid) {
                        if let Some(resource) = catalog.resource(rid) {
                            out.push(resource);
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

static EMPTY: RidSet = RidSet::new();

fn eval<R: Resource>(catalog: &Catalog<R>, query: &Query) -> QueryResult<RidSet> {
    let index = catalog
        .index(&query.index)
        .ok_or_else(|| QueryError::BadQuery(format!("unknown index: '{}'", query.index)))?;
    Ok(index.search(&query.search, &query.arg)?)
}

/// Split a constraint into index, optional search, optional argument.
/// The argument is everything after the second split, so it may itself
/// contain spaces (path level windows rely on this).
fn parse(constraint: &str) -> QueryResult<(String, Option<String>, Option<String>)> {
    let trimmed = constraint.trim();
    if trimmed.is_empty() {
        return Err(QueryError::BadQuery(format!(
            "bad constraint: '{}'",
            constraint
        )));
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let index = parts.next().unwrap_or_default().to_string();
    let rest = parts.next().map(str::trim_start).unwrap_or_default();
    if rest.is_empty() {
        return Ok((index, None, None));
    }
    let mut parts = rest.splitn(2, char::is_whitespace);
    let search = parts.next().unwrap_or_default().to_string();
    let arg = parts
        .next()
        .map(str::trim_start)
        .filter(|arg| !arg.is_empty())
        .map(str::to_string);
    Ok((index, Some(search), arg))
}

/// Parse and resolve a constraint against the catalog.
fn validate<R: Resource>(catalog: &Catalog<R>, constraint: &str) -> QueryResult<Query> {
    let (index_name, search, arg) = parse(constraint)?;
    let index = catalog
        .index(&index_name)
        .ok_or_else(|| QueryError::BadQuery(format!("unknown index: '{}'", index_name)))?;
    let search = search.unwrap_or_else(|| index.default_search().to_string());
    if !index.searches().contains(&search.as_str()) {
        return Err(QueryError::BadQuery(format!(
            "unknown search type '{}' for index '{}'",
            search, index_name
        )));
    }
    Ok(Query {
        index: index_name,
        search,
        arg: arg.unwrap_or_default(),
    })
}
