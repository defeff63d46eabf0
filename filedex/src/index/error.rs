// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the index family

use thiserror::Error;

use super::Rid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The value does not meet the index's type or shape constraints.
    #[error("bad value: {0}")]
    BadValue(String),

    /// The rid has no associations in this index.
    #[error("no associations for rid {0}")]
    UnknownRid(Rid),

    /// A search argument is malformed.
    #[error("malformed search argument: {0}")]
    BadArg(String),

    /// The search name is not in this index's dispatch table.
    #[error("unknown search '{search}' for index type '{kind}'")]
    UnknownSearch { search: String, kind: &'static str },
}

pub type IndexResult<T> = Result<T, IndexError>;
