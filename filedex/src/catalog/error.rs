// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog and crawler

use thiserror::Error;

use crate::index::IndexError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("root doesn't point to a directory: {0}")]
    NotADirectory(String),

    /// A filesystem read failed for one path.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
