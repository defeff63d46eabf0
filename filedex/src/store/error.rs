// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the persistence façade

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage address string could not be parsed or points at
    /// something unusable.
    #[error("bad storage address: {0}")]
    BadAddress(String),

    /// Another process holds the database open.
    #[error("database is locked by another process: {0}")]
    Locked(String),

    /// The database holds no catalog and no factory was provided.
    #[error("catalog not in the database, and no catalog factory provided")]
    MissingCatalog,

    /// The address form is valid but this build cannot serve it.
    #[error("unsupported storage address: {0}")]
    Unsupported(String),

    /// Storage backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Snapshot (de)serialization failure.
    #[error("snapshot encoding error: {0}")]
    Codec(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
