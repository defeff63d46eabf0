// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistence façade
//!
//! This module provides:
//! - Storage address parsing (`file://`, `net://`)
//! - The database handle with lock-sentinel handling and catalog bootstrap
//! - Per-thread connections with commit/abort snapshot semantics

mod address;
mod database;
mod error;

pub use address::Address;
pub use database::{Connection, Database};
pub use error::{StoreError, StoreResult};
