// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! An in-memory collection/key/value store with write batches and
//! extensions that are kept consistent with every committed batch.

mod config;
mod store;
mod transaction;

pub use config::StoreConfig;
pub use store::Store;
pub use transaction::{CommandTransaction, Commit, QueryTransaction};
pub use viewdb_core::{Result, Row, RowId};
