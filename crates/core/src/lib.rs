// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod change;
mod dependency;
pub mod interface;
mod row;

pub use change::ChangeKind;
pub use dependency::{Dependency, RowInputs};
pub use row::Row;
pub use viewdb_type::{CommitVersion, CowVec, Diagnostic, Error, Result, RowId, Value};
