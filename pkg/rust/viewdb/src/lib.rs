// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod presets;

pub use presets::*;
pub use viewdb_core as core;
pub use viewdb_core::{ChangeKind, CommitVersion, Dependency, Error, Result, Row, RowId, RowInputs, Value};
pub use viewdb_store as store;
pub use viewdb_store::{CommandTransaction, Commit, QueryTransaction, Store, StoreConfig};
pub use viewdb_type as r#type;
pub use viewdb_view as view;
pub use viewdb_view::{
	Grouping, Location, MaintenanceReport, MaterializedView, Sorting, ViewBuilder, ViewChange, ViewChangeKind,
	ViewConfig, ViewExtension, ViewSnapshot,
};
