// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! Materialized, grouped and sorted projections of a collection/key/value
//! store.
//!
//! A [`ViewExtension`] holds a grouping and a sorting callback, each with the
//! [`Dependency`] it reads. A [`MaterializedView`] keeps the resulting
//! [`GroupIndex`] consistent with the store, one write batch at a time, through
//! a [`MaintenanceTransaction`].

mod callback;
mod change;
pub mod classify;
mod config;
mod extension;
mod index;
mod maintenance;
mod ordering;
mod rows;
mod snapshot;
mod view;

pub use callback::{Grouping, Sorting};
pub use change::{ViewChange, ViewChangeKind, replay};
pub use config::ViewConfig;
pub use extension::{ViewBuilder, ViewExtension};
pub use index::{GroupIndex, Location};
pub use maintenance::{MaintenanceReport, MaintenanceState, MaintenanceTransaction};
pub use ordering::{Edge, Fault, OrderingEngine, OrderingStats, Placement, Subject};
pub use rows::BatchRows;
pub use snapshot::ViewSnapshot;
pub use view::MaterializedView;
pub use viewdb_core::{ChangeKind, Dependency, Result, RowInputs};
