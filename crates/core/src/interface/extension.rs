// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use serde::{Deserialize, Serialize};
use viewdb_type::{CommitVersion, Diagnostic, Result, RowId};

use crate::{ChangeKind, interface::RowSource};

/// A row that an extension could not process in a batch.
///
/// Failures never abort the batch; they are reported next to a successful
/// commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
	pub row: RowId,
	pub diagnostic: Diagnostic,
}

/// Something the store keeps consistent with its rows.
///
/// The store owns registered extensions by name. Each write batch opens one
/// [`ExtensionTransaction`] per extension, inside the store's write
/// transaction.
pub trait Extension: Send + Sync + 'static {
	/// Builds the extension's state from the rows present at `version`.
	fn attach(&self, rows: &dyn RowSource, version: CommitVersion) -> Result<Vec<RowFailure>>;

	/// Tears down all state built since `attach`.
	fn detach(&self);

	fn begin(&self) -> Result<Box<dyn ExtensionTransaction + '_>>;

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// One extension's share of a store write transaction.
pub trait ExtensionTransaction {
	fn collect(&mut self, row: &RowId, change: ChangeKind) -> Result<()>;

	/// Computes all edits for the collected changes without publishing them.
	///
	/// `before` reads the rows as of the start of the batch, `after` as of its
	/// end. Rows a callback failed for are returned.
	fn prepare(&mut self, before: &dyn RowSource, after: &dyn RowSource) -> Result<Vec<RowFailure>>;

	/// Publishes the prepared edits as `version`.
	fn commit(self: Box<Self>, version: CommitVersion) -> Result<()>;

	/// Discards everything collected and prepared.
	fn rollback(self: Box<Self>);
}
