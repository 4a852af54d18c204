// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashSet;

use viewdb_core::{Result, Row, RowId, interface::RowSource};

/// Row reads during a maintenance batch.
///
/// Rows the batch changed but the view has not processed yet still sit where
/// their previous inputs put them, so comparisons against them use the state
/// before the batch. Everything else reads the state after the batch.
pub struct BatchRows<'a> {
	before: &'a dyn RowSource,
	after: &'a dyn RowSource,
	pending: Option<&'a HashSet<RowId>>,
}

impl<'a> BatchRows<'a> {
	pub fn new(before: &'a dyn RowSource, after: &'a dyn RowSource, pending: &'a HashSet<RowId>) -> Self {
		Self {
			before,
			after,
			pending: Some(pending),
		}
	}

	/// Reads for an index that already reflects every row in `rows`.
	pub fn settled(rows: &'a dyn RowSource) -> Self {
		Self {
			before: rows,
			after: rows,
			pending: None,
		}
	}

	/// The row's inputs as of the end of the batch.
	pub fn current(&self, id: &RowId) -> Result<Option<Row>> {
		self.after.read_row(id)
	}

	/// The inputs that determined the row's current position in the index.
	pub fn member(&self, id: &RowId) -> Result<Option<Row>> {
		match self.pending {
			Some(pending) if pending.contains(id) => self.before.read_row(id),
			_ => self.after.read_row(id),
		}
	}
}
