// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use viewdb_core::{
	CommitVersion, Result, Row, RowId,
	interface::{RowIter, RowSource},
};

use crate::transaction::Rows;

/// The rows as of one committed version. Never blocks and never changes.
#[derive(Debug, Clone)]
pub struct QueryTransaction {
	version: CommitVersion,
	rows: Rows,
}

impl QueryTransaction {
	pub(crate) fn new(version: CommitVersion, rows: Rows) -> Self {
		Self {
			version,
			rows,
		}
	}

	pub fn version(&self) -> CommitVersion {
		self.version
	}

	pub fn get(&self, id: &RowId) -> Option<Row> {
		self.rows.get(id).cloned()
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.len() == 0
	}

	/// Identifiers of one collection, ordered by key.
	pub fn keys(&self, collection: &str) -> Vec<RowId> {
		self.rows.collection(collection).map(|(id, _)| id.clone()).collect()
	}
}

impl RowSource for QueryTransaction {
	fn read_row(&self, id: &RowId) -> Result<Option<Row>> {
		self.rows.read_row(id)
	}

	fn scan(&self) -> Result<RowIter<'_>> {
		self.rows.scan()
	}

	fn scan_collection(&self, collection: &str) -> Result<RowIter<'_>> {
		self.rows.scan_collection(collection)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use crate::Store;

	use super::*;

	#[test]
	fn snapshot_is_isolated_from_later_commits() {
		let store = Store::default();
		store.with_command(|tx| tx.set(RowId::new("c", "a"), json!(1), json!(null))).unwrap();

		let query = store.begin_query();
		store.with_command(|tx| tx.set(RowId::new("c", "b"), json!(2), json!(null))).unwrap();

		assert_eq!(query.version(), CommitVersion(1));
		assert_eq!(query.keys("c"), vec![RowId::new("c", "a")]);
		assert_eq!(store.begin_query().keys("c").len(), 2);
		assert_eq!(query.scan().unwrap().count(), 1);
	}
}
