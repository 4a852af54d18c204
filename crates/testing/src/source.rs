// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use viewdb_core::{
	Result, Row, RowId,
	interface::{RowIter, RowSource},
};
use viewdb_type::{error::diagnostic::store::row_read_failed, return_error};

/// Rows held in a sorted map.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	rows: BTreeMap<RowId, Row>,
}

impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn put(&mut self, id: RowId, payload: Value, metadata: Value) {
		self.rows.insert(id, Row::new(payload, metadata));
	}

	pub fn insert(&mut self, id: RowId, row: Row) {
		self.rows.insert(id, row);
	}

	pub fn get(&self, id: &RowId) -> Option<Row> {
		self.rows.get(id).cloned()
	}

	pub fn remove(&mut self, id: &RowId) -> Option<Row> {
		self.rows.remove(id)
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn ids(&self) -> impl Iterator<Item = &RowId> {
		self.rows.keys()
	}
}

impl RowSource for MemorySource {
	fn read_row(&self, id: &RowId) -> Result<Option<Row>> {
		Ok(self.get(id))
	}

	fn scan(&self) -> Result<RowIter<'_>> {
		Ok(Box::new(self.rows.iter().map(|(id, row)| (id.clone(), row.clone()))))
	}

	fn scan_collection(&self, collection: &str) -> Result<RowIter<'_>> {
		let collection = collection.to_string();
		Ok(Box::new(
			self.rows
				.iter()
				.filter(move |(id, _)| id.collection() == collection)
				.map(|(id, row)| (id.clone(), row.clone())),
		))
	}
}

/// Wraps a source and fails every read of the given rows.
pub struct FailingSource<S> {
	inner: S,
	failing: HashSet<RowId>,
}

impl<S: RowSource> FailingSource<S> {
	pub fn new(inner: S, failing: impl IntoIterator<Item = RowId>) -> Self {
		Self {
			inner,
			failing: failing.into_iter().collect(),
		}
	}
}

impl<S: RowSource> RowSource for FailingSource<S> {
	fn read_row(&self, id: &RowId) -> Result<Option<Row>> {
		if self.failing.contains(id) {
			return_error!(row_read_failed(&id.to_string(), "injected read failure"));
		}
		self.inner.read_row(id)
	}

	fn scan(&self) -> Result<RowIter<'_>> {
		self.inner.scan()
	}

	fn scan_collection(&self, collection: &str) -> Result<RowIter<'_>> {
		self.inner.scan_collection(collection)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn scan_collection_filters() {
		let mut source = MemorySource::new();
		source.put(RowId::new("a", "1"), json!(1), Value::Null);
		source.put(RowId::new("b", "1"), json!(2), Value::Null);
		source.put(RowId::new("a", "2"), json!(3), Value::Null);

		let keys: Vec<_> = source.scan_collection("a").unwrap().map(|(id, _)| id.to_string()).collect();
		assert_eq!(keys, vec!["a/1", "a/2"]);
		assert_eq!(source.scan().unwrap().count(), 3);
	}

	#[test]
	fn failing_source_fails_selected_rows() {
		let mut source = MemorySource::new();
		source.put(RowId::new("a", "1"), json!(1), Value::Null);
		source.put(RowId::new("a", "2"), json!(2), Value::Null);

		let failing = FailingSource::new(source, [RowId::new("a", "2")]);
		assert!(failing.read_row(&RowId::new("a", "1")).unwrap().is_some());
		assert_eq!(failing.read_row(&RowId::new("a", "2")).unwrap_err().code, "STORE_003");
	}
}
