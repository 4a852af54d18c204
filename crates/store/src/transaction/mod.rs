// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeMap, sync::Arc};

use viewdb_core::{
	CommitVersion, Result, Row, RowId,
	interface::{RowFailure, RowIter, RowSource},
};

mod command;
mod query;

pub use command::CommandTransaction;
pub use query::QueryTransaction;

/// Outcome of a committed write batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
	pub version: CommitVersion,
	/// Rows an extension could not process, by extension name.
	pub failures: Vec<(String, RowFailure)>,
}

/// An immutable set of committed rows.
#[derive(Debug, Clone)]
pub(crate) struct Rows(Arc<BTreeMap<RowId, Row>>);

impl Rows {
	pub(crate) fn new(rows: Arc<BTreeMap<RowId, Row>>) -> Self {
		Self(rows)
	}

	pub(crate) fn get(&self, id: &RowId) -> Option<&Row> {
		self.0.get(id)
	}

	pub(crate) fn iter(&self) -> impl Iterator<Item = (&RowId, &Row)> {
		self.0.iter()
	}

	pub(crate) fn collection<'a>(&'a self, collection: &str) -> impl Iterator<Item = (&'a RowId, &'a Row)> + use<'a> {
		let collection = collection.to_string();
		let start = RowId::new(collection.as_str(), "");
		self.0.range(start..).take_while(move |(id, _)| id.collection() == collection)
	}

	pub(crate) fn len(&self) -> usize {
		self.0.len()
	}

	/// Applies a batch's writes, `None` removing the row. The map is copied
	/// only while a reader still holds it.
	pub(crate) fn apply(&mut self, writes: impl IntoIterator<Item = (RowId, Option<Row>)>) {
		let rows = Arc::make_mut(&mut self.0);
		for (id, write) in writes {
			match write {
				Some(row) => {
					rows.insert(id, row);
				}
				None => {
					rows.remove(&id);
				}
			}
		}
	}
}

impl RowSource for Rows {
	fn read_row(&self, id: &RowId) -> Result<Option<Row>> {
		Ok(self.get(id).cloned())
	}

	fn scan(&self) -> Result<RowIter<'_>> {
		Ok(Box::new(self.iter().map(|(id, row)| (id.clone(), row.clone()))))
	}

	fn scan_collection(&self, collection: &str) -> Result<RowIter<'_>> {
		Ok(Box::new(self.collection(collection).map(|(id, row)| (id.clone(), row.clone()))))
	}
}
