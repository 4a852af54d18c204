// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use viewdb_type::{Result, RowId};

use crate::Row;

pub type RowIter<'a> = Box<dyn Iterator<Item = (RowId, Row)> + 'a>;

/// Read access to the rows of the underlying store.
///
/// During a write batch the source reflects the batch's own writes.
pub trait RowSource {
	fn read_row(&self, id: &RowId) -> Result<Option<Row>>;

	/// All rows, ordered by identifier.
	fn scan(&self) -> Result<RowIter<'_>>;

	/// All rows of one collection, ordered by key.
	fn scan_collection(&self, collection: &str) -> Result<RowIter<'_>>;
}

impl<T: RowSource + ?Sized> RowSource for &T {
	fn read_row(&self, id: &RowId) -> Result<Option<Row>> {
		(**self).read_row(id)
	}

	fn scan(&self) -> Result<RowIter<'_>> {
		(**self).scan()
	}

	fn scan_collection(&self, collection: &str) -> Result<RowIter<'_>> {
		(**self).scan_collection(collection)
	}
}
