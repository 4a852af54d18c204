// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cmp::Ordering, iter::Peekable, vec};

use indexmap::IndexMap;
use parking_lot::MutexGuard;
use tracing::{debug, instrument, warn};
use viewdb_core::{
	ChangeKind, CommitVersion, Result, Row, RowId, Value,
	interface::{Extension, ExtensionTransaction, RowFailure, RowIter, RowSource},
};
use viewdb_type::{error::diagnostic::store::invalid_row_id, return_error};

use crate::{
	Store,
	store::Committed,
	transaction::Commit,
};

/// A write batch.
///
/// Reads see the batch's own writes. Nothing is visible to other readers
/// before [`CommandTransaction::commit`]; dropping the transaction discards
/// it.
pub struct CommandTransaction<'a> {
	store: &'a Store,
	_writer: MutexGuard<'a, ()>,
	base: Committed,
	/// Latest write per row, `None` for a removal.
	writes: IndexMap<RowId, Option<Row>>,
	/// Merged change per row, relative to `base`.
	changes: IndexMap<RowId, ChangeKind>,
}

impl<'a> CommandTransaction<'a> {
	pub(crate) fn new(store: &'a Store, writer: MutexGuard<'a, ()>, base: Committed) -> Self {
		Self {
			store,
			_writer: writer,
			base,
			writes: IndexMap::new(),
			changes: IndexMap::new(),
		}
	}

	/// Version the batch started from.
	pub fn version(&self) -> CommitVersion {
		self.base.version
	}

	pub fn get(&self, id: &RowId) -> Option<Row> {
		match self.writes.get(id) {
			Some(write) => write.clone(),
			None => self.base.rows.get(id).cloned(),
		}
	}

	pub fn contains(&self, id: &RowId) -> bool {
		self.get(id).is_some()
	}

	/// Changes recorded so far, merged per row.
	pub fn changes(&self) -> impl Iterator<Item = (&RowId, ChangeKind)> {
		self.changes.iter().map(|(id, change)| (id, *change))
	}

	/// Writes payload and metadata of `id`, inserting the row if needed.
	pub fn set(&mut self, id: RowId, payload: Value, metadata: Value) -> Result<()> {
		validate(&id)?;
		let change = if self.contains(&id) {
			ChangeKind::Update
		} else {
			ChangeKind::Insert
		};
		self.write(id, Some(Row::new(payload, metadata)), change);
		Ok(())
	}

	/// Replaces the payload of `id` and keeps its metadata. A missing row is
	/// inserted without metadata.
	pub fn set_payload(&mut self, id: RowId, payload: Value) -> Result<()> {
		validate(&id)?;
		let (row, change) = match self.get(&id) {
			Some(existing) => (existing.with_payload(payload), ChangeKind::UpdatePayload),
			None => (Row::new(payload, Value::Null), ChangeKind::Insert),
		};
		self.write(id, Some(row), change);
		Ok(())
	}

	/// Replaces the metadata of `id` and keeps its payload. A missing row is
	/// inserted with a null payload.
	pub fn set_metadata(&mut self, id: RowId, metadata: Value) -> Result<()> {
		validate(&id)?;
		let (row, change) = match self.get(&id) {
			Some(existing) => (existing.with_metadata(metadata), ChangeKind::UpdateMetadata),
			None => (Row::new(Value::Null, metadata), ChangeKind::Insert),
		};
		self.write(id, Some(row), change);
		Ok(())
	}

	/// Removes `id`. Returns whether it existed.
	pub fn remove(&mut self, id: &RowId) -> bool {
		if !self.contains(id) {
			return false;
		}
		self.write(id.clone(), None, ChangeKind::Remove);
		true
	}

	/// Removes every row of `collection`. Returns the number removed.
	pub fn remove_collection(&mut self, collection: &str) -> usize {
		let ids: Vec<RowId> = self.live(Some(collection)).map(|(id, _)| id).collect();
		for id in &ids {
			self.write(id.clone(), None, ChangeKind::Remove);
		}
		ids.len()
	}

	/// Removes every row. Returns the number removed.
	pub fn remove_all(&mut self) -> usize {
		let ids: Vec<RowId> = self.live(None).map(|(id, _)| id).collect();
		for id in &ids {
			self.write(id.clone(), None, ChangeKind::Remove);
		}
		ids.len()
	}

	/// Runs every extension over the batch, then publishes rows and extension
	/// state as the next version. If any extension fails, nothing is
	/// published.
	#[instrument(name = "store::command::commit", level = "debug", skip(self), fields(store = %self.store.config().name, changes = self.changes.len()))]
	pub fn commit(self) -> Result<Commit> {
		if self.changes.is_empty() {
			debug!("empty batch");
			return Ok(Commit {
				version: self.base.version,
				failures: vec![],
			});
		}

		let version = self.base.version.next();
		let extensions = self.store.extensions();

		let mut prepared: Vec<(&str, Box<dyn ExtensionTransaction + '_>)> = Vec::with_capacity(extensions.len());
		let mut failures = Vec::new();

		for (name, extension) in &extensions {
			match self.prepare(extension.as_ref()) {
				Ok((txn, failed)) => {
					failures.extend(failed.into_iter().map(|failure| (name.clone(), failure)));
					prepared.push((name.as_str(), txn));
				}
				Err(err) => {
					warn!(extension = %name, code = %err.code, "batch discarded: {}", err.message);
					for (_, txn) in prepared {
						txn.rollback();
					}
					return Err(err);
				}
			}
		}

		let Self {
			store,
			_writer: writer,
			base,
			writes,
			..
		} = self;
		drop(base);
		store.publish(version, writes);

		for (name, txn) in prepared {
			if let Err(err) = txn.commit(version) {
				tracing::error!(extension = name, code = %err.code, "extension failed to publish: {}", err.message);
				return Err(err);
			}
		}

		drop(writer);
		debug!(version = %version, failed = failures.len(), "batch committed");

		Ok(Commit {
			version,
			failures,
		})
	}

	/// Discards the batch.
	pub fn rollback(self) {
		debug!(changes = self.changes.len(), "batch rolled back");
	}

	fn prepare<'e>(
		&self,
		extension: &'e dyn Extension,
	) -> Result<(Box<dyn ExtensionTransaction + 'e>, Vec<RowFailure>)> {
		let mut txn = extension.begin()?;

		let collected = self.changes.iter().try_for_each(|(id, change)| txn.collect(id, *change));
		let failures = collected.and_then(|()| txn.prepare(&self.base.rows, self));

		match failures {
			Ok(failures) => Ok((txn, failures)),
			Err(err) => {
				txn.rollback();
				Err(err)
			}
		}
	}

	fn write(&mut self, id: RowId, row: Option<Row>, change: ChangeKind) {
		match self.changes.get(&id).copied() {
			None => {
				self.changes.insert(id.clone(), change);
			}
			Some(previous) => match previous.merge(change) {
				Some(merged) => {
					self.changes.insert(id.clone(), merged);
				}
				None => {
					self.changes.shift_remove(&id);
				}
			},
		}
		self.writes.insert(id, row);
	}

	/// Rows as the batch currently sees them, optionally of one collection,
	/// in identifier order.
	fn live(&self, collection: Option<&str>) -> RowIter<'_> {
		let mut writes: Vec<_> =
			self.writes.iter().filter(|(id, _)| collection.is_none_or(|c| id.collection() == c)).collect();
		writes.sort_by(|(a, _), (b, _)| a.cmp(b));
		let writes = writes.into_iter().peekable();

		match collection {
			Some(collection) => Box::new(Overlay {
				base: self.base.rows.collection(collection).peekable(),
				writes,
			}),
			None => Box::new(Overlay {
				base: self.base.rows.iter().peekable(),
				writes,
			}),
		}
	}
}

/// Committed rows with a batch's writes laid over them. Both sides are
/// ordered by identifier; a write shadows the committed row it names.
struct Overlay<'a, B: Iterator<Item = (&'a RowId, &'a Row)>> {
	base: Peekable<B>,
	writes: Peekable<vec::IntoIter<(&'a RowId, &'a Option<Row>)>>,
}

impl<'a, B: Iterator<Item = (&'a RowId, &'a Row)>> Iterator for Overlay<'a, B> {
	type Item = (RowId, Row);

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let step = match (self.base.peek(), self.writes.peek()) {
				(None, None) => return None,
				(Some(_), None) => Ordering::Less,
				(None, Some(_)) => Ordering::Greater,
				(Some((base, _)), Some((write, _))) => base.cmp(write),
			};

			match step {
				Ordering::Less => {
					let (id, row) = self.base.next()?;
					return Some((id.clone(), row.clone()));
				}
				Ordering::Equal => {
					self.base.next();
				}
				Ordering::Greater => {}
			}

			// removed rows yield nothing
			if let (id, Some(row)) = self.writes.next()? {
				return Some((id.clone(), row.clone()));
			}
		}
	}
}

impl RowSource for CommandTransaction<'_> {
	fn read_row(&self, id: &RowId) -> Result<Option<Row>> {
		Ok(self.get(id))
	}

	fn scan(&self) -> Result<RowIter<'_>> {
		Ok(self.live(None))
	}

	fn scan_collection(&self, collection: &str) -> Result<RowIter<'_>> {
		Ok(self.live(Some(collection)))
	}
}

fn validate(id: &RowId) -> Result<()> {
	if id.collection().is_empty() || id.key().is_empty() {
		return_error!(invalid_row_id(id.collection(), id.key()));
	}
	Ok(())
}
