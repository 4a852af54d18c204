// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	collections::{BTreeSet, HashSet},
	sync::Arc,
};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use viewdb_core::{
	ChangeKind, CommitVersion, Result, RowId,
	interface::{Extension, ExtensionTransaction, RowFailure, RowSource},
};
use viewdb_type::{
	error::diagnostic::view::{already_attached, not_attached},
	return_error,
};

use crate::{
	Edge, GroupIndex, MaintenanceReport, MaintenanceState, MaintenanceTransaction, ViewChange, ViewConfig,
	ViewExtension, ViewSnapshot, change::ChangeLog, maintenance::IndexState,
};

/// A grouped, sorted projection of a store, kept current one write batch at a
/// time.
///
/// Readers take a [`ViewSnapshot`] and never wait for a writer. Writers are
/// serialized: a [`MaintenanceTransaction`] holds the view's write lock from
/// `begin` until it commits or is dropped.
pub struct MaterializedView {
	extension: ViewExtension,
	config: ViewConfig,
	writer: Mutex<()>,
	published: RwLock<Published>,
}

struct Published {
	attached: bool,
	version: CommitVersion,
	index: Arc<GroupIndex>,
	failed: HashSet<RowId>,
	hint: Option<Edge>,
	log: ChangeLog,
	last_report: Option<MaintenanceReport>,
}

impl Published {
	fn detached(config: &ViewConfig) -> Self {
		Self {
			attached: false,
			version: CommitVersion::default(),
			index: Arc::new(GroupIndex::new()),
			failed: HashSet::new(),
			hint: None,
			log: ChangeLog::new(config.change_log_retention, CommitVersion::default()),
			last_report: None,
		}
	}
}

impl MaterializedView {
	pub fn new(extension: ViewExtension, config: ViewConfig) -> Self {
		let published = Published::detached(&config);
		Self {
			extension,
			config,
			writer: Mutex::new(()),
			published: RwLock::new(published),
		}
	}

	pub fn extension(&self) -> &ViewExtension {
		&self.extension
	}

	pub fn config(&self) -> &ViewConfig {
		&self.config
	}

	pub fn is_attached(&self) -> bool {
		self.published.read().attached
	}

	/// Version of the last committed batch.
	pub fn version(&self) -> CommitVersion {
		self.published.read().version
	}

	pub fn snapshot(&self) -> ViewSnapshot {
		let published = self.published.read();
		ViewSnapshot::new(published.version, published.index.clone())
	}

	pub fn current_groups(&self) -> BTreeSet<String> {
		self.published.read().index.groups().map(str::to_string).collect()
	}

	pub fn sequence(&self, group: &str) -> Vec<RowId> {
		self.published.read().index.sequence_of(group).map(<[RowId]>::to_vec).unwrap_or_default()
	}

	/// All view changes committed after `version`, in order. Replaying them
	/// over the snapshot taken at `version` yields the current snapshot.
	pub fn changes_since(&self, version: CommitVersion) -> Result<Vec<ViewChange>> {
		let published = self.published.read();
		if !published.attached {
			return_error!(not_attached());
		}
		published.log.since(version, published.version)
	}

	pub fn last_report(&self) -> Option<MaintenanceReport> {
		self.published.read().last_report.clone()
	}

	/// Starts maintenance for one write batch. Blocks while another batch is
	/// in flight.
	pub fn begin(&self) -> Result<MaintenanceTransaction<'_>> {
		let writer = self.writer.lock();

		let staged = {
			let published = self.published.read();
			if !published.attached {
				return_error!(not_attached());
			}
			IndexState {
				index: GroupIndex::clone(&published.index),
				failed: published.failed.clone(),
				hint: published.hint,
			}
		};

		Ok(MaintenanceTransaction::new(self, writer, staged, false))
	}

	/// Builds the view from scratch out of every row in `rows` and publishes
	/// it as `version`. The change log restarts at `version`.
	#[instrument(name = "view::rebuild", level = "debug", skip(self, rows), fields(version = %version))]
	pub fn rebuild(&self, rows: &dyn RowSource, version: CommitVersion) -> Result<Vec<RowFailure>> {
		let writer = self.writer.lock();
		let mut txn = MaintenanceTransaction::new(self, writer, IndexState::default(), true);

		for (id, _) in rows.scan()? {
			txn.collect(&id, ChangeKind::Insert)?;
		}

		txn.classify()?;
		txn.apply(rows, rows)?;
		let report = txn.commit(version)?;

		let snapshot = self.snapshot();
		info!(
			groups = snapshot.group_count(),
			rows = snapshot.total_len(),
			failed = report.failures.len(),
			"view rebuilt"
		);

		Ok(report.failures)
	}

	/// Drops all state. The view has to be attached again before use.
	#[instrument(name = "view::detach", level = "debug", skip(self))]
	pub fn detach(&self) {
		let _writer = self.writer.lock();
		*self.published.write() = Published::detached(&self.config);
	}

	pub(crate) fn publish(
		&self,
		staged: IndexState,
		version: CommitVersion,
		changes: Vec<ViewChange>,
		report: MaintenanceReport,
		fresh: bool,
	) {
		let mut published = self.published.write();

		if fresh {
			published.attached = true;
			published.log.reset(version);
		} else {
			published.log.push(version, changes);
		}

		published.version = version;
		published.index = Arc::new(staged.index);
		published.failed = staged.failed;
		published.hint = staged.hint;
		published.last_report = Some(report);

		debug!(version = %version, rows = published.index.len(), "view published");
	}
}

impl Extension for MaterializedView {
	fn attach(&self, rows: &dyn RowSource, version: CommitVersion) -> Result<Vec<RowFailure>> {
		if self.is_attached() {
			return_error!(already_attached());
		}
		self.rebuild(rows, version)
	}

	fn detach(&self) {
		MaterializedView::detach(self)
	}

	fn begin(&self) -> Result<Box<dyn ExtensionTransaction + '_>> {
		Ok(Box::new(MaterializedView::begin(self)?))
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

impl ExtensionTransaction for MaintenanceTransaction<'_> {
	fn collect(&mut self, row: &RowId, change: ChangeKind) -> Result<()> {
		MaintenanceTransaction::collect(self, row, change)
	}

	fn prepare(&mut self, before: &dyn RowSource, after: &dyn RowSource) -> Result<Vec<RowFailure>> {
		if self.state() == MaintenanceState::Collecting {
			self.classify()?;
		}
		self.apply(before, after)
	}

	fn commit(self: Box<Self>, version: CommitVersion) -> Result<()> {
		MaintenanceTransaction::commit(*self, version).map(|_| ())
	}

	fn rollback(self: Box<Self>) {
		MaintenanceTransaction::rollback(*self)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use viewdb_core::Dependency;
	use viewdb_testing::MemorySource;

	use super::*;
	use crate::{Grouping, Sorting};

	fn view() -> MaterializedView {
		let extension = ViewExtension::new(
			Grouping::with_payload(|_, p| p["kind"].as_str().map(str::to_string)),
			Dependency::Payload,
			Sorting::with_payload(|_, _, a, _, b| a["ts"].as_i64().cmp(&b["ts"].as_i64())),
			Dependency::Payload,
		)
		.unwrap();
		MaterializedView::new(extension, ViewConfig::default())
	}

	fn source() -> MemorySource {
		let mut source = MemorySource::new();
		source.put(RowId::new("posts", "a"), json!({"kind": "note", "ts": 20}), json!(null));
		source.put(RowId::new("posts", "b"), json!({"kind": "note", "ts": 10}), json!(null));
		source.put(RowId::new("posts", "c"), json!({"kind": "task", "ts": 5}), json!(null));
		source.put(RowId::new("posts", "d"), json!({"ts": 1}), json!(null));
		source
	}

	#[test]
	fn begin_requires_attach() {
		let view = view();
		assert_eq!(view.begin().err().unwrap().code, "VIEW_006");
		assert_eq!(view.changes_since(CommitVersion(0)).unwrap_err().code, "VIEW_006");
	}

	#[test]
	fn rebuild_publishes_sorted_groups() {
		let view = view();
		let failures = view.rebuild(&source(), CommitVersion(1)).unwrap();

		assert!(failures.is_empty());
		assert!(view.is_attached());
		assert_eq!(view.version(), CommitVersion(1));
		assert_eq!(view.current_groups().into_iter().collect::<Vec<_>>(), vec!["note", "task"]);
		assert_eq!(view.sequence("note"), vec![RowId::new("posts", "b"), RowId::new("posts", "a")]);
		assert!(view.changes_since(CommitVersion(1)).unwrap().is_empty());
		assert_eq!(view.changes_since(CommitVersion(0)).unwrap_err().code, "VIEW_004");
	}

	#[test]
	fn dropped_transaction_publishes_nothing() {
		let view = view();
		let before = source();
		view.rebuild(&before, CommitVersion(1)).unwrap();

		let mut after = before.clone();
		after.put(RowId::new("posts", "e"), json!({"kind": "note", "ts": 15}), json!(null));

		{
			let mut txn = view.begin().unwrap();
			txn.collect(&RowId::new("posts", "e"), ChangeKind::Insert).unwrap();
			txn.classify().unwrap();
			txn.apply(&before, &after).unwrap();
			assert_eq!(txn.index().len(), 4);
		}

		assert_eq!(view.snapshot().total_len(), 3);
		assert_eq!(view.version(), CommitVersion(1));
	}

	#[test]
	fn snapshots_survive_commits() {
		let view = view();
		let before = source();
		view.rebuild(&before, CommitVersion(1)).unwrap();
		let old = view.snapshot();

		let mut after = before.clone();
		after.remove(&RowId::new("posts", "a"));

		let mut txn = view.begin().unwrap();
		txn.collect(&RowId::new("posts", "a"), ChangeKind::Remove).unwrap();
		txn.classify().unwrap();
		txn.apply(&before, &after).unwrap();
		txn.commit(CommitVersion(2)).unwrap();

		assert_eq!(old.len("note"), 2);
		assert_eq!(view.snapshot().len("note"), 1);
		assert_eq!(view.changes_since(CommitVersion(1)).unwrap().len(), 1);
	}

	#[test]
	fn out_of_order_calls_fail() {
		let view = view();
		view.rebuild(&source(), CommitVersion(1)).unwrap();

		let mut txn = view.begin().unwrap();
		assert_eq!(txn.apply(&source(), &source()).unwrap_err().code, "VIEW_007");
		txn.classify().unwrap();
		assert_eq!(txn.collect(&RowId::new("posts", "x"), ChangeKind::Insert).unwrap_err().code, "VIEW_007");
		assert_eq!(txn.commit(CommitVersion(2)).unwrap_err().code, "VIEW_007");
	}

	#[test]
	fn states_advance_until_commit() {
		let view = view();
		view.rebuild(&source(), CommitVersion(1)).unwrap();

		let mut txn = view.begin().unwrap();
		assert_eq!(txn.state(), MaintenanceState::Collecting);
		txn.classify().unwrap();
		assert_eq!(txn.state(), MaintenanceState::Classifying);
		txn.apply(&source(), &source()).unwrap();
		assert_eq!(txn.state(), MaintenanceState::Applying);
		assert_eq!(txn.state().to_string(), "applying");

		let report = txn.commit(CommitVersion(2)).unwrap();
		assert_eq!(report.version, CommitVersion(2));
		assert_eq!(view.version(), CommitVersion(2));
		// the writer was released with the consumed transaction
		assert_eq!(view.begin().unwrap().state(), MaintenanceState::Collecting);
	}

	#[test]
	fn detach_clears_state() {
		let view = view();
		view.rebuild(&source(), CommitVersion(1)).unwrap();
		view.detach();

		assert!(!view.is_attached());
		assert!(view.snapshot().is_empty());
		assert!(view.last_report().is_none());
	}
}
