// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Applies one write batch to a view.
//!
//! A transaction works on a private copy of the published index state.
//! Nothing becomes visible before [`MaintenanceTransaction::commit`], and
//! dropping the transaction at any earlier point discards the copy.

use std::{
	collections::HashSet,
	fmt::{Display, Formatter},
};

use indexmap::IndexMap;
use parking_lot::MutexGuard;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};
use viewdb_core::{
	ChangeKind, CommitVersion, Diagnostic, Result, Row, RowId, RowInputs,
	interface::{RowFailure, RowSource},
};
use viewdb_type::{
	error,
	error::diagnostic::{
		store::row_read_failed,
		view::{grouping_failed, invalid_group, invalid_state},
	},
	return_error,
};

use crate::{
	BatchRows, Edge, Fault, GroupIndex, Location, MaterializedView, OrderingEngine, OrderingStats, Placement,
	Subject, ViewChange, ViewChangeKind, ViewExtension, classify::Recompute,
};

/// Live states of a maintenance transaction. `commit` consumes the
/// transaction, so the committed state has no value of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceState {
	Collecting,
	Classifying,
	Applying,
}

impl Display for MaintenanceState {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Collecting => "collecting",
			Self::Classifying => "classifying",
			Self::Applying => "applying",
		})
	}
}

/// Outcome of a committed batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceReport {
	pub version: CommitVersion,
	/// Rows excluded from the view because a callback failed for them.
	pub failures: Vec<RowFailure>,
	pub stats: OrderingStats,
}

/// Everything a view publishes at commit.
#[derive(Debug, Clone, Default)]
pub(crate) struct IndexState {
	pub(crate) index: GroupIndex,
	/// Rows excluded after a callback failure. Their next change recomputes
	/// group and position regardless of what it touched.
	pub(crate) failed: HashSet<RowId>,
	pub(crate) hint: Option<Edge>,
}

#[derive(Debug, Clone)]
struct Step {
	id: RowId,
	change: ChangeKind,
	recompute: Recompute,
}

pub struct MaintenanceTransaction<'v> {
	view: &'v MaterializedView,
	writer: MutexGuard<'v, ()>,
	/// Builds the index from nothing; publishing restarts the change log.
	fresh: bool,
	state: MaintenanceState,
	applied: bool,
	staged: IndexState,
	collected: IndexMap<RowId, ChangeKind>,
	plan: Vec<Step>,
	log: Vec<ViewChange>,
	failures: Vec<RowFailure>,
	stats: OrderingStats,
}

impl<'v> MaintenanceTransaction<'v> {
	pub(crate) fn new(
		view: &'v MaterializedView,
		writer: MutexGuard<'v, ()>,
		staged: IndexState,
		fresh: bool,
	) -> Self {
		Self {
			view,
			writer,
			fresh,
			state: MaintenanceState::Collecting,
			applied: false,
			staged,
			collected: IndexMap::new(),
			plan: Vec::new(),
			log: Vec::new(),
			failures: Vec::new(),
			stats: OrderingStats::default(),
		}
	}

	pub fn state(&self) -> MaintenanceState {
		self.state
	}

	/// The staged index, including edits applied so far.
	pub fn index(&self) -> &GroupIndex {
		&self.staged.index
	}

	/// View changes produced by `apply`, in order.
	pub fn changes(&self) -> &[ViewChange] {
		&self.log
	}

	pub fn failures(&self) -> &[RowFailure] {
		&self.failures
	}

	pub fn stats(&self) -> OrderingStats {
		self.stats
	}

	/// Records a change of `id`. Several changes of the same row merge into
	/// one.
	pub fn collect(&mut self, id: &RowId, change: ChangeKind) -> Result<()> {
		self.expect_state("collect", MaintenanceState::Collecting)?;

		match self.collected.get(id).copied() {
			None => {
				self.collected.insert(id.clone(), change);
			}
			Some(previous) => match previous.merge(change) {
				Some(merged) => {
					self.collected.insert(id.clone(), merged);
				}
				None => {
					self.collected.shift_remove(id);
				}
			},
		}

		Ok(())
	}

	/// Decides for every collected row whether its group or position has to
	/// be recomputed.
	#[instrument(name = "view::maintenance::classify", level = "trace", skip(self), fields(rows = self.collected.len()))]
	pub fn classify(&mut self) -> Result<()> {
		self.expect_state("classify", MaintenanceState::Collecting)?;

		let view = self.view;
		let extension = view.extension();

		self.plan = self
			.collected
			.iter()
			.map(|(id, change)| {
				let recompute = Recompute::of(*change, extension);
				trace!(row = %id, ?change, group = recompute.group, order = recompute.order, "classified");
				Step {
					id: id.clone(),
					change: *change,
					recompute,
				}
			})
			.collect();

		self.state = MaintenanceState::Classifying;
		Ok(())
	}

	/// Applies the classified changes to the staged index.
	///
	/// `before` holds the rows as they were when the batch started and
	/// `after` as they are at its end. A callback failure excludes the row and
	/// is returned; storage and consistency failures abort the batch.
	#[instrument(name = "view::maintenance::apply", level = "debug", skip_all, fields(rows = self.plan.len()))]
	pub fn apply(&mut self, before: &dyn RowSource, after: &dyn RowSource) -> Result<Vec<RowFailure>> {
		self.expect_state("apply", MaintenanceState::Classifying)?;
		self.state = MaintenanceState::Applying;

		let view = self.view;
		let extension = view.extension();
		let plan = std::mem::take(&mut self.plan);
		let mut pending: HashSet<RowId> = plan.iter().map(|step| step.id.clone()).collect();
		let mut engine = OrderingEngine::new(extension, self.staged.hint);

		for step in &plan {
			pending.remove(&step.id);
			let rows = BatchRows::new(before, after, &pending);

			match self.process(extension, &mut engine, &rows, step) {
				Ok(()) => {}
				Err(Fault::Row(diagnostic)) => self.exclude(&step.id, diagnostic)?,
				Err(Fault::Batch(err)) => {
					tracing::error!(row = %step.id, code = %err.code, "batch aborted: {}", err.message);
					return Err(err);
				}
			}
		}

		self.staged.hint = engine.hint();
		self.stats.merge(engine.stats());

		if view.config().verify_consistency {
			if let Err(err) = self.staged.index.verify() {
				tracing::error!(code = %err.code, "index inconsistent after batch: {}", err.message);
				return Err(err);
			}
		}

		self.applied = true;
		debug!(
			inserted = self.count(ViewChangeKind::Insert),
			removed = self.count(ViewChangeKind::Remove),
			moved = self.count(ViewChangeKind::Move),
			updated = self.count(ViewChangeKind::Update),
			failed = self.failures.len(),
			comparisons = self.stats.comparisons,
			"batch applied"
		);

		Ok(self.failures.clone())
	}

	/// Publishes the staged index as `version`.
	#[instrument(name = "view::maintenance::commit", level = "debug", skip(self), fields(version = %version))]
	pub fn commit(self, version: CommitVersion) -> Result<MaintenanceReport> {
		if self.state != MaintenanceState::Applying || !self.applied {
			return_error!(invalid_state("commit", &self.state.to_string()));
		}

		let Self {
			view,
			writer,
			fresh,
			staged,
			log,
			failures,
			stats,
			..
		} = self;

		let report = MaintenanceReport {
			version,
			failures,
			stats,
		};

		view.publish(staged, version, log, report.clone(), fresh);
		drop(writer);

		Ok(report)
	}

	/// Discards the staged edits.
	#[instrument(name = "view::maintenance::rollback", level = "debug", skip(self), fields(state = %self.state))]
	pub fn rollback(self) {
		debug!(rows = self.collected.len(), changes = self.log.len(), "staged edits discarded");
	}

	fn expect_state(&self, operation: &str, expected: MaintenanceState) -> Result<()> {
		if self.state != expected {
			return_error!(invalid_state(operation, &self.state.to_string()));
		}
		Ok(())
	}

	fn count(&self, kind: ViewChangeKind) -> usize {
		self.log.iter().filter(|change| change.kind == kind).count()
	}

	fn process(
		&mut self,
		extension: &ViewExtension,
		engine: &mut OrderingEngine<'_>,
		rows: &BatchRows<'_>,
		step: &Step,
	) -> std::result::Result<(), Fault> {
		let id = &step.id;
		let mut location = self.staged.index.lookup(id);
		let retry = self.staged.failed.remove(id);

		if step.change == ChangeKind::Remove {
			if let Some(location) = location {
				self.remove(id, location)?;
			}
			return Ok(());
		}

		// a re-created row leaves and joins again under a fresh stamp
		if step.change == ChangeKind::Replace {
			if let Some(previous) = location.take() {
				self.remove(id, previous)?;
			}
		}

		let recompute = if location.is_none() && retry {
			Recompute::ALL
		} else {
			step.recompute
		};

		let Some(location) = location else {
			if !recompute.group {
				trace!(row = %id, "excluded row unaffected");
				return Ok(());
			}

			let row = read(extension, rows, id)?;
			let Some(group) = group_of(extension, id, row.as_ref())? else {
				return Ok(());
			};

			let subject = Subject {
				id,
				row: row.as_ref(),
			};
			let stamp = self.staged.index.next_stamp();
			let position = engine.locate(&self.staged.index, rows, &group, subject, stamp)?;
			self.staged.index.insert(&group, position, id.clone(), stamp)?;
			self.log.push(ViewChange::insert(id.clone(), group, position));
			return Ok(());
		};

		if recompute.is_noop() {
			trace!(row = %id, "change cannot affect group or order");
			self.log.push(ViewChange::update(id.clone(), location.group, location.position));
			return Ok(());
		}

		let row = read(extension, rows, id)?;
		let subject = Subject {
			id,
			row: row.as_ref(),
		};

		let group = if recompute.group {
			group_of(extension, id, row.as_ref())?
		} else {
			Some(location.group.clone())
		};

		match group {
			None => self.remove(id, location)?,
			Some(group) if group != location.group => {
				let stamp = self.staged.index.next_stamp();
				let position = engine.locate(&self.staged.index, rows, &group, subject, stamp)?;
				self.staged.index.remove_at(&location.group, location.position)?;
				self.staged.index.insert(&group, position, id.clone(), stamp)?;
				self.log.push(ViewChange::moved(id.clone(), location, group, position));
			}
			Some(group) if !recompute.order => {
				self.log.push(ViewChange::update(id.clone(), group, location.position));
			}
			Some(group) => match engine.reposition(&mut self.staged.index, rows, &group, subject)? {
				Placement::Unchanged(position) => {
					self.log.push(ViewChange::update(id.clone(), group, position));
				}
				Placement::Moved {
					from,
					to,
				} => {
					let origin = Location {
						group: group.clone(),
						position: from,
					};
					self.log.push(ViewChange::moved(id.clone(), origin, group, to));
				}
			},
		}

		Ok(())
	}

	fn remove(&mut self, id: &RowId, location: Location) -> Result<()> {
		self.staged.index.remove_at(&location.group, location.position)?;
		self.log.push(ViewChange::remove(id.clone(), location.group, location.position));
		Ok(())
	}

	fn exclude(&mut self, id: &RowId, diagnostic: Diagnostic) -> Result<()> {
		warn!(row = %id, code = %diagnostic.code, "row excluded from view: {}", diagnostic.message);

		if let Some(location) = self.staged.index.lookup(id) {
			self.remove(id, location)?;
		}

		self.staged.failed.insert(id.clone());
		self.failures.push(RowFailure {
			row: id.clone(),
			diagnostic,
		});
		Ok(())
	}
}

/// The row as of the end of the batch, if any callback reads it.
fn read(extension: &ViewExtension, rows: &BatchRows<'_>, id: &RowId) -> std::result::Result<Option<Row>, Fault> {
	if !extension.reads_row() {
		return Ok(None);
	}

	match rows.current(id)? {
		Some(row) => Ok(Some(row)),
		None => Err(Fault::Batch(error!(row_read_failed(&id.to_string(), "changed row is missing from storage")))),
	}
}

fn group_of(extension: &ViewExtension, id: &RowId, row: Option<&Row>) -> std::result::Result<Option<String>, Fault> {
	let inputs = RowInputs::restrict(row, extension.grouping_dependency());

	match extension.grouping().invoke(id, inputs) {
		Ok(Some(group)) if group.is_empty() => Err(Fault::Row(invalid_group(&id.to_string()))),
		Ok(group) => Ok(group),
		Err(err) => {
			let reason = err.message.clone();
			Err(Fault::Row(grouping_failed(&id.to_string(), reason).with_cause(err.diagnostic())))
		}
	}
}
