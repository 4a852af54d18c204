// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{BTreeMap, VecDeque},
	sync::Arc,
};

use serde::{Deserialize, Serialize};
use viewdb_core::{CommitVersion, Result, RowId};
use viewdb_type::{
	error::diagnostic::view::{changes_unavailable, unknown_version},
	return_error, return_internal_error,
};

use crate::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewChangeKind {
	Insert,
	Remove,
	Move,
	Update,
}

/// One edit of the view.
///
/// Positions are sequential: each change is expressed against the view as
/// left by the changes before it. A `Move` carries the location it left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewChange {
	pub row: RowId,
	pub group: String,
	pub position: usize,
	pub kind: ViewChangeKind,
	pub origin: Option<Location>,
}

impl ViewChange {
	pub fn insert(row: RowId, group: impl Into<String>, position: usize) -> Self {
		Self {
			row,
			group: group.into(),
			position,
			kind: ViewChangeKind::Insert,
			origin: None,
		}
	}

	pub fn remove(row: RowId, group: impl Into<String>, position: usize) -> Self {
		Self {
			row,
			group: group.into(),
			position,
			kind: ViewChangeKind::Remove,
			origin: None,
		}
	}

	pub fn moved(row: RowId, origin: Location, group: impl Into<String>, position: usize) -> Self {
		Self {
			row,
			group: group.into(),
			position,
			kind: ViewChangeKind::Move,
			origin: Some(origin),
		}
	}

	pub fn update(row: RowId, group: impl Into<String>, position: usize) -> Self {
		Self {
			row,
			group: group.into(),
			position,
			kind: ViewChangeKind::Update,
			origin: None,
		}
	}
}

/// Applies `changes` in order to a plain copy of the view.
pub fn replay(groups: &mut BTreeMap<String, Vec<RowId>>, changes: &[ViewChange]) -> Result<()> {
	for change in changes {
		match change.kind {
			ViewChangeKind::Insert => insert(groups, &change.group, change.position, &change.row)?,
			ViewChangeKind::Remove => remove(groups, &change.group, change.position, &change.row)?,
			ViewChangeKind::Move => {
				let Some(origin) = &change.origin else {
					return_internal_error!("move of row {} without origin", change.row);
				};
				remove(groups, &origin.group, origin.position, &change.row)?;
				insert(groups, &change.group, change.position, &change.row)?;
			}
			ViewChangeKind::Update => {
				let found = groups.get(&change.group).and_then(|s| s.get(change.position));
				if found != Some(&change.row) {
					return_internal_error!(
						"update of row {} expected at position {} of group '{}'",
						change.row,
						change.position,
						change.group
					);
				}
			}
		}
	}

	Ok(())
}

fn insert(groups: &mut BTreeMap<String, Vec<RowId>>, group: &str, position: usize, row: &RowId) -> Result<()> {
	let sequence = groups.entry(group.to_string()).or_default();
	if position > sequence.len() {
		return_internal_error!("replayed insert of {} at {} past the end of group '{}'", row, position, group);
	}
	sequence.insert(position, row.clone());
	Ok(())
}

fn remove(groups: &mut BTreeMap<String, Vec<RowId>>, group: &str, position: usize, row: &RowId) -> Result<()> {
	let Some(sequence) = groups.get_mut(group) else {
		return_internal_error!("replayed remove of {} from unknown group '{}'", row, group);
	};

	if sequence.get(position) != Some(row) {
		return_internal_error!("replayed remove of {} expected it at {} of group '{}'", row, position, group);
	}

	sequence.remove(position);
	if sequence.is_empty() {
		groups.remove(group);
	}
	Ok(())
}

/// Committed batches of view changes, bounded by a retention count.
#[derive(Debug, Clone)]
pub(crate) struct ChangeLog {
	retention: usize,
	/// Oldest version changes can still be derived from.
	floor: CommitVersion,
	batches: VecDeque<(CommitVersion, Arc<[ViewChange]>)>,
}

impl ChangeLog {
	pub(crate) fn new(retention: usize, floor: CommitVersion) -> Self {
		Self {
			retention,
			floor,
			batches: VecDeque::new(),
		}
	}

	/// Forgets every batch. Changes are derivable from `floor` on.
	pub(crate) fn reset(&mut self, floor: CommitVersion) {
		self.floor = floor;
		self.batches.clear();
	}

	pub(crate) fn floor(&self) -> CommitVersion {
		self.floor
	}

	pub(crate) fn push(&mut self, version: CommitVersion, changes: Vec<ViewChange>) {
		if changes.is_empty() {
			return;
		}

		self.batches.push_back((version, changes.into()));

		while self.batches.len() > self.retention {
			if let Some((evicted, _)) = self.batches.pop_front() {
				self.floor = evicted;
			}
		}
	}

	/// All changes committed after `since`, in commit order.
	pub(crate) fn since(&self, since: CommitVersion, current: CommitVersion) -> Result<Vec<ViewChange>> {
		if since > current {
			return_error!(unknown_version(since, current));
		}

		if since < self.floor {
			return_error!(changes_unavailable(since, self.floor));
		}

		Ok(self
			.batches
			.iter()
			.filter(|(version, _)| *version > since)
			.flat_map(|(_, changes)| changes.iter().cloned())
			.collect())
	}
}
