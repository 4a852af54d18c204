// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::BTreeMap,
	iter::Rev,
	ops::{Bound, RangeBounds},
	slice::Iter,
	sync::Arc,
};

use viewdb_core::{CommitVersion, RowId};

use crate::{GroupIndex, Location};

/// The view as of one committed version.
///
/// A snapshot never changes and later commits never block on it. Cloning is
/// cheap.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
	version: CommitVersion,
	index: Arc<GroupIndex>,
}

impl ViewSnapshot {
	pub(crate) fn new(version: CommitVersion, index: Arc<GroupIndex>) -> Self {
		Self {
			version,
			index,
		}
	}

	pub fn version(&self) -> CommitVersion {
		self.version
	}

	pub fn group_count(&self) -> usize {
		self.index.group_count()
	}

	/// Group names in ascending order.
	pub fn groups(&self) -> impl Iterator<Item = &str> {
		self.index.groups()
	}

	pub fn contains_group(&self, group: &str) -> bool {
		self.index.sequence_of(group).is_some()
	}

	/// Number of rows in `group`, zero for an unknown group.
	pub fn len(&self, group: &str) -> usize {
		self.sequence(group).len()
	}

	/// Number of rows across all groups.
	pub fn total_len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub fn sequence(&self, group: &str) -> &[RowId] {
		self.index.sequence_of(group).unwrap_or_default()
	}

	pub fn get(&self, group: &str, position: usize) -> Option<&RowId> {
		self.sequence(group).get(position)
	}

	pub fn first(&self, group: &str) -> Option<&RowId> {
		self.sequence(group).first()
	}

	pub fn last(&self, group: &str) -> Option<&RowId> {
		self.sequence(group).last()
	}

	pub fn lookup(&self, row: &RowId) -> Option<Location> {
		self.index.lookup(row)
	}

	pub fn group_of(&self, row: &RowId) -> Option<String> {
		self.index.lookup(row).map(|location| location.group)
	}

	pub fn iter(&self, group: &str) -> Iter<'_, RowId> {
		self.sequence(group).iter()
	}

	pub fn iter_rev(&self, group: &str) -> Rev<Iter<'_, RowId>> {
		self.sequence(group).iter().rev()
	}

	/// The members of `group` inside `range`, clamped to the group.
	pub fn range(&self, group: &str, range: impl RangeBounds<usize>) -> &[RowId] {
		let sequence = self.sequence(group);

		let start = match range.start_bound() {
			Bound::Included(&start) => start,
			Bound::Excluded(&start) => start.saturating_add(1),
			Bound::Unbounded => 0,
		}
		.min(sequence.len());

		let end = match range.end_bound() {
			Bound::Included(&end) => end.saturating_add(1),
			Bound::Excluded(&end) => end,
			Bound::Unbounded => sequence.len(),
		}
		.clamp(start, sequence.len());

		&sequence[start..end]
	}

	pub fn to_groups(&self) -> BTreeMap<String, Vec<RowId>> {
		self.index.to_groups()
	}
}
