// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Ordered group sequences plus the reverse index from row to position.
//!
//! Every mutation edits both structures in the same call. Group sequences are
//! copy-on-write, so cloning an index for a reader or for a staged batch only
//! copies the groups that are written afterwards.

use std::{
	collections::{BTreeMap, HashMap},
	sync::Arc,
};

use serde::{Deserialize, Serialize};
use viewdb_core::{CowVec, Result, RowId};
use viewdb_type::{internal_err, return_internal_error};

mod verify;

/// Where a row currently sits in the view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
	pub group: String,
	pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Locator {
	group: String,
	position: usize,
	/// Insertion stamp, breaks ties between rows the sorting callback reports
	/// as equal. Later stamps sort after earlier ones.
	stamp: u64,
}

#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
	groups: BTreeMap<String, CowVec<RowId>>,
	locators: Arc<HashMap<RowId, Locator>>,
	next_stamp: u64,
}

impl GroupIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn lookup(&self, id: &RowId) -> Option<Location> {
		self.locators.get(id).map(|l| Location {
			group: l.group.clone(),
			position: l.position,
		})
	}

	pub fn contains(&self, id: &RowId) -> bool {
		self.locators.contains_key(id)
	}

	pub fn stamp(&self, id: &RowId) -> Option<u64> {
		self.locators.get(id).map(|l| l.stamp)
	}

	pub fn sequence_of(&self, group: &str) -> Option<&[RowId]> {
		self.groups.get(group).map(|s| s.as_slice())
	}

	pub fn groups(&self) -> impl Iterator<Item = &str> {
		self.groups.keys().map(String::as_str)
	}

	pub fn group_count(&self) -> usize {
		self.groups.len()
	}

	/// Number of rows across all groups.
	pub fn len(&self) -> usize {
		self.locators.len()
	}

	pub fn is_empty(&self) -> bool {
		self.locators.is_empty()
	}

	/// Hands out the next insertion stamp.
	pub fn next_stamp(&mut self) -> u64 {
		let stamp = self.next_stamp;
		self.next_stamp += 1;
		stamp
	}

	/// Inserts `id` at `position`, creating the group if needed. Members at or
	/// after `position` shift back by one.
	pub fn insert(&mut self, group: &str, position: usize, id: RowId, stamp: u64) -> Result<()> {
		if let Some(existing) = self.locators.get(&id) {
			return_internal_error!(
				"row {} inserted into group '{}' but already indexed in group '{}' at {}",
				id,
				group,
				existing.group,
				existing.position
			);
		}

		let sequence = self.groups.entry(group.to_string()).or_default();
		if position > sequence.len() {
			let len = sequence.len();
			if len == 0 {
				self.groups.remove(group);
			}
			return_internal_error!(
				"insert position {} out of bounds for group '{}' of length {}",
				position,
				group,
				len
			);
		}

		sequence.insert(position, id.clone());

		let locators = Arc::make_mut(&mut self.locators);
		for member in &sequence[position + 1..] {
			if let Some(locator) = locators.get_mut(member) {
				locator.position += 1;
			}
		}
		locators.insert(
			id,
			Locator {
				group: group.to_string(),
				position,
				stamp,
			},
		);

		Ok(())
	}

	/// Removes the member at `position`. The group disappears with its last
	/// member.
	pub fn remove_at(&mut self, group: &str, position: usize) -> Result<RowId> {
		let Some(sequence) = self.groups.get_mut(group) else {
			return_internal_error!("remove from unknown group '{}'", group);
		};

		if position >= sequence.len() {
			return_internal_error!(
				"remove position {} out of bounds for group '{}' of length {}",
				position,
				group,
				sequence.len()
			);
		}

		let id = sequence.remove(position);

		let locators = Arc::make_mut(&mut self.locators);
		for member in &sequence[position..] {
			if let Some(locator) = locators.get_mut(member) {
				locator.position -= 1;
			}
		}
		locators.remove(&id);

		if sequence.is_empty() {
			self.groups.remove(group);
		}

		Ok(id)
	}

	/// Moves `id` from `from` to `to` inside its group. Members in between
	/// shift by one towards `from`.
	pub fn move_within_group(&mut self, id: &RowId, from: usize, to: usize) -> Result<()> {
		let Some(locator) = self.locators.get(id) else {
			return_internal_error!("move of row {} which is not indexed", id);
		};

		if locator.position != from {
			return_internal_error!("move of row {} from {} but it is indexed at {}", id, from, locator.position);
		}

		let group = locator.group.clone();
		let Some(sequence) = self.groups.get_mut(&group) else {
			return internal_err!("row {} indexed in missing group '{}'", id, group);
		};

		if to >= sequence.len() {
			return_internal_error!(
				"move target {} out of bounds for group '{}' of length {}",
				to,
				group,
				sequence.len()
			);
		}

		sequence.relocate(from, to);

		let (lo, hi) = (from.min(to), from.max(to));
		let locators = Arc::make_mut(&mut self.locators);
		for (offset, member) in sequence[lo..=hi].iter().enumerate() {
			if let Some(locator) = locators.get_mut(member) {
				locator.position = lo + offset;
			}
		}

		Ok(())
	}

	/// Replaces the insertion stamp of an indexed row.
	pub fn restamp(&mut self, id: &RowId, stamp: u64) -> Result<()> {
		match Arc::make_mut(&mut self.locators).get_mut(id) {
			Some(locator) => {
				locator.stamp = stamp;
				Ok(())
			}
			None => internal_err!("restamp of row {} which is not indexed", id),
		}
	}

	/// The full contents as plain vectors.
	pub fn to_groups(&self) -> BTreeMap<String, Vec<RowId>> {
		self.groups.iter().map(|(g, s)| (g.clone(), s.to_vec())).collect()
	}
}
