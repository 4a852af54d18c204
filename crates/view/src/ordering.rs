// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Finds a row's position inside its group.
//!
//! Placement tries three strategies in order and stops at the first one that
//! decides:
//!
//! 1. neighbor check, for a row already in the group: if it still sorts
//!    between its predecessor and successor it stays where it is;
//! 2. boundary check: a row sorting before the first member goes to the
//!    front, one sorting after the last member goes to the end. The edge used
//!    by the previous placement is tested first;
//! 3. binary search over the remaining interior.
//!
//! The effective order is the sorting callback, with ties broken by insertion
//! stamp. Every strategy compares under that same total order, so the
//! shortcuts always agree with the binary search.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::trace;
use viewdb_core::{Diagnostic, Error, Row, RowId, RowInputs};
use viewdb_type::{error, error::diagnostic::view::sorting_failed, internal_error};

use crate::{BatchRows, GroupIndex, ViewExtension};

/// Why placing a row failed.
#[derive(Debug)]
pub enum Fault {
	/// A callback failed for this row. The row is excluded, the batch goes on.
	Row(Diagnostic),
	/// Storage or index failure. The whole batch is discarded.
	Batch(Error),
}

impl From<Error> for Fault {
	fn from(err: Error) -> Self {
		Fault::Batch(err)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
	First,
	Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
	Unchanged(usize),
	Moved {
		from: usize,
		to: usize,
	},
}

/// Counters for how placements were decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingStats {
	/// Sorting callback invocations.
	pub comparisons: usize,
	pub neighbor_hits: usize,
	pub boundary_hits: usize,
	pub binary_searches: usize,
}

impl OrderingStats {
	pub fn merge(&mut self, other: OrderingStats) {
		self.comparisons += other.comparisons;
		self.neighbor_hits += other.neighbor_hits;
		self.boundary_hits += other.boundary_hits;
		self.binary_searches += other.binary_searches;
	}
}

/// The row being placed, with its inputs as of the end of the batch.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'s> {
	pub id: &'s RowId,
	pub row: Option<&'s Row>,
}

pub struct OrderingEngine<'e> {
	extension: &'e ViewExtension,
	hint: Option<Edge>,
	stats: OrderingStats,
}

impl<'e> OrderingEngine<'e> {
	pub fn new(extension: &'e ViewExtension, hint: Option<Edge>) -> Self {
		Self {
			extension,
			hint,
			stats: OrderingStats::default(),
		}
	}

	/// The edge the last boundary hit used.
	pub fn hint(&self) -> Option<Edge> {
		self.hint
	}

	pub fn stats(&self) -> OrderingStats {
		self.stats
	}

	/// Position at which `subject`, not currently in `group`, has to be
	/// inserted when it gets `stamp`.
	pub fn locate(
		&mut self,
		index: &GroupIndex,
		rows: &BatchRows<'_>,
		group: &str,
		subject: Subject<'_>,
		stamp: u64,
	) -> Result<usize, Fault> {
		self.search(index, rows, group, subject, stamp, None)
	}

	/// Re-establishes the position of `subject` inside `group` after its sort
	/// inputs may have changed.
	///
	/// The row keeps its stamp when the neighbor check confirms its position.
	/// Otherwise it is placed again under a fresh stamp. On failure the index
	/// is left untouched.
	pub fn reposition(
		&mut self,
		index: &mut GroupIndex,
		rows: &BatchRows<'_>,
		group: &str,
		subject: Subject<'_>,
	) -> Result<Placement, Fault> {
		let (from, stamp) = match (index.lookup(subject.id), index.stamp(subject.id)) {
			(Some(location), Some(stamp)) if location.group == group => (location.position, stamp),
			_ => {
				return Err(Fault::Batch(error!(internal_error!(
					"reposition of row {} which is not indexed in group '{}'",
					subject.id,
					group
				))));
			}
		};

		let (predecessor, successor) = {
			let sequence = index.sequence_of(group).unwrap_or_default();
			(from.checked_sub(1).and_then(|p| sequence.get(p).cloned()), sequence.get(from + 1).cloned())
		};

		let after_predecessor = match &predecessor {
			Some(member) => self.compare(index, rows, group, subject, stamp, member)? == Ordering::Greater,
			None => true,
		};
		let in_place = after_predecessor
			&& match &successor {
				Some(member) => self.compare(index, rows, group, subject, stamp, member)? == Ordering::Less,
				None => true,
			};

		if in_place {
			self.stats.neighbor_hits += 1;
			trace!(row = %subject.id, group, position = from, "neighbor check kept position");
			return Ok(Placement::Unchanged(from));
		}

		let stamp = index.next_stamp();
		let to = self.search(index, rows, group, subject, stamp, Some(from))?;

		index.restamp(subject.id, stamp)?;
		if to == from {
			return Ok(Placement::Unchanged(from));
		}

		index.move_within_group(subject.id, from, to)?;
		Ok(Placement::Moved {
			from,
			to,
		})
	}

	/// Boundary check, then binary search, over the group's sequence with the
	/// member at `skip` left out.
	fn search(
		&mut self,
		index: &GroupIndex,
		rows: &BatchRows<'_>,
		group: &str,
		subject: Subject<'_>,
		stamp: u64,
		skip: Option<usize>,
	) -> Result<usize, Fault> {
		let sequence = index.sequence_of(group).unwrap_or_default();
		let len = sequence.len() - usize::from(skip.is_some());
		if len == 0 {
			return Ok(0);
		}

		let edges = match self.hint {
			Some(Edge::First) => [Edge::First, Edge::Last],
			_ => [Edge::Last, Edge::First],
		};

		for (attempt, edge) in edges.into_iter().enumerate() {
			let target = match edge {
				Edge::First => 0,
				Edge::Last => len,
			};

			// with a single member, failing one edge decides the other
			let hit = if attempt == 1 && len == 1 {
				true
			} else {
				match edge {
					Edge::First => {
						self.compare(index, rows, group, subject, stamp, nth(sequence, skip, 0))? == Ordering::Less
					}
					Edge::Last => {
						self.compare(index, rows, group, subject, stamp, nth(sequence, skip, len - 1))?
							== Ordering::Greater
					}
				}
			};

			if hit {
				self.stats.boundary_hits += 1;
				self.hint = Some(edge);
				trace!(row = %subject.id, group, position = target, ?edge, "boundary check placed row");
				return Ok(target);
			}
		}

		self.stats.binary_searches += 1;
		self.hint = None;

		// sorts after the first member and before the last one
		let (mut lo, mut hi) = (1, len - 1);
		while lo < hi {
			let mid = lo + (hi - lo) / 2;
			if self.compare(index, rows, group, subject, stamp, nth(sequence, skip, mid))? == Ordering::Less {
				hi = mid;
			} else {
				lo = mid + 1;
			}
		}

		trace!(row = %subject.id, group, position = lo, "binary search placed row");
		Ok(lo)
	}

	/// Orders `subject` (carrying `stamp`) against an indexed member.
	fn compare(
		&mut self,
		index: &GroupIndex,
		rows: &BatchRows<'_>,
		group: &str,
		subject: Subject<'_>,
		stamp: u64,
		member: &RowId,
	) -> Result<Ordering, Fault> {
		let Some(member_stamp) = index.stamp(member) else {
			return Err(Fault::Batch(error!(internal_error!(
				"row {} in group '{}' has no reverse entry",
				member,
				group
			))));
		};

		let dependency = self.extension.sorting_dependency();

		let member_row = if dependency.reads_row() {
			match rows.member(member)? {
				Some(row) => Some(row),
				None => {
					return Err(Fault::Batch(error!(internal_error!(
						"row {} is indexed in group '{}' but missing from storage",
						member,
						group
					))));
				}
			}
		} else {
			None
		};

		self.stats.comparisons += 1;

		let ordering = self
			.extension
			.sorting()
			.invoke(
				group,
				subject.id,
				RowInputs::restrict(subject.row, dependency),
				member,
				RowInputs::restrict(member_row.as_ref(), dependency),
			)
			.map_err(|err| {
				let reason = err.message.clone();
				Fault::Row(sorting_failed(group, &subject.id.to_string(), reason).with_cause(err.diagnostic()))
			})?;

		Ok(ordering.then(stamp.cmp(&member_stamp)))
	}
}

/// Member at `position` of `sequence` once the entry at `skip` is left out.
fn nth(sequence: &[RowId], skip: Option<usize>, position: usize) -> &RowId {
	match skip {
		Some(skip) if position >= skip => &sequence[position + 1],
		_ => &sequence[position],
	}
}
