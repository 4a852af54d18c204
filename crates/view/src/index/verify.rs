// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use viewdb_core::Result;
use viewdb_type::return_internal_error;

use super::GroupIndex;

impl GroupIndex {
	/// Checks that every group position and every reverse entry describe the
	/// same layout. A mismatch is a bug in the maintenance code, never bad
	/// input.
	pub fn verify(&self) -> Result<()> {
		let mut members = 0;

		for (group, sequence) in &self.groups {
			if sequence.is_empty() {
				return_internal_error!("group '{}' is empty but still indexed", group);
			}

			for (position, id) in sequence.iter().enumerate() {
				let Some(locator) = self.locators.get(id) else {
					return_internal_error!(
						"row {} at position {} of group '{}' has no reverse entry",
						id,
						position,
						group
					);
				};

				if locator.group != *group || locator.position != position {
					return_internal_error!(
						"row {} sits at position {} of group '{}' but its reverse entry says '{}' at {}",
						id,
						position,
						group,
						locator.group,
						locator.position
					);
				}

				if locator.stamp >= self.next_stamp {
					return_internal_error!(
						"row {} carries stamp {} which was never handed out",
						id,
						locator.stamp
					);
				}
			}

			members += sequence.len();
		}

		if members != self.locators.len() {
			return_internal_error!(
				"groups hold {} members but the reverse index has {} entries",
				members,
				self.locators.len()
			);
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use viewdb_core::RowId;

	use super::*;
	use crate::index::Locator;

	#[test]
	fn empty_index_is_consistent() {
		GroupIndex::new().verify().unwrap();
	}

	#[test]
	fn detects_stale_reverse_entry() {
		let mut index = GroupIndex::new();
		let stamp = index.next_stamp();
		index.insert("g", 0, RowId::new("c", "a"), stamp).unwrap();

		Arc::make_mut(&mut index.locators).insert(
			RowId::new("c", "ghost"),
			Locator {
				group: "g".to_string(),
				position: 1,
				stamp: 0,
			},
		);

		let err = index.verify().unwrap_err();
		assert_eq!(err.code, "INTERNAL_ERROR");
		assert!(err.message.contains("reverse index has 2 entries"));
	}

	#[test]
	fn detects_wrong_position() {
		let mut index = GroupIndex::new();
		for key in ["a", "b"] {
			let stamp = index.next_stamp();
			let position = index.len();
			index.insert("g", position, RowId::new("c", key), stamp).unwrap();
		}

		Arc::make_mut(&mut index.locators).get_mut(&RowId::new("c", "b")).unwrap().position = 0;

		let err = index.verify().unwrap_err();
		assert!(err.message.contains("c/b"));
	}
}
