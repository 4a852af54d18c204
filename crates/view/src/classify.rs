// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Decides whether a row change can affect a callback's result.

use viewdb_core::{ChangeKind, Dependency};

use crate::ViewExtension;

/// Whether the grouping callback has to run again for `change`.
///
/// Inserts and replacements always need a group. Removes always edit the
/// index but never invoke a callback.
pub fn may_affect_group(change: ChangeKind, dependency: Dependency) -> bool {
	touches(change, dependency)
}

/// Whether the row's position inside its group has to be recomputed for
/// `change`.
pub fn may_affect_order(change: ChangeKind, dependency: Dependency) -> bool {
	touches(change, dependency)
}

fn touches(change: ChangeKind, dependency: Dependency) -> bool {
	match change {
		ChangeKind::Insert | ChangeKind::Replace | ChangeKind::Remove => true,
		ChangeKind::UpdatePayload => dependency.reads_payload(),
		ChangeKind::UpdateMetadata => dependency.reads_metadata(),
		ChangeKind::Update => dependency.reads_row(),
	}
}

/// The recomputation a change requires under a view's classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recompute {
	pub group: bool,
	pub order: bool,
}

impl Recompute {
	pub const ALL: Recompute = Recompute {
		group: true,
		order: true,
	};

	pub fn of(change: ChangeKind, extension: &ViewExtension) -> Self {
		Self {
			group: may_affect_group(change, extension.grouping_dependency()),
			order: may_affect_order(change, extension.sorting_dependency()),
		}
	}

	pub fn is_noop(&self) -> bool {
		!self.group && !self.order
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const UPDATES: [ChangeKind; 3] = [ChangeKind::UpdatePayload, ChangeKind::UpdateMetadata, ChangeKind::Update];

	#[test]
	fn inserts_and_removes_always_recompute() {
		for dep in [Dependency::Key, Dependency::Payload, Dependency::Metadata, Dependency::PayloadAndMetadata] {
			assert!(may_affect_group(ChangeKind::Insert, dep));
			assert!(may_affect_order(ChangeKind::Insert, dep));
			assert!(may_affect_group(ChangeKind::Replace, dep));
			assert!(may_affect_order(ChangeKind::Replace, dep));
			assert!(may_affect_group(ChangeKind::Remove, dep));
		}
	}

	#[test]
	fn key_only_callbacks_ignore_updates() {
		for change in UPDATES {
			assert!(!may_affect_group(change, Dependency::Key));
			assert!(!may_affect_order(change, Dependency::Key));
		}
	}

	#[test]
	fn payload_callbacks_ignore_metadata_updates() {
		assert!(may_affect_group(ChangeKind::UpdatePayload, Dependency::Payload));
		assert!(!may_affect_group(ChangeKind::UpdateMetadata, Dependency::Payload));
		assert!(may_affect_group(ChangeKind::Update, Dependency::Payload));
	}

	#[test]
	fn metadata_callbacks_ignore_payload_updates() {
		assert!(!may_affect_order(ChangeKind::UpdatePayload, Dependency::Metadata));
		assert!(may_affect_order(ChangeKind::UpdateMetadata, Dependency::Metadata));
		assert!(may_affect_order(ChangeKind::Update, Dependency::Metadata));
	}

	#[test]
	fn payload_and_metadata_callbacks_see_every_update() {
		for change in UPDATES {
			assert!(may_affect_group(change, Dependency::PayloadAndMetadata));
		}
	}
}
