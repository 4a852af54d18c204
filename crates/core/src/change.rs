// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

/// What a write batch did to a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
	Insert,
	UpdatePayload,
	UpdateMetadata,
	/// Payload and metadata were both replaced
	Update,
	/// The row existed before the batch, was removed and created again.
	Replace,
	Remove,
}

impl ChangeKind {
	fn update(payload: bool, metadata: bool) -> Self {
		match (payload, metadata) {
			(true, false) => Self::UpdatePayload,
			(false, true) => Self::UpdateMetadata,
			_ => Self::Update,
		}
	}

	pub fn is_update(&self) -> bool {
		matches!(self, Self::UpdatePayload | Self::UpdateMetadata | Self::Update)
	}

	pub fn touches_payload(&self) -> bool {
		!matches!(self, Self::UpdateMetadata)
	}

	pub fn touches_metadata(&self) -> bool {
		!matches!(self, Self::UpdatePayload)
	}

	/// Folds a later write of the same row into this one.
	///
	/// Returns `None` when the two writes cancel out, which only happens for a
	/// row inserted and removed inside the same batch.
	pub fn merge(self, next: ChangeKind) -> Option<ChangeKind> {
		use ChangeKind::*;

		match (self, next) {
			(Insert, Remove) => None,
			(Insert, _) => Some(Insert),
			(Remove, Remove) => Some(Remove),
			(Remove, _) => Some(Replace),
			(_, Remove) => Some(Remove),
			(Replace, _) => Some(Replace),
			(_, Insert) => Some(Replace),
			(prev, next) => Some(Self::update(
				prev.touches_payload() || next.touches_payload(),
				prev.touches_metadata() || next.touches_metadata(),
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::ChangeKind::{self, *};

	#[test]
	fn insert_absorbs_updates() {
		assert_eq!(Insert.merge(UpdatePayload), Some(Insert));
		assert_eq!(Insert.merge(UpdateMetadata), Some(Insert));
		assert_eq!(Insert.merge(Update), Some(Insert));
	}

	#[test]
	fn insert_then_remove_cancels() {
		assert_eq!(Insert.merge(Remove), None);
	}

	#[test]
	fn updates_union_their_inputs() {
		assert_eq!(UpdatePayload.merge(UpdatePayload), Some(UpdatePayload));
		assert_eq!(UpdatePayload.merge(UpdateMetadata), Some(Update));
		assert_eq!(UpdateMetadata.merge(UpdateMetadata), Some(UpdateMetadata));
		assert_eq!(Update.merge(UpdateMetadata), Some(Update));
	}

	#[test]
	fn update_then_remove_is_remove() {
		assert_eq!(UpdatePayload.merge(Remove), Some(Remove));
		assert_eq!(Update.merge(Remove), Some(Remove));
	}

	#[test]
	fn remove_then_insert_is_replace() {
		assert_eq!(Remove.merge(Insert), Some(Replace));
		assert_eq!(Update.merge(Remove).and_then(|c| c.merge(Insert)), Some(Replace));
		assert_eq!(Replace.merge(UpdateMetadata), Some(Replace));
		assert_eq!(Replace.merge(Remove), Some(Remove));
	}

	#[test]
	fn touched_inputs() {
		let cases: [(ChangeKind, bool, bool); 6] = [
			(Insert, true, true),
			(UpdatePayload, true, false),
			(UpdateMetadata, false, true),
			(Update, true, true),
			(Replace, true, true),
			(Remove, true, true),
		];
		for (kind, payload, metadata) in cases {
			assert_eq!(kind.touches_payload(), payload, "{:?}", kind);
			assert_eq!(kind.touches_metadata(), metadata, "{:?}", kind);
		}
	}
}
