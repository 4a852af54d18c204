// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Runtime configuration of a materialized view.
#[derive(Debug, Clone)]
pub struct ViewConfig {
	/// Number of committed batches kept for `changes_since`.
	pub change_log_retention: usize,
	/// Check that the group index and the reverse index agree before every
	/// commit.
	pub verify_consistency: bool,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			change_log_retention: 64,
			verify_consistency: true,
		}
	}
}

impl ViewConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_change_log_retention(mut self, batches: usize) -> Self {
		self.change_log_retention = batches;
		self
	}

	pub fn with_verify_consistency(mut self, verify: bool) -> Self {
		self.verify_consistency = verify;
		self
	}
}
