// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#[derive(Debug, Clone)]
pub struct StoreConfig {
	/// Shows up in tracing fields.
	pub name: String,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			name: "memory".to_string(),
		}
	}
}

impl StoreConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}
}
