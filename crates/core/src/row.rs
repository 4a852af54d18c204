// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use viewdb_type::Value;

/// The stored content of a row: its payload and its metadata.
///
/// Both are shared, handing a row to a callback or a reader never copies the
/// documents. A row without metadata carries `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	pub payload: Arc<Value>,
	pub metadata: Arc<Value>,
}

impl Row {
	pub fn new(payload: Value, metadata: Value) -> Self {
		Self {
			payload: Arc::new(payload),
			metadata: Arc::new(metadata),
		}
	}

	pub fn with_payload(&self, payload: Value) -> Self {
		Self {
			payload: Arc::new(payload),
			metadata: self.metadata.clone(),
		}
	}

	pub fn with_metadata(&self, metadata: Value) -> Self {
		Self {
			payload: self.payload.clone(),
			metadata: Arc::new(metadata),
		}
	}
}
