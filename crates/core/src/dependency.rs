// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use viewdb_type::Value;

use crate::Row;

/// Declares which inputs of a row a grouping or sorting callback reads.
///
/// The row identifier is always available. The classification is fixed when a
/// view is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dependency {
	Key,
	Payload,
	Metadata,
	PayloadAndMetadata,
}

impl Dependency {
	pub const fn from_reads(payload: bool, metadata: bool) -> Self {
		match (payload, metadata) {
			(false, false) => Self::Key,
			(true, false) => Self::Payload,
			(false, true) => Self::Metadata,
			(true, true) => Self::PayloadAndMetadata,
		}
	}

	pub const fn reads_payload(&self) -> bool {
		matches!(self, Self::Payload | Self::PayloadAndMetadata)
	}

	pub const fn reads_metadata(&self) -> bool {
		matches!(self, Self::Metadata | Self::PayloadAndMetadata)
	}

	pub const fn reads_row(&self) -> bool {
		!matches!(self, Self::Key)
	}

	/// True if every input `other` reads is also read under `self`.
	pub const fn covers(&self, other: Dependency) -> bool {
		(self.reads_payload() || !other.reads_payload()) && (self.reads_metadata() || !other.reads_metadata())
	}
}

impl Display for Dependency {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Key => "key",
			Self::Payload => "payload",
			Self::Metadata => "metadata",
			Self::PayloadAndMetadata => "payload and metadata",
		})
	}
}

/// The row inputs handed to a callback, restricted to its dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowInputs<'a> {
	pub payload: Option<&'a Value>,
	pub metadata: Option<&'a Value>,
}

impl<'a> RowInputs<'a> {
	pub const fn none() -> Self {
		Self {
			payload: None,
			metadata: None,
		}
	}

	pub fn restrict(row: Option<&'a Row>, dependency: Dependency) -> Self {
		match row {
			None => Self::none(),
			Some(row) => Self {
				payload: dependency.reads_payload().then(|| row.payload.as_ref()),
				metadata: dependency.reads_metadata().then(|| row.metadata.as_ref()),
			},
		}
	}

	pub fn payload(&self) -> &'a Value {
		self.payload.unwrap_or(&Value::Null)
	}

	pub fn metadata(&self) -> &'a Value {
		self.metadata.unwrap_or(&Value::Null)
	}
}
