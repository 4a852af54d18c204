// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	sync::Arc,
};

use serde::{Deserialize, Serialize};

/// Identifies a row by its collection and key.
///
/// Both parts are reference counted, cloning a `RowId` never copies the
/// strings. Ordering is by collection first, then key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId {
	collection: Arc<str>,
	key: Arc<str>,
}

impl RowId {
	pub fn new(collection: impl AsRef<str>, key: impl AsRef<str>) -> Self {
		Self {
			collection: Arc::from(collection.as_ref()),
			key: Arc::from(key.as_ref()),
		}
	}

	pub fn collection(&self) -> &str {
		&self.collection
	}

	pub fn key(&self) -> &str {
		&self.key
	}
}

impl Display for RowId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.collection, self.key)
	}
}

impl<C: AsRef<str>, K: AsRef<str>> From<(C, K)> for RowId {
	fn from((collection, key): (C, K)) -> Self {
		Self::new(collection, key)
	}
}
