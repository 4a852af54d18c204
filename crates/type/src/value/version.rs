// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	num::ParseIntError,
	str::FromStr,
};

use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(Debug, Default, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitVersion(pub u64);

impl CommitVersion {
	pub const fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl FromStr for CommitVersion {
	type Err = ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(CommitVersion(u64::from_str(s)?))
	}
}

impl Display for CommitVersion {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl PartialEq<u64> for CommitVersion {
	fn eq(&self, other: &u64) -> bool {
		self.0.eq(other)
	}
}

impl From<CommitVersion> for u64 {
	fn from(value: CommitVersion) -> Self {
		value.0
	}
}

impl From<u64> for CommitVersion {
	fn from(value: u64) -> Self {
		Self(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn next_increments() {
		assert_eq!(CommitVersion(41).next(), 42);
	}

	#[test]
	fn parse_and_display() {
		let v: CommitVersion = "17".parse().unwrap();
		assert_eq!(v, CommitVersion(17));
		assert_eq!(v.to_string(), "17");
	}

	#[test]
	fn serializes_as_plain_number() {
		assert_eq!(serde_json::to_string(&CommitVersion(5)).unwrap(), "5");
	}
}
