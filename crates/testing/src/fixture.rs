// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde_json::{Value, json};
use viewdb_core::RowId;

use crate::MemorySource;

/// Key of the `n`th fixture row. Zero padded so key order follows `n`.
pub fn key(n: usize) -> String {
	format!("{n:04}")
}

pub fn post(n: usize) -> RowId {
	RowId::new("posts", key(n))
}

pub fn timestamped(ts: i64) -> Value {
	json!({ "ts": ts })
}

/// One `posts` row per timestamp, in order, without metadata.
pub fn timeline(timestamps: &[i64]) -> MemorySource {
	let mut source = MemorySource::new();
	for (n, ts) in timestamps.iter().enumerate() {
		source.put(post(n), timestamped(*ts), Value::Null);
	}
	source
}
