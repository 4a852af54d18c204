// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod common;

use std::{collections::BTreeMap, sync::Arc};

use common::full_rebuild;
use proptest::prelude::*;
use serde_json::{Value, json};
use viewdb_core::{CommitVersion, RowId};
use viewdb_store::Store;
use viewdb_view::{Dependency, Grouping, MaterializedView, Sorting, ViewConfig, ViewExtension, replay};

#[derive(Debug, Clone)]
enum Op {
	Set(usize, Value, Value),
	SetPayload(usize, Value),
	SetMetadata(usize, Value),
	Remove(usize),
	RemoveAll,
}

const KEYS: usize = 12;

fn id(n: usize) -> RowId {
	RowId::new("rows", format!("{n:02}"))
}

fn arb_payload() -> impl Strategy<Value = Value> {
	(prop::option::of(prop_oneof![Just("a"), Just("b"), Just("c")]), 0i64..5).prop_map(|(kind, ts)| match kind {
		Some(kind) => json!({ "kind": kind, "ts": ts }),
		None => json!({ "ts": ts }),
	})
}

fn arb_metadata() -> impl Strategy<Value = Value> {
	(prop::option::of(0u8..3), 0i64..3).prop_map(|(bucket, rank)| match bucket {
		Some(bucket) => json!({ "bucket": bucket, "rank": rank }),
		None => json!({ "rank": rank }),
	})
}

fn arb_op() -> impl Strategy<Value = Op> {
	prop_oneof![
		4 => (0..KEYS, arb_payload(), arb_metadata()).prop_map(|(n, p, m)| Op::Set(n, p, m)),
		3 => (0..KEYS, arb_payload()).prop_map(|(n, p)| Op::SetPayload(n, p)),
		3 => (0..KEYS, arb_metadata()).prop_map(|(n, m)| Op::SetMetadata(n, m)),
		2 => (0..KEYS).prop_map(Op::Remove),
		1 => Just(Op::RemoveAll),
	]
}

/// Groups by payload kind, newest first, ties by key.
fn by_kind() -> ViewExtension {
	ViewExtension::new(
		Grouping::with_payload(|_, p| p["kind"].as_str().map(str::to_string)),
		Dependency::Payload,
		Sorting::with_payload(|_, a, pa, b, pb| pb["ts"].as_i64().cmp(&pa["ts"].as_i64()).then(a.key().cmp(b.key()))),
		Dependency::Payload,
	)
	.unwrap()
}

/// Groups by metadata bucket, ordered by rank, then ts, then key.
fn by_bucket() -> ViewExtension {
	ViewExtension::new(
		Grouping::with_metadata(|_, m| m["bucket"].as_u64().map(|b| format!("bucket-{b}"))),
		Dependency::Metadata,
		Sorting::with_payload_and_metadata(|_, a, pa, ma, b, pb, mb| {
			ma["rank"]
				.as_i64()
				.cmp(&mb["rank"].as_i64())
				.then(pa["ts"].as_i64().cmp(&pb["ts"].as_i64()))
				.then(a.key().cmp(b.key()))
		}),
		Dependency::PayloadAndMetadata,
	)
	.unwrap()
}

fn apply(store: &Store, batch: &[Op]) {
	store
		.with_command(|tx| {
			for op in batch {
				match op {
					Op::Set(n, payload, metadata) => tx.set(id(*n), payload.clone(), metadata.clone())?,
					Op::SetPayload(n, payload) => tx.set_payload(id(*n), payload.clone())?,
					Op::SetMetadata(n, metadata) => tx.set_metadata(id(*n), metadata.clone())?,
					Op::Remove(n) => {
						tx.remove(&id(*n));
					}
					Op::RemoveAll => {
						tx.remove_all();
					}
				}
			}
			Ok(())
		})
		.unwrap();
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn incremental_matches_full_rebuild(batches in prop::collection::vec(prop::collection::vec(arb_op(), 1..8), 1..10)) {
		let store = Store::default();
		let views = [
			Arc::new(MaterializedView::new(by_kind(), ViewConfig::default())),
			Arc::new(MaterializedView::new(by_bucket(), ViewConfig::default())),
		];
		for (n, view) in views.iter().enumerate() {
			store.register(format!("view-{n}"), view.clone()).unwrap();
		}

		for batch in &batches {
			apply(&store, batch);

			let query = store.begin_query();
			for view in &views {
				prop_assert_eq!(view.version(), store.version());
				prop_assert_eq!(view.snapshot().to_groups(), full_rebuild(view.extension(), &query));
				prop_assert!(view.last_report().map_or(true, |report| report.failures.is_empty()));
			}
		}

		for view in &views {
			let mut groups = BTreeMap::new();
			replay(&mut groups, &view.changes_since(CommitVersion(0)).unwrap()).unwrap();
			prop_assert_eq!(groups, view.snapshot().to_groups());
		}
	}

	#[test]
	fn replay_from_any_version(batches in prop::collection::vec(prop::collection::vec(arb_op(), 1..6), 2..8), pick in 0usize..8) {
		let store = Store::default();
		let view = Arc::new(MaterializedView::new(by_kind(), ViewConfig::default()));
		store.register("view", view.clone()).unwrap();

		let mut snapshots = vec![view.snapshot()];
		for batch in &batches {
			apply(&store, batch);
			snapshots.push(view.snapshot());
		}

		let base = &snapshots[pick % snapshots.len()];
		let mut groups = base.to_groups();
		replay(&mut groups, &view.changes_since(base.version()).unwrap()).unwrap();
		prop_assert_eq!(groups, view.snapshot().to_groups());
	}
}
