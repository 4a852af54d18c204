// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde_json::json;
use viewdb::{Dependency, Grouping, RowId, Sorting, ViewChangeKind, ViewConfig, ViewExtension, memory, register_view};
use viewdb_testing::init_tracing;

fn recent_by_author() -> ViewExtension {
	ViewExtension::builder()
		.grouping(
			Dependency::Payload,
			Grouping::with_payload(|_, post| post["author"].as_str().map(str::to_string)),
		)
		.sorting(
			Dependency::Payload,
			Sorting::with_payload(|_, _, a, _, b| b["ts"].as_i64().cmp(&a["ts"].as_i64())),
		)
		.build()
		.unwrap()
}

fn post(key: &str) -> RowId {
	RowId::new("posts", key)
}

#[test]
fn newest_posts_first_per_author() {
	init_tracing();

	let store = memory();
	let view = register_view(&store, "recent", recent_by_author(), ViewConfig::default()).unwrap();
	let attached = view.version();

	store
		.with_command(|tx| {
			tx.set(post("1"), json!({"author": "ada", "ts": 1}), json!(null))?;
			tx.set(post("2"), json!({"author": "bob", "ts": 2}), json!(null))?;
			tx.set(post("3"), json!({"author": "ada", "ts": 3}), json!(null))
		})
		.unwrap();

	assert_eq!(view.sequence("ada"), vec![post("3"), post("1")]);
	assert_eq!(view.sequence("bob"), vec![post("2")]);

	store.with_command(|tx| tx.set_payload(post("2"), json!({"author": "ada", "ts": 2}))).unwrap();

	assert_eq!(view.sequence("ada"), vec![post("3"), post("2"), post("1")]);
	assert!(!view.current_groups().contains("bob"));

	let changes = view.changes_since(attached).unwrap();
	assert_eq!(changes.iter().filter(|c| c.kind == ViewChangeKind::Insert).count(), 3);
	assert_eq!(changes.last().unwrap().kind, ViewChangeKind::Move);
}

#[test]
fn typed_lookup_through_registry() {
	let store = memory();
	register_view(&store, "recent", recent_by_author(), ViewConfig::default()).unwrap();

	let view = store.extension_as::<viewdb::MaterializedView>("recent").unwrap();
	assert!(view.is_attached());
	assert!(store.extension_as::<viewdb::MaterializedView>("missing").is_none());
}
