// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tracing::instrument;
use viewdb_core::Result;
use viewdb_store::{Store, StoreConfig};
use viewdb_view::{MaterializedView, ViewConfig, ViewExtension};

/// An empty in-memory store.
pub fn memory() -> Store {
	Store::new(StoreConfig::default())
}

/// Builds a view over `store` and registers it under `name`.
///
/// Rows a callback failed for during the initial build are left out of the
/// view and show up in its first report.
#[instrument(name = "viewdb::register_view", level = "debug", skip(store, extension, config))]
pub fn register_view(
	store: &Store,
	name: &str,
	extension: ViewExtension,
	config: ViewConfig,
) -> Result<Arc<MaterializedView>> {
	let view = Arc::new(MaterializedView::new(extension, config));
	store.register(name, view.clone())?;
	Ok(view)
}
