// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeMap, sync::Arc};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument};
use viewdb_core::{
	CommitVersion, Result, Row, RowId,
	interface::{Extension, RowFailure},
};
use viewdb_type::{
	error::diagnostic::store::{extension_already_registered, extension_instance_registered, unknown_extension},
	return_error,
};

use crate::{
	StoreConfig,
	transaction::{CommandTransaction, QueryTransaction, Rows},
};

/// Shared handle to one store. Clones refer to the same rows.
#[derive(Clone)]
pub struct Store {
	pub(crate) inner: Arc<StoreInner>,
}

pub(crate) struct StoreInner {
	pub(crate) config: StoreConfig,
	/// Held by the one command transaction in flight, and by registry changes.
	pub(crate) writer: Mutex<()>,
	pub(crate) committed: RwLock<Committed>,
	pub(crate) extensions: RwLock<IndexMap<String, Arc<dyn Extension>>>,
}

#[derive(Clone)]
pub(crate) struct Committed {
	pub(crate) version: CommitVersion,
	pub(crate) rows: Rows,
}

impl Default for Store {
	fn default() -> Self {
		Self::new(StoreConfig::default())
	}
}

impl Store {
	pub fn new(config: StoreConfig) -> Self {
		Self {
			inner: Arc::new(StoreInner {
				config,
				writer: Mutex::new(()),
				committed: RwLock::new(Committed {
					version: CommitVersion::default(),
					rows: Rows::new(Arc::new(BTreeMap::new())),
				}),
				extensions: RwLock::new(IndexMap::new()),
			}),
		}
	}

	pub fn config(&self) -> &StoreConfig {
		&self.inner.config
	}

	/// Version of the last committed batch, zero for a fresh store.
	pub fn version(&self) -> CommitVersion {
		self.inner.committed.read().version
	}

	/// A read-only view of the rows as of the last commit.
	pub fn begin_query(&self) -> QueryTransaction {
		let committed = self.inner.committed.read().clone();
		QueryTransaction::new(committed.version, committed.rows)
	}

	/// Starts a write batch. Blocks while another one is in flight.
	pub fn begin_command(&self) -> CommandTransaction<'_> {
		let writer = self.inner.writer.lock();
		let committed = self.inner.committed.read().clone();
		CommandTransaction::new(self, writer, committed)
	}

	pub fn with_query<F, R>(&self, f: F) -> Result<R>
	where
		F: FnOnce(&QueryTransaction) -> Result<R>,
	{
		let tx = self.begin_query();
		f(&tx)
	}

	/// Runs `f` in a write batch and commits it when `f` succeeds.
	pub fn with_command<F, R>(&self, f: F) -> Result<R>
	where
		F: FnOnce(&mut CommandTransaction<'_>) -> Result<R>,
	{
		let mut tx = self.begin_command();
		let result = f(&mut tx)?;
		tx.commit()?;
		Ok(result)
	}

	/// Registers `extension` under `name` and builds its state from the
	/// committed rows. Rows a callback failed for are returned.
	#[instrument(name = "store::extension::register", level = "debug", skip_all, fields(store = %self.inner.config.name))]
	pub fn register(&self, name: impl Into<String>, extension: Arc<dyn Extension>) -> Result<Vec<RowFailure>> {
		let name = name.into();
		let _writer = self.inner.writer.lock();

		{
			let extensions = self.inner.extensions.read();
			if extensions.contains_key(&name) {
				return_error!(extension_already_registered(&name));
			}

			let instance = Arc::as_ptr(&extension) as *const ();
			for (existing, other) in extensions.iter() {
				if Arc::as_ptr(other) as *const () == instance {
					return_error!(extension_instance_registered(&name, existing));
				}
			}
		}

		let committed = self.inner.committed.read().clone();
		let failures = extension.attach(&committed.rows, committed.version)?;

		self.inner.extensions.write().insert(name.clone(), extension);
		info!(extension = %name, version = %committed.version, failed = failures.len(), "extension registered");

		Ok(failures)
	}

	/// Removes and detaches the extension registered under `name`.
	#[instrument(name = "store::extension::unregister", level = "debug", skip(self), fields(store = %self.inner.config.name))]
	pub fn unregister(&self, name: &str) -> Result<Arc<dyn Extension>> {
		let _writer = self.inner.writer.lock();

		let Some(extension) = self.inner.extensions.write().shift_remove(name) else {
			return_error!(unknown_extension(name));
		};

		extension.detach();
		debug!(extension = name, "extension unregistered");

		Ok(extension)
	}

	pub fn extension(&self, name: &str) -> Option<Arc<dyn Extension>> {
		self.inner.extensions.read().get(name).cloned()
	}

	/// The extension registered under `name`, if it has type `T`.
	pub fn extension_as<T: Extension>(&self, name: &str) -> Option<Arc<T>> {
		self.extension(name)?.into_any().downcast::<T>().ok()
	}

	/// Names in registration order.
	pub fn extension_names(&self) -> Vec<String> {
		self.inner.extensions.read().keys().cloned().collect()
	}

	pub(crate) fn extensions(&self) -> Vec<(String, Arc<dyn Extension>)> {
		self.inner.extensions.read().iter().map(|(name, extension)| (name.clone(), extension.clone())).collect()
	}

	pub(crate) fn publish(&self, version: CommitVersion, writes: IndexMap<RowId, Option<Row>>) {
		let mut committed = self.inner.committed.write();
		committed.rows.apply(writes);
		committed.version = version;
	}
}
