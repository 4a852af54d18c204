// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Grouping and sorting callbacks.
//!
//! Every callback is stored behind one signature per role and carries the
//! inputs it was constructed to read. The engine hands a callback only the
//! inputs its classification declares, so callbacks must be pure functions of
//! the row identifier and those inputs.

use std::{
	cmp::Ordering,
	fmt::{Debug, Formatter},
	sync::Arc,
};

use viewdb_core::{Dependency, Result, RowId, RowInputs, Value};

type GroupingFn = dyn Fn(&RowId, RowInputs<'_>) -> Result<Option<String>> + Send + Sync;

type SortingFn = dyn Fn(&str, &RowId, RowInputs<'_>, &RowId, RowInputs<'_>) -> Result<Ordering> + Send + Sync;

/// Assigns a row to a group, or excludes it by returning `None`.
#[derive(Clone)]
pub struct Grouping {
	reads: Dependency,
	callback: Arc<GroupingFn>,
}

impl Grouping {
	/// A grouping callback over its raw inputs.
	pub fn new<F>(reads: Dependency, callback: F) -> Self
	where
		F: Fn(&RowId, RowInputs<'_>) -> Result<Option<String>> + Send + Sync + 'static,
	{
		Self {
			reads,
			callback: Arc::new(callback),
		}
	}

	pub fn with_key<F>(callback: F) -> Self
	where
		F: Fn(&RowId) -> Option<String> + Send + Sync + 'static,
	{
		Self::try_with_key(move |id| Ok(callback(id)))
	}

	pub fn with_payload<F>(callback: F) -> Self
	where
		F: Fn(&RowId, &Value) -> Option<String> + Send + Sync + 'static,
	{
		Self::try_with_payload(move |id, payload| Ok(callback(id, payload)))
	}

	pub fn with_metadata<F>(callback: F) -> Self
	where
		F: Fn(&RowId, &Value) -> Option<String> + Send + Sync + 'static,
	{
		Self::try_with_metadata(move |id, metadata| Ok(callback(id, metadata)))
	}

	pub fn with_payload_and_metadata<F>(callback: F) -> Self
	where
		F: Fn(&RowId, &Value, &Value) -> Option<String> + Send + Sync + 'static,
	{
		Self::try_with_payload_and_metadata(move |id, payload, metadata| Ok(callback(id, payload, metadata)))
	}

	pub fn try_with_key<F>(callback: F) -> Self
	where
		F: Fn(&RowId) -> Result<Option<String>> + Send + Sync + 'static,
	{
		Self::new(Dependency::Key, move |id, _| callback(id))
	}

	pub fn try_with_payload<F>(callback: F) -> Self
	where
		F: Fn(&RowId, &Value) -> Result<Option<String>> + Send + Sync + 'static,
	{
		Self::new(Dependency::Payload, move |id, inputs| callback(id, inputs.payload()))
	}

	pub fn try_with_metadata<F>(callback: F) -> Self
	where
		F: Fn(&RowId, &Value) -> Result<Option<String>> + Send + Sync + 'static,
	{
		Self::new(Dependency::Metadata, move |id, inputs| callback(id, inputs.metadata()))
	}

	pub fn try_with_payload_and_metadata<F>(callback: F) -> Self
	where
		F: Fn(&RowId, &Value, &Value) -> Result<Option<String>> + Send + Sync + 'static,
	{
		Self::new(Dependency::PayloadAndMetadata, move |id, inputs| {
			callback(id, inputs.payload(), inputs.metadata())
		})
	}

	/// The inputs this callback reads.
	pub fn reads(&self) -> Dependency {
		self.reads
	}

	pub fn invoke(&self, id: &RowId, inputs: RowInputs<'_>) -> Result<Option<String>> {
		(self.callback)(id, inputs)
	}
}

impl Debug for Grouping {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Grouping").field("reads", &self.reads).finish_non_exhaustive()
	}
}

/// Orders two rows of the same group. The group name is passed first.
#[derive(Clone)]
pub struct Sorting {
	reads: Dependency,
	callback: Arc<SortingFn>,
}

impl Sorting {
	/// A sorting callback over its raw inputs.
	pub fn new<F>(reads: Dependency, callback: F) -> Self
	where
		F: Fn(&str, &RowId, RowInputs<'_>, &RowId, RowInputs<'_>) -> Result<Ordering> + Send + Sync + 'static,
	{
		Self {
			reads,
			callback: Arc::new(callback),
		}
	}

	pub fn with_key<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &RowId) -> Ordering + Send + Sync + 'static,
	{
		Self::try_with_key(move |group, a, b| Ok(callback(group, a, b)))
	}

	pub fn with_payload<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &Value, &RowId, &Value) -> Ordering + Send + Sync + 'static,
	{
		Self::try_with_payload(move |group, a, pa, b, pb| Ok(callback(group, a, pa, b, pb)))
	}

	pub fn with_metadata<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &Value, &RowId, &Value) -> Ordering + Send + Sync + 'static,
	{
		Self::try_with_metadata(move |group, a, ma, b, mb| Ok(callback(group, a, ma, b, mb)))
	}

	pub fn with_payload_and_metadata<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &Value, &Value, &RowId, &Value, &Value) -> Ordering + Send + Sync + 'static,
	{
		Self::try_with_payload_and_metadata(move |group, a, pa, ma, b, pb, mb| {
			Ok(callback(group, a, pa, ma, b, pb, mb))
		})
	}

	pub fn try_with_key<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &RowId) -> Result<Ordering> + Send + Sync + 'static,
	{
		Self::new(Dependency::Key, move |group, a, _, b, _| callback(group, a, b))
	}

	pub fn try_with_payload<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &Value, &RowId, &Value) -> Result<Ordering> + Send + Sync + 'static,
	{
		Self::new(Dependency::Payload, move |group, a, ia, b, ib| {
			callback(group, a, ia.payload(), b, ib.payload())
		})
	}

	pub fn try_with_metadata<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &Value, &RowId, &Value) -> Result<Ordering> + Send + Sync + 'static,
	{
		Self::new(Dependency::Metadata, move |group, a, ia, b, ib| {
			callback(group, a, ia.metadata(), b, ib.metadata())
		})
	}

	pub fn try_with_payload_and_metadata<F>(callback: F) -> Self
	where
		F: Fn(&str, &RowId, &Value, &Value, &RowId, &Value, &Value) -> Result<Ordering> + Send + Sync + 'static,
	{
		Self::new(Dependency::PayloadAndMetadata, move |group, a, ia, b, ib| {
			callback(group, a, ia.payload(), ia.metadata(), b, ib.payload(), ib.metadata())
		})
	}

	/// The inputs this callback reads.
	pub fn reads(&self) -> Dependency {
		self.reads
	}

	pub fn invoke(
		&self,
		group: &str,
		a: &RowId,
		a_inputs: RowInputs<'_>,
		b: &RowId,
		b_inputs: RowInputs<'_>,
	) -> Result<Ordering> {
		(self.callback)(group, a, a_inputs, b, b_inputs)
	}
}

impl Debug for Sorting {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Sorting").field("reads", &self.reads).finish_non_exhaustive()
	}
}
