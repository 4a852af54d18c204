// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use viewdb_core::{Dependency, Result};
use viewdb_type::{
	error::diagnostic::config::{inconsistent_dependency, missing_grouping, missing_sorting},
	return_error,
};

use crate::callback::{Grouping, Sorting};

/// The immutable definition of a view: both callbacks and their
/// classifications.
///
/// Cloning shares the callbacks, so one extension can back any number of
/// maintenance transactions without locking.
#[derive(Debug, Clone)]
pub struct ViewExtension {
	grouping: Grouping,
	grouping_dependency: Dependency,
	sorting: Sorting,
	sorting_dependency: Dependency,
}

impl ViewExtension {
	pub fn builder() -> ViewBuilder {
		ViewBuilder::new()
	}

	pub fn new(
		grouping: Grouping,
		grouping_dependency: Dependency,
		sorting: Sorting,
		sorting_dependency: Dependency,
	) -> Result<Self> {
		ViewBuilder::new().grouping(grouping_dependency, grouping).sorting(sorting_dependency, sorting).build()
	}

	pub fn grouping(&self) -> &Grouping {
		&self.grouping
	}

	pub fn grouping_dependency(&self) -> Dependency {
		self.grouping_dependency
	}

	pub fn sorting(&self) -> &Sorting {
		&self.sorting
	}

	pub fn sorting_dependency(&self) -> Dependency {
		self.sorting_dependency
	}

	/// True if either callback needs the row's stored content.
	pub fn reads_row(&self) -> bool {
		self.grouping_dependency.reads_row() || self.sorting_dependency.reads_row()
	}
}

#[derive(Debug, Default)]
pub struct ViewBuilder {
	grouping: Option<(Dependency, Grouping)>,
	sorting: Option<(Dependency, Sorting)>,
}

impl ViewBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn grouping(mut self, dependency: Dependency, grouping: Grouping) -> Self {
		self.grouping = Some((dependency, grouping));
		self
	}

	pub fn sorting(mut self, dependency: Dependency, sorting: Sorting) -> Self {
		self.sorting = Some((dependency, sorting));
		self
	}

	/// Validates the configuration.
	///
	/// A classification is consistent when it covers every input the callback
	/// reads. Declaring more than the callback reads only costs extra
	/// recomputation.
	pub fn build(self) -> Result<ViewExtension> {
		let Some((grouping_dependency, grouping)) = self.grouping else {
			return_error!(missing_grouping());
		};

		let Some((sorting_dependency, sorting)) = self.sorting else {
			return_error!(missing_sorting());
		};

		if !grouping_dependency.covers(grouping.reads()) {
			return_error!(inconsistent_dependency(
				"grouping",
				&grouping_dependency.to_string(),
				&grouping.reads().to_string()
			));
		}

		if !sorting_dependency.covers(sorting.reads()) {
			return_error!(inconsistent_dependency(
				"sorting",
				&sorting_dependency.to_string(),
				&sorting.reads().to_string()
			));
		}

		Ok(ViewExtension {
			grouping,
			grouping_dependency,
			sorting,
			sorting_dependency,
		})
	}
}
