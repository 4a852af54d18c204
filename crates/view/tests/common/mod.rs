// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![allow(dead_code)]

use std::collections::BTreeMap;

use viewdb_core::{Row, RowId, RowInputs, interface::RowSource};
use viewdb_view::ViewExtension;

/// Groups and sorts every row of `rows` from scratch, stable on scan order.
pub fn full_rebuild(extension: &ViewExtension, rows: &dyn RowSource) -> BTreeMap<String, Vec<RowId>> {
	let mut groups: BTreeMap<String, Vec<(RowId, Row)>> = BTreeMap::new();

	for (id, row) in rows.scan().unwrap() {
		let inputs = RowInputs::restrict(Some(&row), extension.grouping_dependency());
		if let Some(group) = extension.grouping().invoke(&id, inputs).unwrap() {
			groups.entry(group).or_default().push((id, row));
		}
	}

	let dependency = extension.sorting_dependency();
	groups
		.into_iter()
		.map(|(group, mut members)| {
			members.sort_by(|(a, ra), (b, rb)| {
				extension
					.sorting()
					.invoke(
						&group,
						a,
						RowInputs::restrict(Some(ra), dependency),
						b,
						RowInputs::restrict(Some(rb), dependency),
					)
					.unwrap()
			});
			(group, members.into_iter().map(|(id, _)| id).collect())
		})
		.collect()
}

pub fn keys(ids: &[RowId]) -> Vec<&str> {
	ids.iter().map(RowId::key).collect()
}
