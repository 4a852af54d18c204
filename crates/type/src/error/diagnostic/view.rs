// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;
use crate::CommitVersion;

/// The grouping callback reported a failure for a row
pub fn grouping_failed(row: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VIEW_001".to_string(),
		message: format!("grouping callback failed for row {}: {}", row, reason.into()),
		label: None,
		help: Some("the row is excluded from the view until its next successful update".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The grouping callback returned an empty label
pub fn invalid_group(row: &str) -> Diagnostic {
	Diagnostic {
		code: "VIEW_002".to_string(),
		message: format!("grouping callback returned an empty group for row {}", row),
		label: Some("empty group label".to_string()),
		help: Some("return `None` to exclude a row from the view".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The sorting callback reported a failure while placing a row
pub fn sorting_failed(group: &str, row: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VIEW_003".to_string(),
		message: format!("sorting callback failed in group '{}' for row {}: {}", group, row, reason.into()),
		label: None,
		help: Some("the row is excluded from the view until its next successful update".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A callback reported a failure, created by user callbacks
pub fn callback_failed(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "VIEW_008".to_string(),
		message: reason.into(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// The change log no longer holds every batch after the given version
pub fn changes_unavailable(since: CommitVersion, floor: CommitVersion) -> Diagnostic {
	Diagnostic {
		code: "VIEW_004".to_string(),
		message: format!("changes since version {} are no longer retained", since),
		label: Some(format!("oldest derivable version is {}", floor)),
		help: Some("take a fresh snapshot or raise `ViewConfig::change_log_retention`".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The given version is newer than anything the view has committed
pub fn unknown_version(version: CommitVersion, current: CommitVersion) -> Diagnostic {
	Diagnostic {
		code: "VIEW_005".to_string(),
		message: format!("version {} is newer than the current view version {}", version, current),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Maintenance was requested on a view that was never attached to a store
pub fn not_attached() -> Diagnostic {
	Diagnostic {
		code: "VIEW_006".to_string(),
		message: "view is not attached".to_string(),
		label: None,
		help: Some("register the view with a store before writing through it".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A maintenance transaction operation was invoked in the wrong state
pub fn invalid_state(operation: &str, state: &str) -> Diagnostic {
	Diagnostic {
		code: "VIEW_007".to_string(),
		message: format!("cannot {} a maintenance transaction in state {}", operation, state),
		label: None,
		help: Some("call collect, classify, apply and commit in that order"
			.to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The view already maintains a projection for some store
pub fn already_attached() -> Diagnostic {
	Diagnostic {
		code: "VIEW_009".to_string(),
		message: "view is already attached".to_string(),
		label: None,
		help: Some("detach the view before attaching it again".to_string()),
		notes: vec![],
		cause: None,
	}
}
