// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn extension_already_registered(name: &str) -> Diagnostic {
	Diagnostic {
		code: "STORE_001".to_string(),
		message: format!("extension '{}' is already registered", name),
		label: None,
		help: Some("unregister the existing extension first or pick another name".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn unknown_extension(name: &str) -> Diagnostic {
	Diagnostic {
		code: "STORE_002".to_string(),
		message: format!("extension '{}' is not registered", name),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// Reading a row from storage failed
pub fn row_read_failed(row: &str, reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "STORE_003".to_string(),
		message: format!("failed to read row {}: {}", row, reason.into()),
		label: None,
		help: None,
		notes: vec!["the whole batch is discarded".to_string()],
		cause: None,
	}
}

pub fn invalid_row_id(collection: &str, key: &str) -> Diagnostic {
	Diagnostic {
		code: "STORE_004".to_string(),
		message: format!("invalid row identifier '{}/{}'", collection, key),
		label: Some("collection must not be empty".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// The same extension instance was registered under a second name
pub fn extension_instance_registered(name: &str, existing: &str) -> Diagnostic {
	Diagnostic {
		code: "STORE_005".to_string(),
		message: format!("extension '{}' is already registered as '{}'", name, existing),
		label: None,
		help: Some("create a separate extension instance for every registration".to_string()),
		notes: vec![],
		cause: None,
	}
}
