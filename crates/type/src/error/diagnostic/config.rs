// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// The view was built without a grouping callback
pub fn missing_grouping() -> Diagnostic {
	Diagnostic {
		code: "CONFIG_001".to_string(),
		message: "view requires a grouping callback".to_string(),
		label: None,
		help: Some("call `ViewBuilder::grouping` before `build`".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The view was built without a sorting callback
pub fn missing_sorting() -> Diagnostic {
	Diagnostic {
		code: "CONFIG_002".to_string(),
		message: "view requires a sorting callback".to_string(),
		label: None,
		help: Some("call `ViewBuilder::sorting` before `build`".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The declared dependency does not cover what the callback reads
pub fn inconsistent_dependency(role: &str, declared: &str, reads: &str) -> Diagnostic {
	Diagnostic {
		code: "CONFIG_003".to_string(),
		message: format!("{} callback is classified as `{}` but reads `{}`", role, declared, reads),
		label: Some(format!("{} classification too narrow", role)),
		help: Some(format!(
			"classify the {} callback with a dependency that includes `{}`, or construct the callback with the narrower shape",
			role, reads
		)),
		notes: vec!["the classification decides which row updates re-invoke the callback".to_string()],
		cause: None,
	}
}
