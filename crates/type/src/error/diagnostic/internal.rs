// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// Creates a detailed internal error diagnostic with source location and
/// context
pub fn internal_with_context(
	reason: impl Into<String>,
	file: &str,
	line: u32,
	column: u32,
	function: &str,
	module_path: &str,
) -> Diagnostic {
	let reason = reason.into();

	let error_id = format!("ERR-{}:{}", file.split('/').last().unwrap_or(file).replace(".rs", ""), line);

	let detailed_message = format!("Internal error [{}]: {}", error_id, reason);

	let location_info =
		format!("Location: {}:{}:{}\nFunction: {}\nModule: {}", file, line, column, function, module_path);

	let help_message = format!(
		"This is an internal error that should never occur in normal operation.\n\n\
         Include the following information when reporting it:\n\
         Error ID: {}\n\
         {}\n\
         Version: {}\n\
         Platform: {} {}",
		error_id,
		location_info,
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	);

	Diagnostic {
		code: "INTERNAL_ERROR".to_string(),
		message: detailed_message,
		label: Some(format!("Internal invariant violated at {}:{}:{}", file, line, column)),
		help: Some(help_message),
		notes: vec![
			format!("Error occurred in function: {}", function),
			"This error indicates a critical internal inconsistency.".to_string(),
			"The batch that detected it was not committed.".to_string(),
		],
		cause: None,
	}
}

/// Simplified internal error without detailed context
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	internal_with_context(reason, "unknown", 0, 0, "unknown", "unknown")
}

/// Macro to create an internal error with automatic source location capture
#[macro_export]
macro_rules! internal_error {
    ($reason:expr) => {
        $crate::error::diagnostic::internal_with_context(
            $reason,
            file!(),
            line!(),
            column!(),
            {
                fn f() {}
                fn type_name_of<T>(_: T) -> &'static str {
                    std::any::type_name::<T>()
                }
                let name = type_name_of(f);
                &name[..name.len() - 3]
            },
            module_path!()
        )
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::diagnostic::internal_with_context(
            format!($fmt, $($arg)*),
            file!(),
            line!(),
            column!(),
            {
                fn f() {}
                fn type_name_of<T>(_: T) -> &'static str {
                    std::any::type_name::<T>()
                }
                let name = type_name_of(f);
                &name[..name.len() - 3]
            },
            module_path!()
        )
    };
}

/// Macro to create an internal error result with automatic source location
/// capture
#[macro_export]
macro_rules! internal_err {
    ($reason:expr) => {
        Err($crate::Error($crate::internal_error!($reason)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        Err($crate::Error($crate::internal_error!($fmt, $($arg)*)))
    };
}

/// Macro to return an internal error with automatic source location capture
#[macro_export]
macro_rules! return_internal_error {
    ($reason:expr) => {
        return Err($crate::Error($crate::internal_error!($reason)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error($crate::internal_error!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn internal_error_captures_location() {
		let diagnostic = internal_error!("position {} out of bounds", 7);

		assert_eq!(diagnostic.code, "INTERNAL_ERROR");
		assert!(diagnostic.message.contains("position 7 out of bounds"));
		assert!(diagnostic.label.as_ref().unwrap().contains("internal.rs"));
		assert!(diagnostic.notes.iter().any(|n| n.contains("internal_error_captures_location")));
	}

	#[test]
	fn internal_err_produces_error_result() {
		let result: crate::Result<()> = internal_err!("index and reverse index disagree");
		let error = result.unwrap_err();
		assert_eq!(error.code, "INTERNAL_ERROR");
		assert!(error.message.contains("disagree"));
	}

	#[test]
	fn return_internal_error_returns_early() {
		fn check(len: usize) -> crate::Result<()> {
			if len > 2 {
				return_internal_error!("group has {} members", len);
			}
			Ok(())
		}

		assert!(check(1).is_ok());
		assert!(check(3).unwrap_err().message.contains("group has 3 members"));
	}

	#[test]
	fn internal_without_context() {
		let diagnostic = internal("basic");
		assert!(diagnostic.label.as_ref().unwrap().contains("unknown:0:0"));
	}
}
