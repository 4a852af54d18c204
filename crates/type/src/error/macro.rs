// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

/// Wraps a diagnostic into an [`Error`](crate::Error)
#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::Error($diagnostic)
	};
}

/// Wraps a diagnostic into an `Err(Error)`
#[macro_export]
macro_rules! err {
	($diagnostic:expr) => {
		Err($crate::Error($diagnostic))
	};
}

/// Returns early with the given diagnostic as error
#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::Error($diagnostic))
	};
}

#[cfg(test)]
mod tests {
	use crate::error::diagnostic::store::unknown_extension;

	#[test]
	fn err_macro_wraps_diagnostic() {
		let result: crate::Result<()> = err!(unknown_extension("recent"));
		assert_eq!(result.unwrap_err().code, "STORE_002");
	}

	#[test]
	fn return_error_macro_returns_early() {
		fn lookup(known: bool) -> crate::Result<u8> {
			if !known {
				return_error!(unknown_extension("recent"));
			}
			Ok(1)
		}

		assert_eq!(lookup(true).unwrap(), 1);
		assert_eq!(lookup(false).unwrap_err().code, "STORE_002");
	}
}
