// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

/// Counts callback invocations. Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn tick(&self) {
		self.0.fetch_add(1, Ordering::SeqCst);
	}

	pub fn get(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}

	/// Returns the count and starts over from zero.
	pub fn take(&self) -> usize {
		self.0.swap(0, Ordering::SeqCst)
	}
}
