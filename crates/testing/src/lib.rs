// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared helpers for the viewdb test suites.

mod counter;
pub mod fixture;
mod source;
mod subscriber;

pub use counter::CallCounter;
pub use source::{FailingSource, MemorySource};
pub use subscriber::init_tracing;
