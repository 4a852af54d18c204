// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod extension;
mod source;

pub use extension::{Extension, ExtensionTransaction, RowFailure};
pub use source::{RowIter, RowSource};
