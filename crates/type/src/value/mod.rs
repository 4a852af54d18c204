// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod row_id;
mod version;

pub use row_id::RowId;
/// Row payloads and metadata are opaque JSON documents to the view machinery.
pub use serde_json::Value;
pub use version::CommitVersion;
