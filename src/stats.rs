// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::time::Duration;

/// Aggregate statistics about a table.
///
/// Diagnostic only; nothing in the insert/lookup contract depends on these
/// numbers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of keys currently stored.
    pub key_count: usize,

    /// Number of distinct buckets (extendible variants) or total slots
    /// across both arrays (cuckoo variant).
    pub container_count: usize,

    /// Directory entries (extendible variants) or slots per array (cuckoo
    /// variant).
    pub table_size: usize,

    /// Wall-clock time spent inside `insert` so far.
    pub insert_time: Duration,
}
