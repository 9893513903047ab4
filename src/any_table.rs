// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{CuckooTable, ExtendibleTable, HybridTable};
use enum_dispatch::enum_dispatch;

/// May be any of the three table variants.
#[enum_dispatch(Table)]
pub enum AnyTable {
    /// Pure cuckoo hashing, see [`CuckooTable`]
    Cuckoo(CuckooTable),

    /// Extendible hashing with multi-key buckets, see [`ExtendibleTable`]
    Extendible(ExtendibleTable),

    /// Hybrid extendible/cuckoo hashing, see [`HybridTable`]
    Hybrid(HybridTable),
}
