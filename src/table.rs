// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{AnyTable, CuckooTable, ExtendibleTable, HybridTable, Key, Stats};
use enum_dispatch::enum_dispatch;

/// Generic table API
///
/// All three table variants implement this trait, so a driver that feeds a
/// stream of keys can treat them interchangeably (see also
/// [`AnyTable`](crate::AnyTable)).
#[enum_dispatch]
pub trait Table {
    /// Inserts a key.
    ///
    /// Returns `Ok(true)` if the key was newly inserted, `Ok(false)` if it
    /// was already present (the table is left untouched).
    ///
    /// # Errors
    ///
    /// Will return `Err` if the insert would require growing the table past
    /// its configured size ceiling.
    fn insert(&mut self, key: Key) -> crate::Result<bool>;

    /// Returns `true` if the key is in the table.
    fn contains(&self, key: Key) -> bool;

    /// Returns the number of stored keys.
    fn len(&self) -> usize;

    /// Returns `true` if the table is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns aggregate statistics about the table.
    fn stats(&self) -> Stats;
}
