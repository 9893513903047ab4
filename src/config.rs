// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Default number of slots per cuckoo slot array.
pub const DEFAULT_INITIAL_CAPACITY: usize = 4;

/// Default number of keys per extendible bucket.
pub const DEFAULT_BUCKET_SIZE: usize = 4;

/// Default size ceiling (slots per array, or directory entries).
pub const DEFAULT_MAX_TABLE_SIZE: usize = 1 << 26;

/// Table configuration
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Slots per inner array a [`CuckooTable`](crate::CuckooTable) starts
    /// with; ignored by the extendible variants, which always start with a
    /// single bucket.
    pub initial_capacity: usize,

    /// Keys per bucket in an [`ExtendibleTable`](crate::ExtendibleTable);
    /// ignored by the other variants.
    pub bucket_size: usize,

    /// Size a table is never allowed to grow past (slots per array for the
    /// cuckoo table, directory entries for the extendible variants).
    ///
    /// Growing past this ceiling fails the offending insert with
    /// [`Error::CapacityExceeded`](crate::Error::CapacityExceeded).
    pub max_table_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            bucket_size: DEFAULT_BUCKET_SIZE,
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
        }
    }
}

impl Config {
    /// Sets the initial capacity of each cuckoo slot array.
    ///
    /// Clamped to at least 1 slot.
    #[must_use]
    pub fn initial_capacity(mut self, slots: usize) -> Self {
        self.initial_capacity = slots.max(1);
        self
    }

    /// Sets the number of keys per extendible bucket.
    ///
    /// Clamped to at least 1 key.
    #[must_use]
    pub fn bucket_size(mut self, keys: usize) -> Self {
        self.bucket_size = keys.max(1);
        self
    }

    /// Sets the table size ceiling.
    #[must_use]
    pub fn max_table_size(mut self, size: usize) -> Self {
        self.max_table_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn config_builder() {
        let config = Config::default()
            .initial_capacity(16)
            .bucket_size(2)
            .max_table_size(1 << 10);

        assert_eq!(16, config.initial_capacity);
        assert_eq!(2, config.bucket_size);
        assert_eq!(1 << 10, config.max_table_size);
    }

    #[test]
    fn config_clamps_zero() {
        let config = Config::default().initial_capacity(0).bucket_size(0);
        assert_eq!(1, config.initial_capacity);
        assert_eq!(1, config.bucket_size);
    }
}
