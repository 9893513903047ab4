// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{directory::Directory, Config, HashPair, Key, Stats, Xxh3Pair};
use std::time::{Duration, Instant};

/// Dynamic hash table using extendible hashing with multi-key buckets.
///
/// A directory of `2^depth` entries, indexed by the low `depth` bits of
/// `hash1(key)`, points into a set of buckets holding up to
/// [`Config::bucket_size`] keys each. When a bucket overflows it splits,
/// doubling the directory first if the bucket was down to its last entry.
///
/// Lookups address the key's bucket directly and scan only its keys.
pub struct ExtendibleTable<H: HashPair = Xxh3Pair> {
    directory: Directory,
    hasher: H,
    insert_time: Duration,
}

impl ExtendibleTable<Xxh3Pair> {
    /// Creates an extendible table with the default hash pair.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_hasher(config, Xxh3Pair)
    }
}

impl<H: HashPair> ExtendibleTable<H> {
    /// Creates an extendible table using the given hash pair.
    ///
    /// Only the pair's first function is consumed; the second exists for
    /// interchangeability with the other variants.
    #[must_use]
    pub fn with_hasher(config: Config, hasher: H) -> Self {
        Self {
            directory: Directory::new(config.bucket_size.max(1), config.max_table_size),
            hasher,
            insert_time: Duration::ZERO,
        }
    }

    /// Returns the number of directory entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.directory.size()
    }

    /// Returns the directory depth (number of hash bits used).
    #[must_use]
    pub fn depth(&self) -> u8 {
        self.directory.depth()
    }

    /// Returns the number of distinct buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.directory.bucket_count()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directory.len() == 0
    }

    /// Returns `true` if the key is in the table.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.directory.contains(self.hasher.hash1(key), key)
    }

    /// Inserts a key.
    ///
    /// Returns `Ok(true)` if the key was newly inserted, `Ok(false)` if it
    /// was already present.
    ///
    /// # Errors
    ///
    /// Will return `Err` if a bucket split would grow the directory past the
    /// configured size ceiling.
    pub fn insert(&mut self, key: Key) -> crate::Result<bool> {
        let start = Instant::now();
        let result = self.insert_inner(key);
        self.insert_time += start.elapsed();
        result
    }

    fn insert_inner(&mut self, key: Key) -> crate::Result<bool> {
        if self.contains(key) {
            return Ok(false);
        }

        let hash = self.hasher.hash1(key);

        loop {
            let address = self.directory.address_of(hash);

            if !self.directory.is_full(address) {
                self.directory.push(address, key);
                return Ok(true);
            }

            // split until the addressed bucket has room; the address has to
            // be recomputed afterwards because the depth may have grown
            let hasher = &self.hasher;
            self.directory.split(address, |k| hasher.hash1(k))?;
        }
    }

    /// Returns aggregate statistics about the table.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            key_count: self.directory.len(),
            container_count: self.directory.bucket_count(),
            table_size: self.directory.size(),
            insert_time: self.insert_time,
        }
    }

    #[doc(hidden)]
    #[must_use]
    pub fn is_directory_consistent(&self) -> bool {
        self.directory.is_consistent()
            && self.directory.buckets().iter().all(|bucket| {
                bucket.keys.iter().all(|&key| {
                    crate::hash::rightmost_bits(bucket.depth, self.hasher.hash1(key)) == bucket.id
                })
            })
    }
}

impl<H: HashPair> crate::Table for ExtendibleTable<H> {
    fn insert(&mut self, key: Key) -> crate::Result<bool> {
        Self::insert(self, key)
    }

    fn contains(&self, key: Key) -> bool {
        Self::contains(self, key)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn stats(&self) -> Stats {
        Self::stats(self)
    }
}

impl<H: HashPair> std::fmt::Display for ExtendibleTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "--- extendible table, {} entries (depth {})",
            self.size(),
            self.depth(),
        )?;
        write!(f, "{}", self.directory)?;
        write!(f, "--- end table ---")
    }
}
