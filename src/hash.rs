// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::Key;

/// A pair of independent hash functions over 64-bit keys.
///
/// Every table in this crate consumes the *low-order* bits of these hash
/// values for addressing, so both functions need to distribute well in their
/// low bits. The two functions must be independent of each other: the cuckoo
/// and hybrid tables rely on a key having two unrelated home addresses.
pub trait HashPair {
    /// First hash function.
    fn hash1(&self, key: Key) -> u64;

    /// Second hash function.
    fn hash2(&self, key: Key) -> u64;
}

const SEED_2: u64 = 0xb2e1_3a70_9c5d_f84b;

/// Default [`HashPair`] built on two differently seeded XXH3 instances.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Xxh3Pair;

impl HashPair for Xxh3Pair {
    fn hash1(&self, key: Key) -> u64 {
        xxhash_rust::xxh3::xxh3_64(&key.to_le_bytes())
    }

    fn hash2(&self, key: Key) -> u64 {
        xxhash_rust::xxh3::xxh3_64_with_seed(&key.to_le_bytes(), SEED_2)
    }
}

/// Keeps the low `depth` bits of `hash`; the addressing rule shared by the
/// extendible directories.
pub(crate) fn rightmost_bits(depth: u8, hash: u64) -> usize {
    debug_assert!(depth < 64);

    #[allow(clippy::cast_possible_truncation)]
    let address = (hash & ((1u64 << depth) - 1)) as usize;

    address
}
