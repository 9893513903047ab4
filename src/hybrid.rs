// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{directory::Directory, Config, HashPair, Key, Stats, Xxh3Pair};
use std::time::{Duration, Instant};

/// The two directories a key can live in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Side {
    A,
    B,
}

impl Side {
    fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Dynamic hash table combining extendible and cuckoo hashing.
///
/// Two extendible directories with single-key buckets: directory A is
/// addressed by the low bits of `hash1(key)`, directory B by `hash2(key)`.
/// A key collision first splits the occupied bucket (growing the directory
/// as in [`ExtendibleTable`](crate::ExtendibleTable)); if the two keys still
/// share their low hash bits afterwards, the resident is evicted
/// cuckoo-style and retried in the other directory.
///
/// Insertion starts in whichever directory holds fewer keys (ties favor A).
/// Displacement cycles are resolved by forcing directory growth; an insert
/// fails only once both directories have reached the configured ceiling.
pub struct HybridTable<H: HashPair = Xxh3Pair> {
    directory_a: Directory,
    directory_b: Directory,
    hasher: H,
    insert_time: Duration,
}

impl HybridTable<Xxh3Pair> {
    /// Creates a hybrid table with the default hash pair.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_hasher(config, Xxh3Pair)
    }
}

impl<H: HashPair> HybridTable<H> {
    /// Creates a hybrid table using the given hash pair.
    #[must_use]
    pub fn with_hasher(config: Config, hasher: H) -> Self {
        Self {
            directory_a: Directory::new(1, config.max_table_size),
            directory_b: Directory::new(1, config.max_table_size),
            hasher,
            insert_time: Duration::ZERO,
        }
    }

    fn directory(&self, side: Side) -> &Directory {
        match side {
            Side::A => &self.directory_a,
            Side::B => &self.directory_b,
        }
    }

    fn directory_mut(&mut self, side: Side) -> &mut Directory {
        match side {
            Side::A => &mut self.directory_a,
            Side::B => &mut self.directory_b,
        }
    }

    fn hash(&self, side: Side, key: Key) -> u64 {
        match side {
            Side::A => self.hasher.hash1(key),
            Side::B => self.hasher.hash2(key),
        }
    }

    /// Returns the number of stored keys across both directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directory_a.len() + self.directory_b.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the per-directory key counts `(A, B)`.
    #[must_use]
    pub fn directory_lens(&self) -> (usize, usize) {
        (self.directory_a.len(), self.directory_b.len())
    }

    /// Returns the per-directory entry counts `(A, B)`.
    #[must_use]
    pub fn directory_sizes(&self) -> (usize, usize) {
        (self.directory_a.size(), self.directory_b.size())
    }

    /// Returns `true` if the key is in the table.
    ///
    /// Probes one bucket per directory.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.directory_a.contains(self.hasher.hash1(key), key)
            || self.directory_b.contains(self.hasher.hash2(key), key)
    }

    /// Inserts a key.
    ///
    /// Returns `Ok(true)` if the key was newly inserted, `Ok(false)` if it
    /// was already present.
    ///
    /// # Errors
    ///
    /// Will return `Err` if resolving the collisions would grow a directory
    /// past the configured size ceiling.
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

        // start in the directory currently holding fewer keys, ties favor A
        let mut side = if self.directory_a.len() <= self.directory_b.len() {
            Side::A
        } else {
            Side::B
        };

        let mut carried = key;
        let mut displacements = 0usize;

        // every swap is recorded so a fatal growth failure can be unwound
        // without losing a resident key
        let mut trail: Vec<(Side, Key)> = Vec::new();

        loop {
            let hash = self.hash(side, carried);
            let mut address = self.directory(side).address_of(hash);

            if !self.directory(side).is_full(address) {
                self.directory_mut(side).push(address, carried);
                return Ok(true);
            }

            // the addressed single-key bucket is occupied: split it so the
            // resident (and future keys with this prefix) diverge, then
            // retry once in the same directory under the new depth
            if self.directory(side).can_split(address) {
                self.split(side, address)?;

                address = self.directory(side).address_of(hash);

                if !self.directory(side).is_full(address) {
                    self.directory_mut(side).push(address, carried);
                    return Ok(true);
                }
            }

            // still colliding (or the directory cannot grow): evict the
            // resident and retry it in the other directory
            trail.push((side, carried));
            carried = self.directory_mut(side).swap_resident(address, carried);
            displacements += 1;

            let cycled = displacements > self.len() && carried == key;
            let exhausted = displacements > self.directory_a.size() + self.directory_b.size();

            if cycled || exhausted {
                // resolve by growth, like the pure cuckoo variant: force the
                // directories deeper so the colliding keys can separate
                log::warn!(
                    "Displacement cycle in hybrid table after {displacements} displacements; \
                     forcing directory growth",
                );

                if let Err(e) = self.force_growth(side) {
                    self.unwind(&trail, carried);
                    return Err(e);
                }

                displacements = 0;
            }

            side = side.other();
        }
    }

    /// Doubles one of the directories, preferring the one the displacement
    /// walk enters next. Fails only if both are at their ceiling.
    fn force_growth(&mut self, side: Side) -> crate::Result<()> {
        self.directory_mut(side.other())
            .double()
            .or_else(|_| self.directory_mut(side).double())
    }

    /// Reverses a displacement walk, restoring every evicted resident.
    ///
    /// Removes each placed key from its current bucket and restores the key
    /// it had evicted at that key's *own* current address. The two addresses
    /// can differ: a split after the swap may have driven the directory past
    /// the bit where the two hashes diverge. The restore bucket is always
    /// free, because the restored key was its sole occupant before the swap
    /// and splits never mix key prefixes.
    fn unwind(&mut self, trail: &[(Side, Key)], carried: Key) {
        let mut carried = carried;

        for &(side, placed) in trail.iter().rev() {
            let address = self.directory(side).address_of(self.hash(side, placed));
            let evicted = self.directory_mut(side).take_resident(address);

            debug_assert_eq!(placed, evicted, "trail should replay in reverse");

            let home = self.directory(side).address_of(self.hash(side, carried));
            self.directory_mut(side).push(home, carried);

            carried = evicted;
        }
    }

    fn split(&mut self, side: Side, address: usize) -> crate::Result<()> {
        let hasher = &self.hasher;

        match side {
            Side::A => self.directory_a.split(address, |k| hasher.hash1(k)),
            Side::B => self.directory_b.split(address, |k| hasher.hash2(k)),
        }
    }

    /// Returns aggregate statistics about the table.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            key_count: self.len(),
            container_count: self.directory_a.bucket_count() + self.directory_b.bucket_count(),
            table_size: self.directory_a.size() + self.directory_b.size(),
            insert_time: self.insert_time,
        }
    }

    #[doc(hidden)]
    #[must_use]
    pub fn is_directory_consistent(&self) -> bool {
        let keys_match = |directory: &Directory, hash: &dyn Fn(Key) -> u64| {
            directory.buckets().iter().all(|bucket| {
                bucket.keys.iter().all(|&key| {
                    crate::hash::rightmost_bits(bucket.depth, hash(key)) == bucket.id
                })
            })
        };

        self.directory_a.is_consistent()
            && self.directory_b.is_consistent()
            && keys_match(&self.directory_a, &|k| self.hasher.hash1(k))
            && keys_match(&self.directory_b, &|k| self.hasher.hash2(k))
    }
}

impl<H: HashPair> crate::Table for HybridTable<H> {
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

impl<H: HashPair> std::fmt::Display for HybridTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "--- hybrid table")?;

        for (name, directory) in [("A", &self.directory_a), ("B", &self.directory_b)] {
            writeln!(
                f,
                "directory {name}: {} entries (depth {}), {} keys",
                directory.size(),
                directory.depth(),
                directory.len(),
            )?;
            write!(f, "{directory}")?;
        }

        write!(f, "--- end table ---")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashPair;
    use test_log::test;

    /// Identity on one side, shifted identity on the other.
    struct SplitPair;

    impl HashPair for SplitPair {
        fn hash1(&self, key: Key) -> u64 {
            key
        }

        fn hash2(&self, key: Key) -> u64 {
            key >> 4
        }
    }

    #[test]
    fn hybrid_empty_lookup() {
        let table = HybridTable::new(Config::default());
        assert!(!table.contains(0));
        assert!(!table.contains(u64::MAX));
        assert!(table.is_empty());
    }

    #[test]
    fn hybrid_insert_lookup() -> crate::Result<()> {
        let mut table = HybridTable::new(Config::default());

        assert!(table.insert(5)?);
        assert!(table.contains(5));
        assert!(!table.contains(6));
        assert_eq!(1, table.len());

        Ok(())
    }

    #[test]
    fn hybrid_duplicate_rejected() -> crate::Result<()> {
        let mut table = HybridTable::new(Config::default());

        assert!(table.insert(7)?);
        assert!(!table.insert(7)?);
        assert_eq!(1, table.len());

        Ok(())
    }

    #[test]
    fn hybrid_balances_directories() -> crate::Result<()> {
        let mut table = HybridTable::new(Config::default());

        // every insert starts in the smaller directory, so neither side can
        // starve (a displacement chain may still terminate on either side)
        for key in 0..100 {
            assert!(table.insert(key)?);
        }

        let (a, b) = table.directory_lens();
        assert_eq!(100, a + b);
        assert!(a.min(b) >= 10, "starved directory: A={a} B={b}");

        Ok(())
    }

    #[test]
    fn hybrid_first_key_goes_to_a() -> crate::Result<()> {
        let mut table = HybridTable::new(Config::default());

        table.insert(42)?;

        let (a, b) = table.directory_lens();
        assert_eq!(1, a);
        assert_eq!(0, b);

        Ok(())
    }

    #[test]
    fn hybrid_displacement_moves_resident() -> crate::Result<()> {
        let mut table = HybridTable::with_hasher(Config::default(), SplitPair);

        // fill one slot in each directory first
        assert!(table.insert(0)?);
        assert!(table.insert(1)?);

        // 16 starts in A (tie) and collides with 0 there even after a split
        // (their hash1 values share bit 0), so 0 is displaced into B, where
        // it collides with 1, which in turn finds a home in A after B has
        // been split
        assert!(table.insert(16)?);

        assert!(table.contains(0));
        assert!(table.contains(1));
        assert!(table.contains(16));

        let (a, b) = table.directory_lens();
        assert_eq!(3, a + b);
        assert!(a >= 1 && b >= 1, "displacement must spread across both");
        assert!(table.is_directory_consistent());

        Ok(())
    }

    #[test]
    fn hybrid_growth_preserves_membership() -> crate::Result<()> {
        let mut table = HybridTable::new(Config::default());
        let (mut size_a, mut size_b) = table.directory_sizes();

        for key in 0..1_000 {
            assert!(table.insert(key)?);

            let (a, b) = table.directory_sizes();
            assert!(a >= size_a && b >= size_b, "directories must never shrink");
            size_a = a;
            size_b = b;
        }

        assert_eq!(1_000, table.len());
        assert!(table.is_directory_consistent());

        for key in 0..1_000 {
            assert!(table.contains(key));
        }

        Ok(())
    }

    #[test]
    fn hybrid_capacity_ceiling() -> crate::Result<()> {
        struct ConstPair;

        impl HashPair for ConstPair {
            fn hash1(&self, _: Key) -> u64 {
                0
            }

            fn hash2(&self, _: Key) -> u64 {
                0
            }
        }

        let mut table =
            HybridTable::with_hasher(Config::default().max_table_size(4), ConstPair);

        // constant hashes: one key per directory fits, a third can never be
        // separated no matter how far the directories grow
        assert!(table.insert(1)?);
        assert!(table.insert(2)?);

        let result = table.insert(3);
        assert!(matches!(result, Err(crate::Error::CapacityExceeded { .. })));

        // a failed insert must leave both residents untouched
        assert!(table.contains(1));
        assert!(table.contains(2));
        assert!(!table.contains(3));
        assert_eq!(2, table.len());
        assert!(table.is_directory_consistent());

        Ok(())
    }

    /// Scripted hashes for keys 0..7, arranged so that a bucket split lands
    /// between a displacement and the growth failure that unwinds it: the
    /// evicted key's restore address then differs from the key that evicted
    /// it.
    struct ScriptedPair;

    impl ScriptedPair {
        fn scripted(table: &[u64; 7], key: Key) -> u64 {
            *table
                .get(key as usize)
                .expect("key should be within the scripted range")
        }
    }

    impl HashPair for ScriptedPair {
        fn hash1(&self, key: Key) -> u64 {
            Self::scripted(&[3, 7, 6, 7, 6, 2, 2], key)
        }

        fn hash2(&self, key: Key) -> u64 {
            Self::scripted(&[6, 2, 3, 3, 5, 7, 2], key)
        }
    }

    #[test]
    fn hybrid_failed_insert_restores_displaced_keys() -> crate::Result<()> {
        let mut table =
            HybridTable::with_hasher(Config::default().max_table_size(8), ScriptedPair);

        for key in 0..4 {
            assert!(table.insert(key)?);
        }

        let result = table.insert(4);
        assert!(matches!(result, Err(crate::Error::CapacityExceeded { .. })));

        // the failed walk displaced residents across splits; every one of
        // them must be back in the bucket its own hash addresses
        for key in 0..4 {
            assert!(table.contains(key), "lost {key} on a failed insert");
        }
        assert!(!table.contains(4));
        assert_eq!(4, table.len());
        assert!(table.is_directory_consistent());

        Ok(())
    }

    #[test]
    fn hybrid_display_dump() -> crate::Result<()> {
        let mut table = HybridTable::new(Config::default());
        table.insert(77)?;

        let dump = table.to_string();
        assert!(dump.contains("hybrid table"));
        assert!(dump.contains("directory A"));
        assert!(dump.contains("directory B"));
        assert!(dump.contains("77"));

        Ok(())
    }
}
