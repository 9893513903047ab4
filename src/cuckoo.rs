// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{Config, Error, HashPair, Key, Stats, Xxh3Pair};
use std::time::{Duration, Instant};

/// The two slot arrays a key can live in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Side {
    One,
    Two,
}

impl Side {
    fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// Dynamic hash table using pure cuckoo hashing.
///
/// Keys live in one of two flat slot arrays: at `hash1(key) % size` in the
/// first or `hash2(key) % size` in the second. Collisions are resolved by
/// displacement: the resident key is evicted and retried in the other array,
/// alternating until a free slot is found. A displacement cycle doubles both
/// arrays and rehashes every stored key.
///
/// Because insertion always leaves every present key at one of its two home
/// slots, lookup probes exactly two slots.
pub struct CuckooTable<H: HashPair = Xxh3Pair> {
    table1: Vec<Option<Key>>,
    table2: Vec<Option<Key>>,
    len: usize,
    max_table_size: usize,
    hasher: H,
    insert_time: Duration,
}

impl CuckooTable<Xxh3Pair> {
    /// Creates a cuckoo table with the default hash pair.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_hasher(config, Xxh3Pair)
    }
}

impl<H: HashPair> CuckooTable<H> {
    /// Creates a cuckoo table using the given hash pair.
    #[must_use]
    pub fn with_hasher(config: Config, hasher: H) -> Self {
        let capacity = config.initial_capacity.max(1);

        Self {
            table1: vec![None; capacity],
            table2: vec![None; capacity],
            len: 0,
            max_table_size: config.max_table_size,
            hasher,
            insert_time: Duration::ZERO,
        }
    }

    /// Returns the number of slots per array.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.table1.len()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn home(hasher: &H, side: Side, size: usize, key: Key) -> usize {
        let hash = match side {
            Side::One => hasher.hash1(key),
            Side::Two => hasher.hash2(key),
        };

        #[allow(clippy::cast_possible_truncation)]
        let address = (hash % size as u64) as usize;

        address
    }

    /// Returns `true` if the key is in the table.
    ///
    /// Probes only the key's two home slots, which is valid because
    /// insertion never leaves a key anywhere else.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        let address1 = Self::home(&self.hasher, Side::One, self.capacity(), key);
        let address2 = Self::home(&self.hasher, Side::Two, self.capacity(), key);

        self.table1
            .get(address1)
            .is_some_and(|slot| *slot == Some(key))
            || self
                .table2
                .get(address2)
                .is_some_and(|slot| *slot == Some(key))
    }

    /// Inserts a key.
    ///
    /// Returns `Ok(true)` if the key was newly inserted, `Ok(false)` if it
    /// was already present.
    ///
    /// # Errors
    ///
    /// Will return `Err` if resolving a displacement cycle would grow the
    /// arrays past the configured size ceiling.
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

        loop {
            if Self::place(&self.hasher, &mut self.table1, &mut self.table2, key) {
                self.len += 1;
                return Ok(true);
            }

            // a displacement cycle leaves the resident key set untouched
            // (the walk ends with the original key evicted back out), so we
            // can grow and retry
            self.grow()?;
        }
    }

    /// Runs the displacement walk for one key, alternating arrays.
    ///
    /// Returns `false` if a cycle was detected: more displacements than
    /// slots per array, with the carried key back to the original one.
    fn place(
        hasher: &H,
        table1: &mut [Option<Key>],
        table2: &mut [Option<Key>],
        key: Key,
    ) -> bool {
        let size = table1.len();
        let mut carried = key;
        let mut side = Side::One;
        let mut rotations = 0;

        loop {
            let address = Self::home(hasher, side, size, carried);
            let slot = match side {
                Side::One => table1.get_mut(address),
                Side::Two => table2.get_mut(address),
            }
            .expect("home address should be within the array");

            match slot.replace(carried) {
                None => return true,
                Some(evicted) => {
                    carried = evicted;
                    rotations += 1;
                    side = side.other();

                    if rotations > size && carried == key {
                        return false;
                    }
                }
            }
        }
    }

    /// Doubles both arrays and rehashes every stored key, doubling again if
    /// the rehash itself cycles.
    fn grow(&mut self) -> crate::Result<()> {
        let mut capacity = self.capacity() * 2;

        'growth: loop {
            if capacity > self.max_table_size {
                return Err(Error::CapacityExceeded {
                    requested: capacity,
                    maximum: self.max_table_size,
                });
            }

            let mut table1 = vec![None; capacity];
            let mut table2 = vec![None; capacity];

            let residents = self
                .table1
                .iter()
                .chain(self.table2.iter())
                .filter_map(|slot| *slot);

            for resident in residents {
                if !Self::place(&self.hasher, &mut table1, &mut table2, resident) {
                    capacity *= 2;
                    continue 'growth;
                }
            }

            log::trace!("Growing cuckoo table to {capacity} slots per array");

            self.table1 = table1;
            self.table2 = table2;

            return Ok(());
        }
    }

    /// Returns aggregate statistics about the table.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            key_count: self.len,
            container_count: self.capacity() * 2,
            table_size: self.capacity(),
            insert_time: self.insert_time,
        }
    }
}

impl<H: HashPair> crate::Table for CuckooTable<H> {
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

impl<H: HashPair> std::fmt::Display for CuckooTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "--- cuckoo table, {} slots per array", self.capacity())?;
        writeln!(f, "{:>10} | {:>20} | {:<20}", "address", "array one", "array two")?;

        for (address, (slot1, slot2)) in self.table1.iter().zip(self.table2.iter()).enumerate() {
            let fmt_slot = |slot: &Option<Key>| {
                slot.map_or_else(|| "-".to_string(), |key| key.to_string())
            };

            writeln!(
                f,
                "{:>10} | {:>20} | {:<20}",
                address,
                fmt_slot(slot1),
                fmt_slot(slot2),
            )?;
        }

        write!(f, "--- end table ---")
    }
}
