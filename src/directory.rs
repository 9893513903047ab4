// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{hash::rightmost_bits, Error, Key};

/// A fixed-capacity container of keys, addressed by a shared hash-bit prefix.
#[derive(Debug)]
pub(crate) struct Bucket {
    /// Lowest directory address referencing this bucket; doubles as the
    /// bucket's low-bit pattern: every key in here has a hash whose low
    /// `depth` bits equal `id`.
    pub id: usize,

    /// Local depth: how many low hash bits this bucket's keys share.
    pub depth: u8,

    /// Stored keys, at most `bucket_size` of them.
    pub keys: Vec<Key>,
}

/// An extendible hash directory: `2^depth` entries indexing into an arena of
/// buckets.
///
/// Multiple contiguous entries may alias the same bucket (exactly
/// `2^(depth - bucket.depth)` of them). Aliasing is plain index duplication
/// over the arena, so every bucket is owned exactly once and freeing the
/// directory can never free a bucket twice.
///
/// The directory is hash-function agnostic: callers pass in the hash (or a
/// hash closure, for splits) and the directory only consumes its low bits.
#[derive(Debug)]
pub(crate) struct Directory {
    /// Address → arena slot.
    entries: Vec<usize>,

    /// Bucket arena; slots are never freed, buckets only gain siblings.
    buckets: Vec<Bucket>,

    /// Global depth; `entries.len() == 1 << depth`.
    depth: u8,

    /// Maximum keys per bucket.
    bucket_size: usize,

    /// Number of stored keys.
    len: usize,

    /// Entry count ceiling.
    max_size: usize,
}

impl Directory {
    /// Creates a directory of depth 0: one entry, one empty bucket.
    pub fn new(bucket_size: usize, max_size: usize) -> Self {
        debug_assert!(bucket_size >= 1);

        Self {
            entries: vec![0],
            buckets: vec![Bucket {
                id: 0,
                depth: 0,
                keys: Vec::with_capacity(bucket_size),
            }],
            depth: 0,
            bucket_size,
            len: 0,
            max_size,
        }
    }

    /// Global depth.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Number of directory entries (`2^depth`).
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Number of distinct buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// All distinct buckets.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The directory address a hash value maps to.
    pub fn address_of(&self, hash: u64) -> usize {
        rightmost_bits(self.depth, hash)
    }

    fn slot_of(&self, address: usize) -> usize {
        *self
            .entries
            .get(address)
            .expect("address should be within the directory")
    }

    /// The bucket an address points to.
    pub fn bucket(&self, address: usize) -> &Bucket {
        let slot = self.slot_of(address);
        self.buckets.get(slot).expect("entry slot should exist")
    }

    fn bucket_mut(&mut self, address: usize) -> &mut Bucket {
        let slot = self.slot_of(address);
        self.buckets
            .get_mut(slot)
            .expect("entry slot should exist")
    }

    /// Whether the addressed bucket is at capacity.
    pub fn is_full(&self, address: usize) -> bool {
        self.bucket(address).keys.len() >= self.bucket_size
    }

    /// Whether `key` is stored under the given hash value.
    pub fn contains(&self, hash: u64, key: Key) -> bool {
        self.bucket(self.address_of(hash)).keys.contains(&key)
    }

    /// Pushes a key into the addressed bucket; the caller guarantees room.
    pub fn push(&mut self, address: usize, key: Key) {
        debug_assert!(!self.is_full(address));

        self.bucket_mut(address).keys.push(key);
        self.len += 1;
    }

    /// Removes and returns the resident key of a full single-key bucket.
    pub fn take_resident(&mut self, address: usize) -> Key {
        let resident = self
            .bucket_mut(address)
            .keys
            .pop()
            .expect("bucket should hold a resident key");

        self.len -= 1;
        resident
    }

    /// Replaces the resident key of a full single-key bucket, returning the
    /// evicted resident.
    pub fn swap_resident(&mut self, address: usize, key: Key) -> Key {
        let resident = self
            .bucket_mut(address)
            .keys
            .first_mut()
            .expect("bucket should hold a resident key");

        std::mem::replace(resident, key)
    }

    /// Whether the addressed bucket can split without the directory growing
    /// past its ceiling.
    pub fn can_split(&self, address: usize) -> bool {
        self.bucket(address).depth < self.depth || self.entries.len() * 2 <= self.max_size
    }

    /// Doubles the directory: duplicates all entries into the upper half and
    /// uses one more hash bit for addressing. Buckets are untouched.
    pub fn double(&mut self) -> crate::Result<()> {
        let new_size = self.entries.len() * 2;

        if new_size > self.max_size {
            return Err(Error::CapacityExceeded {
                requested: new_size,
                maximum: self.max_size,
            });
        }

        self.entries.extend_from_within(..);
        self.depth += 1;

        log::trace!(
            "Doubled directory to {new_size} entries (depth {})",
            self.depth,
        );

        Ok(())
    }

    /// Splits the addressed bucket, doubling the directory first if the
    /// bucket was down to its last entry.
    ///
    /// A sibling bucket with id `(1 << depth) | id` takes over every second
    /// aliasing entry, and the old bucket's keys are redistributed between
    /// the two by re-addressing them (via `hash_of`) under the new depth.
    pub fn split(&mut self, address: usize, hash_of: impl Fn(Key) -> u64) -> crate::Result<()> {
        if self.bucket(address).depth == self.depth {
            self.double()?;
        }

        let slot = self.slot_of(address);
        let (old_depth, id) = {
            let bucket = self.buckets.get(slot).expect("entry slot should exist");
            (bucket.depth, bucket.id)
        };
        let new_depth = old_depth + 1;

        self.buckets
            .get_mut(slot)
            .expect("entry slot should exist")
            .depth = new_depth;

        // the sibling takes the addresses with a 1 in the new bit
        let sibling_id = (1usize << old_depth) | id;
        let sibling_slot = self.buckets.len();

        self.buckets.push(Bucket {
            id: sibling_id,
            depth: new_depth,
            keys: Vec::with_capacity(self.bucket_size),
        });

        // redirect every entry whose low `new_depth` bits equal the sibling
        // id, enumerating all possible high-bit prefixes
        let prefixes = 1usize << (self.depth - new_depth);

        for prefix in 0..prefixes {
            let redirected = (prefix << new_depth) | sibling_id;

            *self
                .entries
                .get_mut(redirected)
                .expect("redirected address should be within the directory") = sibling_slot;
        }

        // redistribute under the new depth; every key lands back in the old
        // bucket or in the sibling, so there is always room
        let orphans = std::mem::take(
            &mut self
                .buckets
                .get_mut(slot)
                .expect("entry slot should exist")
                .keys,
        );

        for key in orphans {
            let home = self.address_of(hash_of(key));
            let home_slot = self.slot_of(home);

            self.buckets
                .get_mut(home_slot)
                .expect("entry slot should exist")
                .keys
                .push(key);
        }

        log::trace!("Split bucket {id} (depth {old_depth} -> {new_depth}), sibling {sibling_id}");

        Ok(())
    }

    /// Structural invariant check, for tests: every entry points to a bucket
    /// whose id equals the entry's low `bucket.depth` bits, local depths
    /// never exceed the global depth, every bucket is aliased by exactly
    /// `2^(depth - bucket.depth)` entries, and no bucket overflows.
    pub fn is_consistent(&self) -> bool {
        let mut reference_counts = vec![0usize; self.buckets.len()];

        for (address, &slot) in self.entries.iter().enumerate() {
            let Some(bucket) = self.buckets.get(slot) else {
                return false;
            };

            if bucket.depth > self.depth {
                return false;
            }

            if rightmost_bits(bucket.depth, address as u64) != bucket.id {
                return false;
            }

            if bucket.keys.len() > self.bucket_size {
                return false;
            }

            if let Some(count) = reference_counts.get_mut(slot) {
                *count += 1;
            }
        }

        self.buckets.iter().zip(reference_counts).all(|(bucket, count)| {
            count == 1 << (u32::from(self.depth) - u32::from(bucket.depth))
        })
    }
}

impl std::fmt::Display for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:>10} | {:>10} | contents", "address", "bucket id")?;

        for (address, &slot) in self.entries.iter().enumerate() {
            let bucket = self.buckets.get(slot).expect("entry slot should exist");

            write!(f, "{:>10} | {:>10} |", address, bucket.id)?;

            // show contents only at the bucket's first address
            if bucket.id == address {
                write!(f, " [")?;

                for key in &bucket.keys {
                    write!(f, " {key}")?;
                }

                for _ in bucket.keys.len()..self.bucket_size {
                    write!(f, " -")?;
                }

                write!(f, " ]")?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn directory_starts_minimal() {
        let dir = Directory::new(4, 1 << 10);

        assert_eq!(0, dir.depth());
        assert_eq!(1, dir.size());
        assert_eq!(1, dir.bucket_count());
        assert_eq!(0, dir.len());
        assert!(dir.is_consistent());
    }

    #[test]
    fn directory_double_duplicates_entries() -> crate::Result<()> {
        let mut dir = Directory::new(2, 1 << 10);
        dir.push(0, 9);

        dir.double()?;

        assert_eq!(1, dir.depth());
        assert_eq!(2, dir.size());
        assert_eq!(1, dir.bucket_count(), "doubling must not create buckets");

        // both halves alias the same bucket
        assert_eq!(dir.bucket(0).id, dir.bucket(1).id);
        assert!(dir.is_consistent());

        Ok(())
    }

    #[test]
    fn directory_split_partitions_keys() -> crate::Result<()> {
        let mut dir = Directory::new(2, 1 << 10);

        // identity "hash": the key's own low bits address it
        dir.push(0, 0b10); // low bit 0
        dir.push(0, 0b11); // low bit 1

        dir.split(0, |k| k)?;

        assert_eq!(1, dir.depth());
        assert_eq!(2, dir.bucket_count());
        assert!(dir.is_consistent());

        assert_eq!(vec![0b10], dir.bucket(0).keys);
        assert_eq!(vec![0b11], dir.bucket(1).keys);

        // key count unchanged by splitting
        assert_eq!(2, dir.len());

        Ok(())
    }

    #[test]
    fn directory_split_skewed_keys() -> crate::Result<()> {
        let mut dir = Directory::new(2, 1 << 10);

        // both keys have low bit 0, so the first split separates nothing
        dir.push(0, 0b100);
        dir.push(0, 0b110);

        dir.split(0, |k| k)?;

        assert_eq!(2, dir.bucket(0).keys.len());
        assert!(dir.bucket(1).keys.is_empty());
        assert!(dir.is_consistent());

        // the second split (on bit 1) separates them
        dir.split(0, |k| k)?;

        assert_eq!(vec![0b100], dir.bucket(0).keys);
        assert_eq!(vec![0b110], dir.bucket(0b10).keys);
        assert!(dir.is_consistent());

        Ok(())
    }

    #[test]
    fn directory_split_redirects_aliases() -> crate::Result<()> {
        let mut dir = Directory::new(1, 1 << 10);

        // grow to depth 3 with the single bucket aliased 8 times
        dir.double()?;
        dir.double()?;
        dir.double()?;

        assert!(dir.is_consistent());

        dir.push(0, 0);
        dir.split(0, |k| k)?;

        // sibling (id 1, depth 1) must now own addresses 1, 3, 5, 7
        for address in [1, 3, 5, 7] {
            assert_eq!(1, dir.bucket(address).id);
        }
        for address in [0, 2, 4, 6] {
            assert_eq!(0, dir.bucket(address).id);
        }

        assert!(dir.is_consistent());

        Ok(())
    }

    #[test]
    fn directory_ceiling() {
        let mut dir = Directory::new(1, 2);

        dir.double().expect("first doubling fits");

        let result = dir.double();
        assert!(matches!(
            result,
            Err(Error::CapacityExceeded {
                requested: 4,
                maximum: 2,
            })
        ));

        // failed growth must leave the directory intact
        assert_eq!(2, dir.size());
        assert!(dir.is_consistent());
    }

    #[test]
    fn directory_take_resident() {
        let mut dir = Directory::new(1, 1 << 10);
        dir.push(0, 7);

        let taken = dir.take_resident(0);

        assert_eq!(7, taken);
        assert!(!dir.contains(0, 7));
        assert_eq!(0, dir.len(), "taking must uncount the key");
        assert!(dir.is_consistent());
    }

    #[test]
    fn directory_swap_resident() {
        let mut dir = Directory::new(1, 1 << 10);
        dir.push(0, 7);

        let evicted = dir.swap_resident(0, 9);

        assert_eq!(7, evicted);
        assert!(dir.contains(0, 9));
        assert!(!dir.contains(0, 7));
        assert_eq!(1, dir.len(), "swapping must not change the key count");
    }
}
