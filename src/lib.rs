// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Dynamic hash tables for 64-bit keys.
//!
//! ##### About
//!
//! This crate exports three set-like hash tables over `u64` keys, each
//! resolving collisions with a different strategy:
//!
//! - [`CuckooTable`]: pure cuckoo hashing over two flat slot arrays with two
//!   independent hash functions. A key always lives at one of its two home
//!   slots, so lookups probe at most two slots. Displacement cycles are
//!   resolved by doubling both arrays and rehashing.
//! - [`ExtendibleTable`]: extendible hashing with multi-key buckets. A
//!   directory of `2^depth` entries is indexed by the low bits of a key's
//!   hash; overflowing buckets split, doubling the directory when needed.
//! - [`HybridTable`]: two extendible directories with single-key buckets,
//!   combined with cuckoo-style displacement. A key bumped from one
//!   directory is retried in the other.
//!
//! All three grow monotonically and support no deletion. Inserting past the
//! configured size ceiling returns [`Error::CapacityExceeded`] instead of
//! growing further.
//!
//! ```
//! use cuckoo_tables::{Config, CuckooTable};
//!
//! # fn main() -> cuckoo_tables::Result<()> {
//! let mut table = CuckooTable::new(Config::default());
//!
//! assert!(table.insert(42)?);
//! assert!(!table.insert(42)?, "duplicate inserts are rejected");
//! assert!(table.contains(42));
//! assert_eq!(1, table.len());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]

mod any_table;
mod config;
mod cuckoo;
mod directory;
mod error;
mod extendible;
mod hash;
mod hybrid;
mod stats;
mod table;

pub use {
    any_table::AnyTable,
    config::Config,
    cuckoo::CuckooTable,
    error::{Error, Result},
    extendible::ExtendibleTable,
    hash::{HashPair, Xxh3Pair},
    hybrid::HybridTable,
    stats::Stats,
    table::Table,
};

/// Key type stored by all tables in this crate.
///
/// Keys are opaque 64-bit integers with existence-only set semantics; there
/// is no associated value.
pub type Key = u64;
