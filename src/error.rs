// Copyright (c) 2025-present, cuckoo-tables
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// Represents errors that can occur when inserting into a table
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Growing the table would exceed the configured size ceiling
    /// (requested size, configured maximum)
    CapacityExceeded {
        /// Size the table would have needed to grow to
        requested: usize,

        /// Ceiling set by [`Config::max_table_size`](crate::Config::max_table_size)
        maximum: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TableError: {self:?}")
    }
}

impl std::error::Error for Error {}

/// Table result
pub type Result<T> = std::result::Result<T, Error>;
