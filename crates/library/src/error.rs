//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Per-item failures (a lookup that
//! failed, a move that failed) are not errors at this level: they are recorded
//! on the entry or in the [`Summary`](crate::Summary) and the batch carries on.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("naming template must not be empty")]
    Template,
    /// The scan stage could not read the root directory.
    #[display("could not scan directory")]
    Scan,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Template => false,
            Self::Scan => true,
        }
    }
}
