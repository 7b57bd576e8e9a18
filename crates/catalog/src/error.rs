//! Catalog Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, same as every other crate in the workspace.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// A record that simply does not exist is *not* an error: lookups return
/// `Ok(None)` for that case.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The string is not a `PREFIX` + 6 or 8 digit product identifier.
    #[display("invalid product identifier: {_0}")]
    InvalidIdentifier(#[error(not(source))] String),
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[display("catalog request failed: {_0}")]
    Request(#[error(not(source))] String),
    /// The catalog answered with an unexpected HTTP status.
    #[display("catalog responded with HTTP status {_0}")]
    Status(#[error(not(source))] u16),
    /// The catalog answered, but the body could not be understood.
    #[display("malformed catalog response: {_0}")]
    Decode(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// The pipeline itself never retries (one attempt per identifier per
    /// scan), but a caller running a second scan can use this to decide
    /// whether that is worth it.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::InvalidIdentifier(_) | Self::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Request("timed out".into()), true)]
    #[case(ErrorKind::Status(503), true)]
    #[case(ErrorKind::Status(429), true)]
    #[case(ErrorKind::Status(403), false)]
    #[case(ErrorKind::Decode("eof".into()), false)]
    #[case(ErrorKind::InvalidIdentifier("XX1".into()), false)]
    fn test_is_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }
}
