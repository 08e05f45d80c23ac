//! Error types for the memokit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a strategy or tree configuration is invalid
//!   (zero capacity, zero depth, a limit below what the tree shape needs).
//! - [`InvariantError`]: Returned by the collections layer when an index and
//!   the bucket it points at disagree. Seeing one means a bug in this crate.
//! - [`MemoError`]: The error surfaced by strategies and the storage tree.
//!   Wraps the two above and adds the call-time usage faults.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::error::{ConfigError, MemoError};
//! use memokit::policy::LruStrategy;
//!
//! let bad: Result<LruStrategy<u32>, ConfigError> = LruStrategy::try_new(0);
//! assert!(bad.is_err());
//!
//! let err: MemoError = bad.unwrap_err().into();
//! assert!(err.to_string().contains("capacity"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an internal data-structure invariant is violated.
///
/// Produced by [`MultiKeyQueue`](crate::ds::MultiKeyQueue) and the buckets it
/// manages when a key index points at a node that does not hold the key, or a
/// key is indexed twice. Never expected in correct use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when a configuration parameter is invalid.
///
/// Produced by fallible constructors such as
/// [`LruStrategy::try_new`](crate::policy::LruStrategy::try_new) and
/// [`TreeBuilder::try_build`](crate::builder::TreeBuilder::try_build).
///
/// # Example
///
/// ```
/// use memokit::builder::TreeBuilder;
///
/// let err = TreeBuilder::new(0).try_build::<u32, u32>().unwrap_err();
/// assert!(err.to_string().contains("depth"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// MemoError
// ---------------------------------------------------------------------------

/// Errors surfaced by strategies and the storage tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoError {
    /// Construction-time fault.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Internal inconsistency. The operation was aborted.
    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    /// The argument path does not match the tree depth.
    #[error("path has {actual} keys but the tree is {expected} levels deep")]
    PathLength { expected: usize, actual: usize },

    /// `read` was called for a value the strategy does not track.
    #[error("value is not tracked by this strategy")]
    NotTracked,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("key indexed twice");
        assert_eq!(err.to_string(), "key indexed twice");
        assert_eq!(err.message(), "key indexed twice");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("depth must be at least 1");
        assert_eq!(err.to_string(), "depth must be at least 1");
        assert_eq!(err.clone(), err);
    }

    // -- MemoError --------------------------------------------------------

    #[test]
    fn memo_error_wraps_sources() {
        let err: MemoError = ConfigError::new("capacity must be greater than zero").into();
        assert!(matches!(err, MemoError::Config(_)));
        assert!(err.to_string().contains("invalid configuration"));

        let err: MemoError = InvariantError::new("bucket missing").into();
        assert!(matches!(err, MemoError::Invariant(_)));
        assert!(err.to_string().contains("bucket missing"));
    }

    #[test]
    fn path_length_mentions_both_sizes() {
        let err = MemoError::PathLength {
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }
}
