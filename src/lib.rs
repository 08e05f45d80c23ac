//! memokit: bounded memoization of multi-argument functions.
//!
//! Results are cached in a tree of storages, one level per argument. Every
//! storage and every cached value is tracked by a replacement strategy, so
//! the tree stays within its configured limits while it grows.
//!
//! ```
//! use memokit::prelude::*;
//!
//! let mut root = TreeBuilder::new(2)
//!     .policy(Policy::Lru)
//!     .total_leaves_limit(2)
//!     .build::<u32, u64>();
//!
//! let pow = |p: &[u32]| u64::from(p[0]).pow(p[1]);
//! assert_eq!(root.get_or_insert_with(&[2, 10], pow).unwrap(), 1024);
//! assert_eq!(root.get_or_insert_with(&[3, 3], pow).unwrap(), 27);
//! assert_eq!(root.get_or_insert_with(&[5, 2], pow).unwrap(), 25);
//!
//! assert_eq!(root.len(), 2);
//! assert_eq!(root.extract_path(&[2, 10]), None);
//! ```
//!
//! See `DESIGN.md` for the internal layout.

pub mod builder;
pub mod ds;
pub mod effect;
pub mod error;
pub mod key;
pub mod observer;
pub mod policy;
pub mod store;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
