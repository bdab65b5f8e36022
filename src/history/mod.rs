//! Commit history traversal
//!
//! Walks the ancestry of a bound reference through any [`Backend`](crate::backend::Backend),
//! newest commit first, stopping at the configured depth bound.

/// Depth-bounded, duplicate-free ancestry walk
pub mod walker;

pub use walker::CommitWalker;
