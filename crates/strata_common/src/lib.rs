//! Shared foundational types used across the strata configuration cache.
//!
//! This crate provides content hashing for artifact integrity checks and
//! modification-time helpers shared by the freshness checks.

#![warn(missing_docs)]

pub mod fs_time;
pub mod hash;

pub use fs_time::{is_modified_after, modified_time};
pub use hash::ContentHash;
