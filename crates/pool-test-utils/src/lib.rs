//! Shared test utilities for the pool configuration workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`]: ready-made pool documents and machine catalogs
//! - [`tree`]: [`PoolTree`] builder for directories of pool documents

pub mod fixtures;
pub mod tree;

pub use tree::PoolTree;
