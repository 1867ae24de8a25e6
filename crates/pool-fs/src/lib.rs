//! Filesystem access for fuzzing pool configuration trees
//!
//! Pool documents live side by side in a single directory and are addressed
//! by pool id, which is the file stem (`pool1` for `pool1.yml`). This crate
//! only reads; nothing is ever written back.

pub mod document;
pub mod error;
pub mod io;

pub use document::{DocumentStore, POOL_EXTENSION};
pub use error::{Error, Result};
