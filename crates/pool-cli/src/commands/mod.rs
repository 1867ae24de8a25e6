//! Command implementations for pool-cli

pub mod machines;
pub mod resolve;
pub mod schedule;

pub use machines::run_machines;
pub use resolve::{run_preprocess, run_resolve};
pub use schedule::{run_candidates, run_crons};

use std::path::Path;

use pool_core::{PoolConfigLoader, PoolConfiguration};

use crate::error::Result;

/// The pool at `path`, or every expansion if it is a map.
fn load_pools(path: &Path) -> Result<Vec<PoolConfiguration>> {
    let loaded = PoolConfigLoader::from_file(path)?;
    Ok(loaded.pools()?)
}
