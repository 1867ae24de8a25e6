//! Printing resolved configurations

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::load_pools;
use crate::error::Result;

/// Run the resolve command.
///
/// A pool prints as one document, a map as a list of its expansions.
pub fn run_resolve(path: &Path, json: bool) -> Result<()> {
    let mut pools = load_pools(path)?;
    if pools.len() == 1 {
        print_document(&pools.remove(0), json)
    } else {
        print_document(&pools, json)
    }
}

/// Run the preprocess command.
pub fn run_preprocess(path: &Path) -> Result<()> {
    for pool in load_pools(path)? {
        match pool.derive_preprocess()? {
            Some(preprocess) => print_document(&preprocess, false)?,
            None => println!("{} has no preprocess pool", pool.pool_id.bold()),
        }
    }
    Ok(())
}

fn print_document<T: Serialize>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", serde_yaml::to_string(value)?);
    }
    Ok(())
}
