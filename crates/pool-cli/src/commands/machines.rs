//! Catalog lookups by pool shape

use std::path::Path;

use pool_meta::{Architecture, GIGABYTE, MachineCatalog, Provider, parse_size};

use crate::error::Result;

/// Run the machines command: print each matching machine name.
pub fn run_machines(
    input: &Path,
    provider: Provider,
    cpu: Architecture,
    cores: u32,
    ram: &str,
    metal: bool,
) -> Result<()> {
    let catalog = MachineCatalog::from_file(input)?;
    let ram_per_core = parse_size(ram)? / GIGABYTE;
    tracing::debug!(%provider, %cpu, cores, ram_per_core, metal, "Filtering machines");

    let machines = catalog.filter(provider, cpu, cores, ram_per_core, metal);
    if machines.is_empty() {
        tracing::debug!(%provider, %cpu, cores, ram, "No machines matched");
    }
    for machine in machines {
        println!("{}", machine.name);
    }
    Ok(())
}
