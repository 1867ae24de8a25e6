//! Cron and machine placement output

use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use pool_core::schedule::cycle_crons;
use pool_meta::MachineCatalog;

use super::load_pools;
use crate::error::{CliError, Result};

/// Run the crons command.
pub fn run_crons(path: &Path, start: Option<&str>) -> Result<()> {
    let start = start
        .map(|text| {
            DateTime::parse_from_rfc3339(text)
                .map(|start| start.with_timezone(&Utc))
                .map_err(|e| CliError::user(format!("invalid --start {text:?}: {e}")))
        })
        .transpose()?;

    let pools = load_pools(path)?;
    let many = pools.len() > 1;
    for pool in pools {
        let crons = match start {
            Some(start) => cycle_crons(start, pool.cycle_time),
            None => pool.schedule_crons(),
        };
        if many {
            println!("{}", pool.pool_id.bold());
        }
        for cron in crons {
            println!("{cron}");
        }
    }
    Ok(())
}

/// Run the candidates command: `name capacity zones` per machine.
pub fn run_candidates(path: &Path, machines: &Path) -> Result<()> {
    let catalog = MachineCatalog::from_file(machines)?;

    let pools = load_pools(path)?;
    let many = pools.len() > 1;
    for pool in pools {
        let candidates = pool.machine_candidates(&catalog)?;
        if many {
            println!("{}", pool.pool_id.bold());
        }
        for candidate in candidates {
            let zones = if candidate.zone_blacklist.is_empty() {
                "-".to_string()
            } else {
                candidate
                    .zone_blacklist
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            };
            println!("{} {} {}", candidate.name, candidate.capacity, zones);
        }
    }
    Ok(())
}
