//! Resolution of fuzzing pool configurations
//!
//! Turns declarative pool documents into flat, fully-specified
//! configurations a scheduler can dispatch:
//!
//! - **Flattening**: documents inherit from an ordered list of `parents`,
//!   loaded on demand from the same directory and guarded against cycles
//! - **Maps**: one fragment applied on top of several target pools
//! - **Preprocess**: a one-task setup pool derived from its owning pool
//! - **Machines and schedules**: eligible machine types from a catalog and
//!   cron expressions approximating the pool's cycle time
//!
//! # Example
//!
//! ```ignore
//! use pool_core::PoolResolver;
//!
//! let resolver = PoolResolver::new("/path/to/pools");
//! let pool = resolver.resolve("linux-x64")?;
//! for cron in pool.schedule_crons() {
//!     println!("{cron}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod schedule;

pub use config::{
    LoadedConfig, MachineCandidate, PoolConfigLoader, PoolConfigMap, PoolConfiguration, PoolFields,
    PoolResolver, SharedFields,
};
pub use error::{Error, Result};
pub use schedule::CronSchedule;
