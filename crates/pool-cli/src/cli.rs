//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pool_meta::{Architecture, Provider};

/// Resolve fuzzing pool configurations
#[derive(Parser, Debug)]
#[command(name = "pool-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// List catalog machines matching a pool shape
    ///
    /// Examples:
    ///   pool-config machines machines.yml --cores 8 --ram 4g
    ///   pool-config machines machines.yml --provider gcp --cpu arm64 --cores 4 --ram 2g
    Machines {
        /// Machine catalog document
        input: PathBuf,

        /// CPU architecture
        #[arg(long, default_value = "x64")]
        cpu: Architecture,

        /// Cloud provider
        #[arg(long, default_value = "aws")]
        provider: Provider,

        /// Cores per task
        #[arg(long)]
        cores: u32,

        /// Minimum memory per core (e.g. 4g)
        #[arg(long)]
        ram: String,

        /// Only bare-metal machines
        #[arg(long)]
        metal: bool,
    },

    /// Print the resolved configuration of a pool or every pool of a map
    Resolve {
        /// Pool or map document
        path: PathBuf,

        /// Output as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Print the cron expressions reproducing each pool's cycle time
    Crons {
        /// Pool or map document
        path: PathBuf,

        /// First run as an RFC 3339 timestamp, overriding schedule_start
        #[arg(long)]
        start: Option<String>,
    },

    /// Print the machine types each pool can run on
    Candidates {
        /// Pool or map document
        path: PathBuf,

        /// Machine catalog document
        #[arg(long)]
        machines: PathBuf,
    },

    /// Print the preprocess pool derived from a pool, if any
    Preprocess {
        /// Pool document
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_machines_defaults() {
        let cli = Cli::parse_from(["pool-config", "machines", "m.yml", "--cores", "8", "--ram", "4g"]);
        assert_eq!(
            cli.command,
            Commands::Machines {
                input: PathBuf::from("m.yml"),
                cpu: Architecture::X64,
                provider: Provider::Aws,
                cores: 8,
                ram: "4g".to_string(),
                metal: false,
            }
        );
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn parse_machines_accepts_architecture_alias() {
        let cli = Cli::parse_from([
            "pool-config", "machines", "m.yml", "--cpu", "aarch64", "--provider", "gcp", "--cores",
            "4", "--ram", "2g", "--metal",
        ]);
        match cli.command {
            Commands::Machines { cpu, provider, metal, .. } => {
                assert_eq!(cpu, Architecture::Arm64);
                assert_eq!(provider, Provider::Gcp);
                assert!(metal);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn machines_requires_cores_and_ram() {
        assert!(Cli::try_parse_from(["pool-config", "machines", "m.yml", "--ram", "4g"]).is_err());
        assert!(Cli::try_parse_from(["pool-config", "machines", "m.yml", "--cores", "8"]).is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let result = Cli::try_parse_from([
            "pool-config", "machines", "m.yml", "--provider", "azure", "--cores", "8", "--ram", "4g",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn verbosity_flags() {
        let cli = Cli::parse_from(["pool-config", "-v", "resolve", "pool.yml"]);
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::parse_from(["pool-config", "resolve", "pool.yml", "--quiet"]);
        assert_eq!(cli.log_level(), "warn");

        assert!(Cli::try_parse_from(["pool-config", "-v", "-q", "resolve", "pool.yml"]).is_err());
    }

    #[test]
    fn parse_resolve_json() {
        let cli = Cli::parse_from(["pool-config", "resolve", "pool.yml", "--json"]);
        assert_eq!(
            cli.command,
            Commands::Resolve {
                path: PathBuf::from("pool.yml"),
                json: true,
            }
        );
    }
}
