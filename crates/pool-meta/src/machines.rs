//! Machine type catalog
//!
//! The catalog document is keyed provider → architecture → machine name:
//!
//! ```yaml
//! aws:
//!   x64:
//!     c5.2xlarge:
//!       cpu: 8
//!       ram: 16
//!     m5.metal:
//!       cpu: 96
//!       ram: 384
//!       metal: true
//!       zone_blacklist: [us-east-1e]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::{Architecture, Error, Provider, Result};

/// Hardware shape of one machine type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineSpec {
    /// Number of cpu cores
    pub cpu: u32,
    /// Memory in gigabytes
    pub ram: f64,
    /// Bare-metal instance
    #[serde(default)]
    pub metal: bool,
    /// Zones this machine type must not be launched in
    #[serde(default)]
    pub zone_blacklist: BTreeSet<String>,
}

impl MachineSpec {
    pub fn ram_per_core(&self) -> f64 {
        self.ram / f64::from(self.cpu)
    }
}

/// A catalog entry returned by [`MachineCatalog::filter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineType<'a> {
    pub name: &'a str,
    pub spec: &'a MachineSpec,
}

type RawCatalog = BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>;

/// Immutable index of machine types by provider and architecture.
#[derive(Debug, Clone, Default)]
pub struct MachineCatalog {
    machines: BTreeMap<Provider, BTreeMap<Architecture, BTreeMap<String, MachineSpec>>>,
}

impl MachineCatalog {
    /// Build a catalog from its YAML text.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawCatalog = serde_yaml::from_str(content).map_err(|e| Error::Catalog {
            message: e.to_string(),
        })?;
        Self::from_raw(raw)
    }

    /// Load a catalog document from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw: RawCatalog = pool_fs::document::load_yaml(path)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCatalog) -> Result<Self> {
        let mut machines: BTreeMap<Provider, BTreeMap<Architecture, BTreeMap<String, MachineSpec>>> =
            BTreeMap::new();
        for (provider_name, archs) in raw {
            let provider: Provider = provider_name.parse().map_err(|_| Error::Catalog {
                message: format!("unknown provider: {provider_name}"),
            })?;
            for (arch_name, entries) in archs {
                let arch: Architecture = arch_name.parse().map_err(|_| Error::Catalog {
                    message: format!("unknown architecture: {provider_name}.{arch_name}"),
                })?;
                let archs = machines.entry(provider).or_default();
                if archs.contains_key(&arch) {
                    return Err(Error::Catalog {
                        message: format!("duplicate architecture: {provider_name}.{arch_name} is {arch}"),
                    });
                }
                let slot = archs.entry(arch).or_default();
                for (machine, value) in entries {
                    let spec: MachineSpec = serde_yaml::from_value(value).map_err(|e| Error::Catalog {
                        message: format!("machine {provider_name}.{arch_name}.{machine}: {e}"),
                    })?;
                    if spec.cpu == 0 {
                        return Err(Error::Catalog {
                            message: format!(
                                "machine {provider_name}.{arch_name}.{machine} must have at least one cpu"
                            ),
                        });
                    }
                    slot.insert(machine, spec);
                }
            }
        }
        tracing::debug!(
            providers = machines.len(),
            "Loaded machine catalog"
        );
        Ok(Self { machines })
    }

    /// Look up a single machine type.
    pub fn get(&self, provider: Provider, arch: Architecture, name: &str) -> Option<&MachineSpec> {
        self.machines.get(&provider)?.get(&arch)?.get(name)
    }

    pub fn cpus(&self, provider: Provider, arch: Architecture, name: &str) -> Option<u32> {
        self.get(provider, arch, name).map(|spec| spec.cpu)
    }

    pub fn zone_blacklist(
        &self,
        provider: Provider,
        arch: Architecture,
        name: &str,
    ) -> Option<&BTreeSet<String>> {
        self.get(provider, arch, name).map(|spec| &spec.zone_blacklist)
    }

    /// Machine types that fit the given requirements, in name order.
    ///
    /// A machine qualifies when its core count equals `cores` exactly, it has
    /// at least `min_ram_per_core` gigabytes per core, and, if `metal` is
    /// requested, it is a bare-metal type. A provider or architecture absent
    /// from the catalog yields nothing.
    pub fn filter(
        &self,
        provider: Provider,
        arch: Architecture,
        cores: u32,
        min_ram_per_core: f64,
        metal: bool,
    ) -> Vec<MachineType<'_>> {
        let Some(entries) = self.machines.get(&provider).and_then(|archs| archs.get(&arch)) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter(|(_, spec)| spec.cpu == cores && spec.ram_per_core() >= min_ram_per_core)
            .filter(|(_, spec)| !metal || spec.metal)
            .map(|(name, spec)| MachineType { name, spec })
            .collect()
    }
}
