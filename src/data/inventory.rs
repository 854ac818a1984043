//! Raw inventory as exported by the property collector. Field names follow the
//! management API's property paths. Anything the collector can fail to fetch is
//! optional and left to the normalizer to interpret.

use crate::IRRError;
use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const POWERED_ON: &str = "poweredOn";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct About {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub update_level: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawHardware {
    #[serde(default)]
    pub cpu_model: Option<String>,
    #[serde(default)]
    pub num_cpu_pkgs: Option<u32>,
    #[serde(default)]
    pub num_cpu_cores: Option<u32>,
    #[serde(default)]
    pub num_cpu_threads: Option<u32>,
    #[serde(default)]
    pub cpu_mhz: Option<u64>,
    /// Physical memory in bytes.
    #[serde(default)]
    pub memory_size: Option<u64>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawHyperthreading {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub config: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawDatastore {
    pub name: String,
    /// VMFS, NFS, NFS41, vsan, ...
    #[serde(rename = "type", default)]
    pub ds_type: Option<String>,
    /// Canonical names of the devices backing a block datastore.
    #[serde(default)]
    pub extents: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawLun {
    pub canonical_name: String,
    #[serde(default)]
    pub policy: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawMultipath {
    #[serde(default)]
    pub luns: Vec<RawLun>,
    /// Host-wide policy list used for network attached storage.
    #[serde(default)]
    pub nas_policies: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawHost {
    pub name: String,
    #[serde(default)]
    pub hardware: RawHardware,
    #[serde(default)]
    pub hyperthreading: Option<RawHyperthreading>,
    #[serde(default)]
    pub power_policy: Option<String>,
    #[serde(default)]
    pub ha_enabled: Option<bool>,
    #[serde(default)]
    pub drs_enabled: Option<bool>,
    #[serde(default)]
    pub datastores: Vec<RawDatastore>,
    #[serde(default)]
    pub multipath: RawMultipath,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawVmConfig {
    #[serde(default)]
    pub num_cpu: Option<u32>,
    #[serde(default)]
    pub num_cores_per_socket: Option<u32>,
    #[serde(default)]
    pub memory_size_mb: Option<u64>,
    #[serde(default)]
    pub ht_sharing: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawAllocation {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub reservation: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawResourceConfig {
    #[serde(default)]
    pub cpu_allocation: RawAllocation,
    #[serde(default)]
    pub memory_allocation: RawAllocation,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawBacking {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub datastore: Option<String>,
    #[serde(default)]
    pub thin_provisioned: Option<bool>,
    #[serde(default)]
    pub eagerly_scrub: Option<bool>,
}

/// One entry of `config.hardware.device`. The device kind is only known from
/// the key range.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawDevice {
    pub key: i32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub summary: String,
    /// Managed object type name, e.g. VirtualVmxnet3 or VirtualLsiLogicController.
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub bus_number: Option<u32>,
    #[serde(default)]
    pub unit_number: Option<u32>,
    /// Keys of the devices attached to a controller.
    #[serde(default)]
    pub device: Vec<i32>,
    #[serde(default)]
    pub capacity_in_kb: Option<u64>,
    #[serde(default)]
    pub backing: Option<RawBacking>,
    #[serde(default)]
    pub mac_address: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawVirtualMachine {
    pub name: String,
    /// Missing means the state could not be read; such a guest is not checked.
    #[serde(default)]
    pub power_state: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub config: RawVmConfig,
    #[serde(default)]
    pub resource_config: RawResourceConfig,
    #[serde(default)]
    pub devices: Vec<RawDevice>,
}

impl RawVirtualMachine {
    pub fn is_powered_on(&self) -> bool {
        self.power_state == POWERED_ON
    }
}

/// A full property collection of one management endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Inventory {
    pub about: About,
    #[serde(default)]
    pub hosts: Vec<RawHost>,
    #[serde(default)]
    pub vms: Vec<RawVirtualMachine>,
}

impl Inventory {
    /// Load a snapshot (YAML or JSON). Any failure to read it is reported as a
    /// connection failure, since this is where a live session would be opened.
    pub fn open(path: &Path, expected_endpoint: Option<&str>) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            IRRError::ConnectionError(format!("{} ({})", path.display(), e))
        })?;
        let inventory = Self::parse(&contents)
            .map_err(|e| IRRError::ConnectionError(format!("{} ({})", path.display(), e)))?;

        if let (Some(expected), Some(endpoint)) = (expected_endpoint, &inventory.about.endpoint) {
            if expected != endpoint {
                return Err(IRRError::ConnectionError(format!(
                    "{} (inventory was collected from {})",
                    expected, endpoint
                ))
                .into());
            }
        }
        info!(
            "Loaded inventory: ESXi {} build {}, {} host(s), {} VM(s)",
            inventory.about.version,
            inventory.about.build,
            inventory.hosts.len(),
            inventory.vms.len()
        );
        Ok(inventory)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Locate a named VM that is powered on.
    pub fn find_vm(&self, name: &str) -> Result<&RawVirtualMachine> {
        let vm = self
            .vms
            .iter()
            .find(|vm| vm.name == name)
            .ok_or_else(|| IRRError::TargetNotFound(name.to_string()))?;
        if !vm.is_powered_on() {
            debug!("{} power state is {}", vm.name, vm.power_state);
            return Err(IRRError::TargetNotPoweredOn(name.to_string()).into());
        }
        Ok(vm)
    }

    pub fn find_host(&self, name: &str) -> Result<&RawHost> {
        self.hosts
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| IRRError::HostNotFound(name.to_string()).into())
    }

    /// Powered-on guests registered on a host.
    pub fn guests_on<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a RawVirtualMachine> {
        self.vms
            .iter()
            .filter(move |vm| vm.host == host && vm.is_powered_on())
    }
}
