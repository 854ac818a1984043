use crate::data::inventory::{About, Inventory, RawHost};
use crate::data::units::{tenth_gb, whole_gb, MemoryUnit};
use log::debug;
use serde::{Deserialize, Serialize};

/// Multipath policy data of a host, used to resolve per-disk storage paths.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StorageTopology {
    /// datastore name -> (type, extent canonical names)
    pub datastores: Vec<(String, Option<String>, Vec<String>)>,
    /// LUN canonical name -> policy
    pub lun_policies: Vec<(String, Option<String>)>,
    pub nas_policies: Vec<String>,
}

/// How the storage path of one disk could be resolved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum StoragePath {
    /// Block datastore; policy of the LUN backing it, if known.
    Block { lun: Option<String>, policy: Option<String> },
    /// Network attached datastore; only the host-wide policy list is known.
    Nas { host_policies: Vec<String> },
    Unresolved,
}

const NAS_TYPES: [&str; 3] = ["NFS", "NFS41", "CIFS"];

impl StorageTopology {
    fn from_raw(raw: &RawHost) -> Self {
        StorageTopology {
            datastores: raw
                .datastores
                .iter()
                .map(|d| (d.name.clone(), d.ds_type.clone(), d.extents.clone()))
                .collect(),
            lun_policies: raw
                .multipath
                .luns
                .iter()
                .map(|l| (l.canonical_name.clone(), l.policy.clone()))
                .collect(),
            nas_policies: raw.multipath.nas_policies.clone(),
        }
    }

    /// Block datastores resolve datastore -> extent canonical name -> LUN policy.
    /// NAS datastores only have the host-wide policy list.
    pub fn resolve(&self, datastore: Option<&str>) -> StoragePath {
        let Some(name) = datastore else {
            return StoragePath::Unresolved;
        };
        let Some((_, ds_type, extents)) = self.datastores.iter().find(|(n, _, _)| n == name) else {
            debug!("Datastore {} not found on host", name);
            return StoragePath::Unresolved;
        };
        let Some(ds_type) = ds_type else {
            debug!("Datastore {} has no type", name);
            return StoragePath::Unresolved;
        };
        if NAS_TYPES.contains(&ds_type.to_uppercase().as_str()) {
            return StoragePath::Nas {
                host_policies: self.nas_policies.clone(),
            };
        }
        let lun = extents.first().cloned();
        let policy = lun.as_ref().and_then(|canonical| {
            self.lun_policies
                .iter()
                .find(|(c, _)| c == canonical)
                .and_then(|(_, p)| p.clone())
        });
        StoragePath::Block { lun, policy }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HostFacts {
    pub name: String,
    pub version: String,
    pub build: String,
    pub update_level: Option<String>,
    pub cpu_model: Option<String>,
    pub cpu_sockets: Option<u32>,
    pub cpu_cores: Option<u32>,
    pub cpu_threads: Option<u32>,
    pub cpu_mhz: Option<u64>,
    pub memory_gb: Option<u64>,
    pub vendor_model: Option<String>,
    pub hyperthreading_active: Option<bool>,
    pub hyperthreading_config: Option<bool>,
    pub power_policy: Option<String>,
    pub ha_enabled: Option<bool>,
    pub drs_enabled: Option<bool>,
    /// vCPUs configured across powered-on guests.
    pub allocated_vcpus: u32,
    /// Memory configured across powered-on guests, in GB.
    pub allocated_memory_gb: f64,
    pub storage: StorageTopology,
}

impl HostFacts {
    pub fn from_inventory(about: &About, raw: &RawHost, inventory: &Inventory) -> Self {
        let hw = &raw.hardware;
        let ht = raw.hyperthreading.clone().unwrap_or_default();

        let mut allocated_vcpus = 0;
        let mut allocated_memory_mb = 0u64;
        for guest in inventory.guests_on(&raw.name) {
            allocated_vcpus += guest.config.num_cpu.unwrap_or(0);
            allocated_memory_mb += guest.config.memory_size_mb.unwrap_or(0);
        }

        let vendor_model = match (&hw.vendor, &hw.model) {
            (Some(v), Some(m)) => Some(format!("{} {}", v, m)),
            (Some(v), None) => Some(v.clone()),
            (None, Some(m)) => Some(m.clone()),
            (None, None) => None,
        };

        HostFacts {
            name: raw.name.clone(),
            version: about.version.clone(),
            build: about.build.clone(),
            update_level: about.update_level.clone(),
            cpu_model: hw.cpu_model.as_ref().map(|m| squash_whitespace(m)),
            cpu_sockets: hw.num_cpu_pkgs,
            cpu_cores: hw.num_cpu_cores,
            cpu_threads: hw.num_cpu_threads,
            cpu_mhz: hw.cpu_mhz,
            memory_gb: hw.memory_size.map(|b| whole_gb(b as f64, MemoryUnit::Bytes)),
            vendor_model,
            hyperthreading_active: ht.active,
            hyperthreading_config: ht.config,
            power_policy: raw.power_policy.clone(),
            ha_enabled: raw.ha_enabled,
            drs_enabled: raw.drs_enabled,
            allocated_vcpus,
            allocated_memory_gb: tenth_gb(allocated_memory_mb as f64, MemoryUnit::MB),
            storage: StorageTopology::from_raw(raw),
        }
    }

    pub fn cores_per_socket(&self) -> Option<u32> {
        match (self.cpu_cores, self.cpu_sockets) {
            (Some(cores), Some(sockets)) if sockets > 0 => Some(cores / sockets),
            _ => None,
        }
    }

    /// Cores not claimed by any guest vCPU. Negative when over-committed.
    pub fn unallocated_cores(&self) -> Option<i64> {
        self.cpu_cores
            .map(|cores| cores as i64 - self.allocated_vcpus as i64)
    }

    /// Percentage of physical memory configured across guests.
    pub fn memory_allocation_pct(&self) -> Option<f64> {
        match self.memory_gb {
            Some(total) if total > 0 => Some(self.allocated_memory_gb / total as f64 * 100.0),
            _ => None,
        }
    }
}

fn squash_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::{HostFacts, StoragePath};
    use crate::data::inventory::Inventory;

    const SNAPSHOT: &str = r#"
about:
  version: 6.0.0
  build: "3620759"
hosts:
  - name: optimus
    hardware:
      cpu_model: "Intel(R) Xeon(R) CPU           X5690  @ 3.47GHz"
      num_cpu_pkgs: 2
      num_cpu_cores: 12
      cpu_mhz: 3457
      memory_size: 103079215104
    datastores:
      - { name: vmfs01, type: VMFS, extents: [naa.600a0980] }
      - { name: nfs01, type: NFS }
    multipath:
      luns:
        - { canonical_name: naa.600a0980, policy: VMW_PSP_RR }
      nas_policies: [VMW_PSP_FIXED]
vms:
  - name: a
    power_state: poweredOn
    host: optimus
    config: { num_cpu: 4, memory_size_mb: 24576 }
  - name: b
    power_state: poweredOn
    host: optimus
    config: { num_cpu: 2, memory_size_mb: 8192 }
  - name: c
    power_state: poweredOff
    host: optimus
    config: { num_cpu: 16, memory_size_mb: 65536 }
"#;

    fn facts() -> HostFacts {
        let inventory = Inventory::parse(SNAPSHOT).unwrap();
        HostFacts::from_inventory(&inventory.about, &inventory.hosts[0], &inventory)
    }

    #[test]
    fn test_host_normalization() {
        let host = facts();
        assert_eq!(host.memory_gb, Some(96));
        assert_eq!(host.cores_per_socket(), Some(6));
        assert_eq!(
            host.cpu_model.as_deref(),
            Some("Intel(R) Xeon(R) CPU X5690 @ 3.47GHz")
        );
        assert_eq!(host.hyperthreading_active, None);
    }

    #[test]
    fn test_allocation_ignores_powered_off_guests() {
        let host = facts();
        assert_eq!(host.allocated_vcpus, 6);
        assert_eq!(host.allocated_memory_gb, 32.0);
        assert_eq!(host.unallocated_cores(), Some(6));
        assert_eq!(host.memory_allocation_pct(), Some(32.0 / 96.0 * 100.0));
    }

    #[test]
    fn test_storage_path_resolution() {
        let host = facts();
        assert_eq!(
            host.storage.resolve(Some("vmfs01")),
            StoragePath::Block {
                lun: Some("naa.600a0980".to_string()),
                policy: Some("VMW_PSP_RR".to_string())
            }
        );
        assert_eq!(
            host.storage.resolve(Some("nfs01")),
            StoragePath::Nas {
                host_policies: vec!["VMW_PSP_FIXED".to_string()]
            }
        );
        assert_eq!(host.storage.resolve(Some("gone")), StoragePath::Unresolved);
        assert_eq!(host.storage.resolve(None), StoragePath::Unresolved);
    }
}
