use crate::data::device::{DeviceInventory, Disk};
use crate::data::host::{HostFacts, StoragePath};
use crate::data::inventory::RawVirtualMachine;
use crate::data::units::{whole_gb, Allocation, MemoryUnit, Unit};
use serde::{Deserialize, Serialize};

/// A disk together with its resolved storage path.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestDisk {
    pub disk: Disk,
    pub storage_path: StoragePath,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuestFacts {
    pub name: String,
    pub host: String,
    pub vcpus: Option<u32>,
    pub cores_per_socket: Option<u32>,
    pub memory_gb: Option<u64>,
    pub cpu_limit: Allocation,
    pub cpu_reservation: Allocation,
    pub memory_limit: Allocation,
    pub memory_reservation: Allocation,
    pub ht_sharing: Option<String>,
    pub devices: DeviceInventory,
    pub disks: Vec<GuestDisk>,
}

impl GuestFacts {
    pub fn from_inventory(raw: &RawVirtualMachine, host: &HostFacts) -> Self {
        let cpu = &raw.resource_config.cpu_allocation;
        let mem = &raw.resource_config.memory_allocation;
        let devices = DeviceInventory::from_raw(&raw.devices);
        let disks = devices
            .disks
            .iter()
            .map(|disk| GuestDisk {
                disk: disk.clone(),
                storage_path: host.storage.resolve(disk.datastore.as_deref()),
            })
            .collect();

        GuestFacts {
            name: raw.name.clone(),
            host: raw.host.clone(),
            vcpus: raw.config.num_cpu,
            cores_per_socket: raw.config.num_cores_per_socket,
            memory_gb: raw
                .config
                .memory_size_mb
                .map(|mb| whole_gb(mb as f64, MemoryUnit::MB)),
            cpu_limit: Allocation::from_limit(cpu.limit, Unit::Mhz),
            cpu_reservation: Allocation::from_reservation(cpu.reservation, Unit::Mhz),
            memory_limit: Allocation::from_limit(mem.limit, Unit::MB),
            memory_reservation: Allocation::from_reservation(mem.reservation, Unit::MB),
            ht_sharing: raw.config.ht_sharing.clone(),
            devices,
            disks,
        }
    }

    /// Row label prefix for this guest.
    pub fn label(&self, what: &str) -> String {
        format!("Delphix VM [{}] {}", self.name, what)
    }
}

/// Controller balance figures carried into the guest summary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ControllerCounts(pub [usize; 4]);

impl ControllerCounts {
    pub fn from_devices(devices: &DeviceInventory) -> Self {
        let per_bus = devices.disks_per_controller();
        let mut counts = [0usize; 4];
        for (bus, slot) in counts.iter_mut().enumerate() {
            *slot = per_bus.get(&(bus as u32)).copied().unwrap_or(0);
        }
        ControllerCounts(counts)
    }

    /// "0:4 1:3 2:3 3:3"
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .enumerate()
            .map(|(bus, count)| format!("{}:{}", bus, count))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
