use crate::data::inventory::RawDevice;
use crate::data::units::{tenth_gb, MemoryUnit};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// Device key ranges used by the inventory. They are the only discriminator
/// available on a raw device entry.
pub const CONTROLLER_KEYS: Range<i32> = 1000..2000;
pub const DISK_KEYS: Range<i32> = 2000..3000;
pub const NIC_KEYS: Range<i32> = 4000..5000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScsiController {
    pub key: i32,
    pub label: String,
    /// Controller type as shown by the inventory, e.g. "LSI Logic".
    pub controller_type: String,
    pub bus_number: Option<u32>,
    pub attached: Vec<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioning {
    Thin,
    Thick { eager_zero: bool },
}

impl Provisioning {
    /// A disk is thick iff its thin flag is false. The eager-zero state of a
    /// thick disk is always reported as true, whatever the scrub flag says.
    pub fn from_backing(thin_provisioned: Option<bool>, eagerly_scrub: Option<bool>) -> Option<Self> {
        let thin = thin_provisioned?;
        if thin {
            return Some(Provisioning::Thin);
        }
        // FIXME: the scrub flag is read but both branches report eager-zero.
        let eager_zero = match eagerly_scrub {
            Some(true) => true,
            _ => true,
        };
        Some(Provisioning::Thick { eager_zero })
    }

    pub fn is_thick(&self) -> bool {
        matches!(self, Provisioning::Thick { .. })
    }

    pub fn eager_zero(&self) -> Option<bool> {
        match self {
            Provisioning::Thin => None,
            Provisioning::Thick { eager_zero } => Some(*eager_zero),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Disk {
    pub key: i32,
    pub label: String,
    /// Bus number of the owning SCSI controller, when one lists this disk.
    pub bus_number: Option<u32>,
    pub unit_number: Option<u32>,
    pub capacity_gb: Option<f64>,
    pub provisioning: Option<Provisioning>,
    pub file_name: Option<String>,
    pub datastore: Option<String>,
}

impl Disk {
    /// "{bus}:{unit}" address of the disk.
    pub fn controller_unit(&self) -> Option<String> {
        Some(format!("{}:{}", self.bus_number?, self.unit_number?))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkAdapter {
    pub key: i32,
    pub label: String,
    pub network: String,
    pub mac_address: Option<String>,
    /// Device type, e.g. VirtualVmxnet3.
    pub adapter_type: String,
}

impl NetworkAdapter {
    pub fn description(&self) -> String {
        format!("{} | {} | {}", self.label, self.network, self.adapter_type)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Device {
    Controller(ScsiController),
    Disk(Disk),
    NetworkAdapter(NetworkAdapter),
}

impl Device {
    /// Classify one raw entry by its key. Keys outside the known ranges (IDE,
    /// video cards, ...) yield None.
    pub fn classify(raw: &RawDevice) -> Option<Device> {
        if CONTROLLER_KEYS.contains(&raw.key) {
            Some(Device::Controller(ScsiController {
                key: raw.key,
                label: raw.label.clone(),
                controller_type: raw.summary.trim().to_string(),
                bus_number: raw.bus_number,
                attached: raw.device.clone(),
            }))
        } else if DISK_KEYS.contains(&raw.key) {
            let backing = raw.backing.clone().unwrap_or_default();
            let datastore = backing
                .datastore
                .clone()
                .or_else(|| backing.file_name.as_deref().and_then(datastore_from_file_name));
            Some(Device::Disk(Disk {
                key: raw.key,
                label: raw.label.clone(),
                bus_number: None,
                unit_number: raw.unit_number,
                capacity_gb: raw
                    .capacity_in_kb
                    .map(|kb| tenth_gb(kb as f64, MemoryUnit::KB)),
                provisioning: Provisioning::from_backing(
                    backing.thin_provisioned,
                    backing.eagerly_scrub,
                ),
                file_name: backing.file_name,
                datastore,
            }))
        } else if NIC_KEYS.contains(&raw.key) {
            Some(Device::NetworkAdapter(NetworkAdapter {
                key: raw.key,
                label: raw.label.clone(),
                network: raw.summary.clone(),
                mac_address: raw.mac_address.clone(),
                adapter_type: raw.device_type.clone(),
            }))
        } else {
            debug!("Ignoring device {} ({})", raw.key, raw.label);
            None
        }
    }
}

/// "[datastore1] vm/vm.vmdk" -> "datastore1"
pub fn datastore_from_file_name(file_name: &str) -> Option<String> {
    let rest = file_name.trim().strip_prefix('[')?;
    let end = rest.find(']')?;
    Some(rest[..end].to_string())
}

/// Devices of one guest, split by kind, with every disk's bus number resolved
/// from the controller that lists it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInventory {
    pub controllers: Vec<ScsiController>,
    pub disks: Vec<Disk>,
    pub network_adapters: Vec<NetworkAdapter>,
}

impl DeviceInventory {
    pub fn from_raw(raw_devices: &[RawDevice]) -> Self {
        let mut inventory = DeviceInventory::default();
        for raw in raw_devices {
            match Device::classify(raw) {
                Some(Device::Controller(c)) => inventory.controllers.push(c),
                Some(Device::Disk(d)) => inventory.disks.push(d),
                Some(Device::NetworkAdapter(n)) => inventory.network_adapters.push(n),
                None => {}
            }
        }

        let mut bus_by_disk: HashMap<i32, u32> = HashMap::new();
        for controller in &inventory.controllers {
            if let Some(bus) = controller.bus_number {
                for key in &controller.attached {
                    bus_by_disk.insert(*key, bus);
                }
            }
        }
        for disk in inventory.disks.iter_mut() {
            disk.bus_number = bus_by_disk.get(&disk.key).copied();
            if disk.bus_number.is_none() {
                warn!("{} is not attached to any SCSI controller", disk.label);
            }
        }
        inventory
    }

    /// Disk count per controller bus. Disks without a controller are skipped.
    pub fn disks_per_controller(&self) -> HashMap<u32, usize> {
        let mut counts = HashMap::new();
        for disk in &self.disks {
            if let Some(bus) = disk.bus_number {
                *counts.entry(bus).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn controller_units(&self) -> Vec<String> {
        self.disks
            .iter()
            .map(|d| d.controller_unit().unwrap_or_else(|| "?".to_string()))
            .collect()
    }
}
