use dxirr_lib::analytics::rule_templates::disk_provision_rule::ProvisionCheck;
use dxirr_lib::analytics::{ComplianceEngine, ComplianceRow};
use dxirr_lib::data::collect_facts;
use dxirr_lib::data::inventory::Inventory;
use dxirr_lib::settings::{DiskTier, RecommendedSettings};
use serde_json::{json, Value};

pub const GIB: u64 = 1073741824;

/// A host with the given CPU layout and memory, one VMFS datastore backed by a
/// round-robin LUN and one NFS datastore.
pub fn host_json(name: &str, sockets: u32, cores: u32, memory_gb: u64) -> Value {
    json!({
        "name": name,
        "hardware": {
            "cpu_model": "Intel(R) Xeon(R)  CPU E5-2643 v3 @ 3.40GHz",
            "num_cpu_pkgs": sockets,
            "num_cpu_cores": cores,
            "num_cpu_threads": cores * 2,
            "cpu_mhz": 3457,
            "memory_size": memory_gb * GIB,
            "vendor": "Dell Inc.",
            "model": "PowerEdge R730",
        },
        "hyperthreading": { "available": true, "active": false, "config": false },
        "power_policy": "High Performance",
        "ha_enabled": true,
        "drs_enabled": false,
        "datastores": [
            { "name": "datastore1", "type": "VMFS", "extents": ["naa.01"] },
            { "name": "nfs1", "type": "NFS" },
        ],
        "multipath": {
            "luns": [{ "canonical_name": "naa.01", "policy": "VMW_PSP_RR" }],
            "nas_policies": [],
        },
    })
}

/// Controllers 0..=3 and thick disks spread over them according to `counts`.
/// Every disk lives on `datastore`.
pub fn devices_json(counts: [usize; 4], datastore: &str) -> Vec<Value> {
    let mut devices = Vec::new();
    let mut disk_key = 2000;
    let mut disks = Vec::new();
    for (bus, count) in counts.iter().enumerate() {
        let mut attached = Vec::new();
        for unit in 0..*count {
            attached.push(disk_key);
            disks.push(json!({
                "key": disk_key,
                "label": format!("Hard disk {}", disk_key - 1999),
                "unit_number": unit,
                "capacity_in_kb": 8388608,
                "backing": {
                    "file_name": format!("[{}] vm/vm_{}.vmdk", datastore, disk_key),
                    "thin_provisioned": false,
                    "eagerly_scrub": false,
                },
            }));
            disk_key += 1;
        }
        devices.push(json!({
            "key": 1000 + bus,
            "label": format!("SCSI controller {}", bus),
            "summary": "LSI Logic",
            "type": "VirtualLsiLogicController",
            "bus_number": bus,
            "device": attached,
        }));
    }
    devices.extend(disks);
    devices.push(json!({
        "key": 4000,
        "label": "Network adapter 1",
        "summary": "VM Network",
        "type": "VirtualVmxnet3",
        "mac_address": "00:50:56:aa:bb:cc",
    }));
    devices
}

pub fn guest_json(name: &str, host: &str, vcpus: u32, memory_mb: u64, devices: Vec<Value>) -> Value {
    json!({
        "name": name,
        "power_state": "poweredOn",
        "host": host,
        "config": {
            "num_cpu": vcpus,
            "num_cores_per_socket": 1,
            "memory_size_mb": memory_mb,
            "ht_sharing": "none",
        },
        "resource_config": {
            "cpu_allocation": { "limit": -1, "reservation": 0 },
            "memory_allocation": { "limit": -1, "reservation": 0 },
        },
        "devices": devices,
    })
}

pub fn inventory_json(hosts: Vec<Value>, vms: Vec<Value>) -> Value {
    json!({
        "about": { "endpoint": "vc01", "version": "6.0.0", "build": "3620759", "update_level": "2" },
        "hosts": hosts,
        "vms": vms,
    })
}

pub fn inventory(hosts: Vec<Value>, vms: Vec<Value>) -> Inventory {
    serde_json::from_value(inventory_json(hosts, vms)).unwrap()
}

/// The standard fixture: one 2x6 core, 95 GB host with one 4 vCPU guest.
pub fn standard_inventory() -> Inventory {
    inventory(
        vec![host_json("esx01", 2, 12, 95)],
        vec![guest_json(
            "dlpx01",
            "esx01",
            4,
            24576,
            devices_json([1, 0, 0, 0], "datastore1"),
        )],
    )
}

pub struct Evaluated {
    pub host_rows: Vec<ComplianceRow>,
    pub guest_rows: Vec<ComplianceRow>,
}

pub fn evaluate_with(
    inventory: &Inventory,
    vm_name: &str,
    settings: RecommendedSettings,
    tier: DiskTier,
    check: ProvisionCheck,
) -> Evaluated {
    let (host, guest) = collect_facts(inventory, vm_name).unwrap();
    let engine = ComplianceEngine::new(settings, tier, check);
    let mut host_rows = Vec::new();
    engine.evaluate_host(&host, &mut host_rows).unwrap();
    let mut guest_rows = Vec::new();
    engine.evaluate_guest(&guest, &host, &mut guest_rows).unwrap();
    Evaluated {
        host_rows,
        guest_rows,
    }
}

pub fn evaluate(inventory: &Inventory, vm_name: &str) -> Evaluated {
    evaluate_with(
        inventory,
        vm_name,
        RecommendedSettings::default(),
        DiskTier::NonSsd,
        ProvisionCheck::TypeOnly,
    )
}

/// The first row whose label is exactly `label`.
pub fn row<'a>(rows: &'a [ComplianceRow], label: &str) -> &'a ComplianceRow {
    rows.iter()
        .find(|r| r.label == label)
        .unwrap_or_else(|| panic!("no row labelled {:?} in {:#?}", label, rows))
}
