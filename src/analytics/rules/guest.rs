use crate::analytics::rule_templates::{
    disk_provision_rule::ProvisionCheck, expected_value_rule::expected_value,
    fact_info_rule::fact_info, minimum_value_rule::minimum_value,
};
use crate::analytics::{
    ComplianceRule, ControllerBalanceRule, CpuReservationRule, DiskProvisionRule,
    ExpectedValueRule, FactInfoRule, MemoryReservationRule, MinimumValueRule, NicDriverRule,
    ScsiControllerTypeRule, StoragePathRule,
};

/// Guest-level rules: CPU, memory, network, controllers, then the per-disk rows.
pub fn get_guest_rules(provision_check: ProvisionCheck) -> Vec<Vec<ComplianceRule>> {
    vec![
        vec![
            minimum_value! {
                name: "Number of vCPUs",
                key: "minimum_cpu",
                value: |s| s.guest().and_then(|g| g.vcpus).map(f64::from),
            },
            fact_info! {
                name: "Cores Per Socket",
                value: |s| s.guest().and_then(|g| g.cores_per_socket).map(|v| v.to_string()),
            },
            ComplianceRule::CpuReservationRule(CpuReservationRule {
                name: "CPU Reservation",
            }),
            fact_info! {
                name: "CPU Limit",
                value: |s| s.guest().map(|g| g.cpu_limit.to_string()),
            },
            expected_value! {
                name: "HT Sharing",
                key: "ht_sharing",
                value: |s| s.guest().and_then(|g| g.ht_sharing.clone()),
                ignore_case: true,
            },
        ],
        vec![
            minimum_value! {
                name: "Memory",
                key: "minimum_memory",
                value: |s| s.guest().and_then(|g| g.memory_gb).map(|gb| gb as f64),
                unit: "GB",
            },
            ComplianceRule::MemoryReservationRule(MemoryReservationRule {
                name: "Memory Reservation",
            }),
            fact_info! {
                name: "Memory Limit",
                value: |s| s.guest().map(|g| g.memory_limit.to_string()),
            },
        ],
        vec![ComplianceRule::NicDriverRule(NicDriverRule {
            name: "NIC",
            key: "vnic",
        })],
        vec![
            ComplianceRule::ScsiControllerTypeRule(ScsiControllerTypeRule {
                name: "SCSI Controllers",
                key: "scsi_controller_type",
            }),
            ComplianceRule::ControllerBalanceRule(ControllerBalanceRule {
                name: "Disk Controllers",
                key: "disk_controllers",
            }),
        ],
        vec![ComplianceRule::DiskProvisionRule(DiskProvisionRule {
            name: "Disk",
            check: provision_check,
        })],
        vec![ComplianceRule::StoragePathRule(StoragePathRule {
            name: "Storage Path",
            key: "storage_path_policy",
        })],
    ]
}
