use crate::analytics::rule_templates::{
    expected_value_rule::expected_value, fact_info_rule::fact_info, version_rule::version_at_least,
};
use crate::analytics::{
    ComplianceRule, CpuHeadroomRule, ExpectedValueRule, FactInfoRule, MemoryAllocationRule,
    VersionAtLeastRule,
};
use crate::data::units::format_gb;

fn enabled(flag: bool) -> String {
    let state = if flag { "enabled" } else { "disabled" };
    state.to_string()
}

/// Host-level rules, grouped as they are printed.
pub fn get_host_rules() -> Vec<Vec<ComplianceRule>> {
    vec![
        vec![
            fact_info! {
                name: "Hostname",
                value: |s| Some(s.host().name.clone()),
            },
            version_at_least! {
                name: "Version",
                key: "esxi_version",
                value: |s| Some(s.host().version.clone()).filter(|v| !v.is_empty()),
            },
            fact_info! {
                name: "CPU Type",
                value: |s| s.host().cpu_model.clone(),
            },
            fact_info! {
                name: "Vendor/Model",
                value: |s| s.host().vendor_model.clone(),
            },
            fact_info! {
                name: "CPU Sockets",
                value: |s| s.host().cpu_sockets.map(|v| v.to_string()),
            },
            fact_info! {
                name: "Cores Per Socket",
                value: |s| s.host().cores_per_socket().map(|v| v.to_string()),
            },
            expected_value! {
                name: "Hyperthreading Active",
                key: "hyperthreading",
                value: |s| s.host().hyperthreading_active.map(|v| v.to_string()),
                ignore_case: true,
            },
        ],
        vec![
            fact_info! {
                name: "Physical Memory",
                value: |s| s.host().memory_gb.map(|gb| format_gb(gb as f64)),
            },
            expected_value! {
                name: "Power Management Policy",
                key: "power_policy",
                value: |s| s.host().power_policy.clone(),
                ignore_case: true,
            },
        ],
        vec![
            expected_value! {
                name: "HA",
                key: "esxi_ha",
                value: |s| s.host().ha_enabled.map(enabled),
                ignore_case: true,
            },
            expected_value! {
                name: "DRS",
                key: "esxi_drs",
                value: |s| s.host().drs_enabled.map(enabled),
                ignore_case: true,
            },
        ],
        vec![
            ComplianceRule::CpuHeadroomRule(CpuHeadroomRule {
                name: "CPU Headroom",
                key: "host_cpu_headroom_cores",
            }),
            ComplianceRule::MemoryAllocationRule(MemoryAllocationRule {
                name: "Memory Allocation",
                key: "host_memory_max_allocation_pct",
            }),
        ],
    ]
}
