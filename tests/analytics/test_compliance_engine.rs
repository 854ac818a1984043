use dxirr_lib::analytics::rule_templates::disk_provision_rule::ProvisionCheck;
use dxirr_lib::analytics::Verdict;
use dxirr_lib::data::inventory::Inventory;
use dxirr_lib::settings::{DiskTier, RecommendedSettings};
use dxirr_lib::VERIFY_MANUALLY;

use super::test_helpers::{
    devices_json, evaluate, evaluate_with, guest_json, host_json, inventory, inventory_json, row,
    standard_inventory,
};

#[test]
fn test_end_to_end_non_ssd_guest() {
    let evaluated = evaluate(&standard_inventory(), "dlpx01");
    let guest = &evaluated.guest_rows;

    let vcpus = row(guest, "Delphix VM [dlpx01] Number of vCPUs");
    assert_eq!(vcpus.current, "4");
    assert_eq!(vcpus.recommended, "8");
    assert_eq!(vcpus.verdict, Verdict::Fail);

    let reservation = row(guest, "Delphix VM [dlpx01] CPU Reservation");
    assert_eq!(reservation.current, "None");
    assert_eq!(reservation.recommended, "13828 Mhz");
    assert_eq!(reservation.verdict, Verdict::Fail);

    let memory = row(guest, "Delphix VM [dlpx01] Memory");
    assert_eq!(memory.current, "24 GB");
    assert_eq!(memory.recommended, "64 GB");
    assert_eq!(memory.verdict, Verdict::Fail);

    assert_eq!(row(guest, "Delphix VM [dlpx01] HT Sharing").verdict, Verdict::Pass);
    assert_eq!(
        row(guest, "Delphix VM [dlpx01] Memory Reservation").verdict,
        Verdict::Fail
    );
}

#[test]
fn test_host_rows() {
    let evaluated = evaluate(&standard_inventory(), "dlpx01");
    let host = &evaluated.host_rows;

    let labels: Vec<&str> = host.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "ESXi Hostname",
            "ESXi Version",
            "ESXi CPU Type",
            "ESXi Vendor/Model",
            "ESXi CPU Sockets",
            "ESXi Cores Per Socket",
            "ESXi Hyperthreading Active",
            "ESXi Physical Memory",
            "ESXi Power Management Policy",
            "ESXi HA",
            "ESXi DRS",
            "ESXi CPU Headroom",
            "ESXi Memory Allocation",
        ]
    );

    let cpu_type = row(host, "ESXi CPU Type");
    assert_eq!(cpu_type.current, "Intel(R) Xeon(R) CPU E5-2643 v3 @ 3.40GHz");
    assert_eq!(cpu_type.verdict, Verdict::NotApplicable);
    assert_eq!(row(host, "ESXi Vendor/Model").current, "Dell Inc. PowerEdge R730");
    assert_eq!(row(host, "ESXi Cores Per Socket").current, "6");
    assert_eq!(row(host, "ESXi Physical Memory").current, "95 GB");
    assert_eq!(row(host, "ESXi Version").verdict, Verdict::Pass);
    assert_eq!(row(host, "ESXi Hyperthreading Active").verdict, Verdict::Pass);
    assert_eq!(row(host, "ESXi HA").verdict, Verdict::Pass);
    assert_eq!(row(host, "ESXi DRS").verdict, Verdict::Pass);

    let headroom = row(host, "ESXi CPU Headroom");
    assert_eq!(headroom.current, "8 cores unallocated");
    assert_eq!(headroom.verdict, Verdict::Pass);
    assert_eq!(row(host, "ESXi Memory Allocation").verdict, Verdict::Pass);
}

#[test]
fn test_guest_row_order() {
    let inventory = inventory(
        vec![host_json("esx01", 2, 12, 95)],
        vec![guest_json(
            "dlpx01",
            "esx01",
            8,
            65536,
            devices_json([2, 1, 0, 0], "datastore1"),
        )],
    );
    let evaluated = evaluate(&inventory, "dlpx01");
    let labels: Vec<String> = evaluated
        .guest_rows
        .iter()
        .map(|r| r.label.trim_start_matches("Delphix VM [dlpx01] ").to_string())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Number of vCPUs",
            "Cores Per Socket",
            "CPU Reservation",
            "CPU Limit",
            "HT Sharing",
            "Memory",
            "Memory Reservation",
            "Memory Limit",
            "NIC",
            "SCSI Controllers [SCSI controller 0]",
            "SCSI Controllers [SCSI controller 1]",
            "SCSI Controllers [SCSI controller 2]",
            "SCSI Controllers [SCSI controller 3]",
            "Disk Controllers",
            "Disk [Hard disk 1]",
            "Disk [Hard disk 2]",
            "Disk [Hard disk 3]",
            "Storage Path [Hard disk 1]",
            "Storage Path [Hard disk 2]",
            "Storage Path [Hard disk 3]",
        ]
    );

    let disk = row(&evaluated.guest_rows, "Delphix VM [dlpx01] Disk [Hard disk 3]");
    assert_eq!(
        disk.current,
        "Thick Prov:true , EagerZero:true , Ctrl: 1:0, Size: 8 GB"
    );
    assert_eq!(disk.verdict, Verdict::Pass);
    let nic = row(&evaluated.guest_rows, "Delphix VM [dlpx01] NIC");
    assert_eq!(nic.current, "Network adapter 1 | VM Network | VirtualVmxnet3");
    assert_eq!(nic.verdict, Verdict::Pass);
}

#[test]
fn test_controller_balance_rows() {
    let balanced = inventory(
        vec![host_json("esx01", 2, 12, 95)],
        vec![guest_json("dlpx01", "esx01", 8, 65536, devices_json([4, 3, 3, 3], "datastore1"))],
    );
    let rows = evaluate(&balanced, "dlpx01").guest_rows;
    let balance = row(&rows, "Delphix VM [dlpx01] Disk Controllers");
    assert_eq!(balance.current, "0:4 1:3 2:3 3:3");
    assert_eq!(balance.recommended, "Distribute VMDKs");
    assert_eq!(balance.verdict, Verdict::Pass);

    let unbalanced = inventory(
        vec![host_json("esx01", 2, 12, 95)],
        vec![guest_json("dlpx01", "esx01", 8, 65536, devices_json([4, 3, 3, 2], "datastore1"))],
    );
    let rows = evaluate(&unbalanced, "dlpx01").guest_rows;
    assert_eq!(
        row(&rows, "Delphix VM [dlpx01] Disk Controllers").verdict,
        Verdict::Fail
    );
}

#[test]
fn test_nas_disk_is_labelled_and_manual() {
    let inventory = inventory(
        vec![host_json("esx01", 2, 12, 95)],
        vec![guest_json("dlpx01", "esx01", 8, 65536, devices_json([1, 0, 0, 0], "nfs1"))],
    );
    let rows = evaluate(&inventory, "dlpx01").guest_rows;
    let path = row(&rows, "Delphix VM [dlpx01] Storage Path [Hard disk 1] (NAS)");
    assert_eq!(path.verdict, Verdict::Manual);
    assert!(path.current.starts_with("NAS host-wide: "));
    assert!(path.current.contains(VERIFY_MANUALLY));
}

#[test]
fn test_missing_host_fields_are_manual() {
    let mut host = host_json("esx01", 2, 12, 95);
    let fields = host.as_object_mut().unwrap();
    fields.remove("hyperthreading");
    fields.remove("ha_enabled");
    let inventory = inventory(
        vec![host],
        vec![guest_json("dlpx01", "esx01", 8, 65536, devices_json([1, 0, 0, 0], "datastore1"))],
    );
    let rows = evaluate(&inventory, "dlpx01").host_rows;

    for label in ["ESXi Hyperthreading Active", "ESXi HA"] {
        let missing = row(&rows, label);
        assert_eq!(missing.verdict, Verdict::Manual);
        assert_eq!(missing.current, VERIFY_MANUALLY);
    }
}

#[test]
fn test_strict_disk_format_on_ssd_tier() {
    let inventory = standard_inventory();
    let strict = evaluate_with(
        &inventory,
        "dlpx01",
        RecommendedSettings::default(),
        DiskTier::Ssd,
        ProvisionCheck::TypeAndFormat,
    );
    let disk = row(&strict.guest_rows, "Delphix VM [dlpx01] Disk [Hard disk 1]");
    assert_eq!(disk.recommended, "Thick Lazy-Zero");
    assert_eq!(disk.verdict, Verdict::Fail);

    let lenient = evaluate_with(
        &inventory,
        "dlpx01",
        RecommendedSettings::default(),
        DiskTier::Ssd,
        ProvisionCheck::TypeOnly,
    );
    assert_eq!(
        row(&lenient.guest_rows, "Delphix VM [dlpx01] Disk [Hard disk 1]").verdict,
        Verdict::Pass
    );
}

#[test]
fn test_vcpu_minimum_is_monotonic() {
    let verdicts: Vec<Verdict> = (1..=16)
        .map(|vcpus| {
            let inventory = inventory(
                vec![host_json("esx01", 2, 24, 256)],
                vec![guest_json("dlpx01", "esx01", vcpus, 65536, devices_json([1, 0, 0, 0], "datastore1"))],
            );
            row(&evaluate(&inventory, "dlpx01").guest_rows, "Delphix VM [dlpx01] Number of vCPUs").verdict
        })
        .collect();
    let first_pass = verdicts.iter().position(|v| *v == Verdict::Pass).unwrap();
    assert_eq!(first_pass, 7);
    assert!(verdicts[first_pass..].iter().all(|v| *v == Verdict::Pass));
    assert!(verdicts[..first_pass].iter().all(|v| *v == Verdict::Fail));
}

#[test]
fn test_settings_override_changes_verdict() {
    let settings = RecommendedSettings::from_yaml_str("dx_settings:\n  minimum_cpu: 4\n").unwrap();
    let evaluated = evaluate_with(
        &standard_inventory(),
        "dlpx01",
        settings,
        DiskTier::NonSsd,
        ProvisionCheck::TypeOnly,
    );
    assert_eq!(
        row(&evaluated.guest_rows, "Delphix VM [dlpx01] Number of vCPUs").verdict,
        Verdict::Pass
    );
}

#[test]
fn test_missing_version_and_datastore_type_are_manual() {
    let mut snapshot = inventory_json(
        vec![host_json("esx01", 2, 12, 95)],
        vec![guest_json("dlpx01", "esx01", 8, 65536, devices_json([1, 0, 0, 0], "datastore1"))],
    );
    snapshot["about"].as_object_mut().unwrap().remove("version");
    snapshot["hosts"][0]["datastores"][0]
        .as_object_mut()
        .unwrap()
        .remove("type");
    let inventory: Inventory = serde_json::from_value(snapshot).unwrap();
    let evaluated = evaluate(&inventory, "dlpx01");

    let version = row(&evaluated.host_rows, "ESXi Version");
    assert_eq!(version.current, VERIFY_MANUALLY);
    assert_eq!(version.recommended, "5.5");
    assert_eq!(version.verdict, Verdict::Manual);

    let path = row(&evaluated.guest_rows, "Delphix VM [dlpx01] Storage Path [Hard disk 1]");
    assert_eq!(path.verdict, Verdict::Manual);
}

#[test]
fn test_limits_are_reported() {
    let mut guest = guest_json("dlpx01", "esx01", 8, 65536, devices_json([1, 0, 0, 0], "datastore1"));
    guest["resource_config"]["memory_allocation"]["limit"] = 32768.into();
    let inventory = inventory(vec![host_json("esx01", 2, 12, 95)], vec![guest]);
    let rows = evaluate(&inventory, "dlpx01").guest_rows;

    let cpu_limit = row(&rows, "Delphix VM [dlpx01] CPU Limit");
    assert_eq!(cpu_limit.current, "None");
    assert_eq!(cpu_limit.verdict, Verdict::NotApplicable);
    assert_eq!(row(&rows, "Delphix VM [dlpx01] Memory Limit").current, "32768 MB");
}

#[test]
fn test_heavily_allocated_host_fails_headroom() {
    // 12 cores and 95 GB; guests claim 10 vCPUs and 88 GB.
    let inventory = inventory(
        vec![host_json("esx01", 2, 12, 95)],
        vec![
            guest_json("dlpx01", "esx01", 8, 65536, devices_json([1, 0, 0, 0], "datastore1")),
            guest_json("dlpx02", "esx01", 2, 24576, devices_json([1, 0, 0, 0], "datastore1")),
        ],
    );
    let rows = evaluate(&inventory, "dlpx01").host_rows;

    let headroom = row(&rows, "ESXi CPU Headroom");
    assert_eq!(headroom.current, "2 cores unallocated");
    assert_eq!(headroom.verdict, Verdict::Fail);
    let memory = row(&rows, "ESXi Memory Allocation");
    assert_eq!(memory.current, "92.6% allocated");
    assert_eq!(memory.verdict, Verdict::Fail);
}
