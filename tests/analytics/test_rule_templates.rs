use dxirr_lib::analytics::rule_templates::controller_balance_rule::controller_balance;
use dxirr_lib::analytics::rule_templates::disk_provision_rule::{provision_verdict, ProvisionCheck};
use dxirr_lib::analytics::rule_templates::storage_path_rule::StoragePathRule;
use dxirr_lib::analytics::rule_templates::version_rule::VersionAtLeastRule;
use dxirr_lib::analytics::{ComplianceRow, Evaluate, RuleContext, Subject, Verdict};
use dxirr_lib::data::collect_facts;
use dxirr_lib::data::device::Provisioning;
use dxirr_lib::data::guest::ControllerCounts;
use dxirr_lib::settings::{DiskTier, RecommendedSettings};
use dxirr_lib::VERIFY_MANUALLY;

use super::test_helpers::standard_inventory;

#[test]
fn test_version_rule_reads_host_version() {
    let inventory = standard_inventory();
    let (host, _) = collect_facts(&inventory, "dlpx01").unwrap();
    let settings = RecommendedSettings::from_yaml_str("dx_settings:\n  esxi_version: '6.5'\n").unwrap();
    let ctx = RuleContext {
        settings: &settings,
        disk_tier: DiskTier::NonSsd,
    };

    let rule = VersionAtLeastRule {
        name: "Version",
        key: "esxi_version",
        value: |s| Some(s.host().version.clone()),
    };
    let mut rows: Vec<ComplianceRow> = Vec::new();
    rule.evaluate(&ctx, &Subject::Host(&host), &mut rows).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].current, "6.0.0");
    assert_eq!(rows[0].recommended, "6.5");
    assert_eq!(rows[0].verdict, Verdict::Fail);

    let missing = VersionAtLeastRule {
        name: "Version",
        key: "esxi_version",
        value: |_| None,
    };
    let mut rows: Vec<ComplianceRow> = Vec::new();
    missing.evaluate(&ctx, &Subject::Host(&host), &mut rows).unwrap();
    assert_eq!(rows[0].current, VERIFY_MANUALLY);
    assert_eq!(rows[0].verdict, Verdict::Manual);
}

#[test]
fn test_guest_rules_skip_host_subject() {
    let inventory = standard_inventory();
    let (host, guest) = collect_facts(&inventory, "dlpx01").unwrap();
    let settings = RecommendedSettings::default();
    let ctx = RuleContext {
        settings: &settings,
        disk_tier: DiskTier::NonSsd,
    };
    let rule = StoragePathRule {
        name: "Storage Path",
        key: "storage_path_policy",
    };

    let mut rows: Vec<ComplianceRow> = Vec::new();
    rule.evaluate(&ctx, &Subject::Host(&host), &mut rows).unwrap();
    assert!(rows.is_empty());

    rule.evaluate(
        &ctx,
        &Subject::Guest {
            guest: &guest,
            host: &host,
        },
        &mut rows,
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].current, "VMW_PSP_RR");
    assert_eq!(rows[0].verdict, Verdict::Pass);
}

#[test]
fn test_storage_path_policy_mismatch() {
    let inventory = standard_inventory();
    let (host, guest) = collect_facts(&inventory, "dlpx01").unwrap();
    let settings =
        RecommendedSettings::from_yaml_str("dx_settings:\n  storage_path_policy: VMW_PSP_FIXED\n").unwrap();
    let ctx = RuleContext {
        settings: &settings,
        disk_tier: DiskTier::NonSsd,
    };
    let rule = StoragePathRule {
        name: "Storage Path",
        key: "storage_path_policy",
    };
    let mut rows: Vec<ComplianceRow> = Vec::new();
    rule.evaluate(
        &ctx,
        &Subject::Guest {
            guest: &guest,
            host: &host,
        },
        &mut rows,
    )
    .unwrap();
    assert_eq!(rows[0].verdict, Verdict::Fail);
}

#[test]
fn test_controller_balance_missing_controllers_count_zero() {
    assert_eq!(controller_balance(&ControllerCounts([4, 3, 3, 3])), Verdict::Pass);
    assert_eq!(controller_balance(&ControllerCounts([4, 3, 3, 2])), Verdict::Fail);
    assert_eq!(controller_balance(&ControllerCounts([2, 1, 1, 0])), Verdict::Fail);
}

#[test]
fn test_disk_provisioning_per_tier() {
    let thick = Provisioning::from_backing(Some(false), Some(false));
    let settings = RecommendedSettings::default();
    let non_ssd_type = settings.disk_provision_type(DiskTier::NonSsd).unwrap();
    let non_ssd_format = settings.disk_provision_format(DiskTier::NonSsd).unwrap();
    assert_eq!(
        provision_verdict(thick, non_ssd_type, non_ssd_format, ProvisionCheck::TypeOnly),
        Verdict::Pass
    );

    let ssd_type = settings.disk_provision_type(DiskTier::Ssd).unwrap();
    let ssd_format = settings.disk_provision_format(DiskTier::Ssd).unwrap();
    assert_eq!(
        provision_verdict(thick, ssd_type, ssd_format, ProvisionCheck::TypeAndFormat),
        Verdict::Fail
    );
}
