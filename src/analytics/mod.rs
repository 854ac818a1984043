pub mod rule_templates;
mod rules;

use crate::data::guest::GuestFacts;
use crate::data::host::HostFacts;
use crate::settings::{DiskTier, RecommendedSettings};
use crate::{NOT_AVAILABLE, VERIFY_MANUALLY};
use anyhow::Result;
use log::debug;
use rule_templates::{
    controller_balance_rule::ControllerBalanceRule,
    device_match_rule::{NicDriverRule, ScsiControllerTypeRule},
    disk_provision_rule::{DiskProvisionRule, ProvisionCheck},
    expected_value_rule::ExpectedValueRule,
    fact_info_rule::FactInfoRule,
    headroom_rule::{CpuHeadroomRule, MemoryAllocationRule},
    minimum_value_rule::MinimumValueRule,
    reservation_rule::{CpuReservationRule, MemoryReservationRule},
    storage_path_rule::StoragePathRule,
    version_rule::VersionAtLeastRule,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// The engine cannot decide; an operator has to check by hand.
    Manual,
    NotApplicable,
}

impl Verdict {
    pub fn from_bool(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Pass => "Pass",
            Verdict::Fail => "Fail",
            Verdict::Manual => "Manual",
            Verdict::NotApplicable => NOT_AVAILABLE,
        };
        // Pad through the formatter so table widths apply.
        f.pad(s)
    }
}

/// One line of the compliance report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComplianceRow {
    pub label: String,
    pub current: String,
    pub recommended: String,
    pub verdict: Verdict,
}

impl ComplianceRow {
    pub fn new(label: String, current: String, recommended: String, verdict: Verdict) -> Self {
        ComplianceRow {
            label,
            current,
            recommended,
            verdict,
        }
    }

    /// Row for a rule whose input could not be read.
    pub fn manual(label: String, recommended: String) -> Self {
        ComplianceRow::new(label, VERIFY_MANUALLY.to_string(), recommended, Verdict::Manual)
    }

    /// Informational row with nothing to compare against.
    pub fn info(label: String, current: String) -> Self {
        ComplianceRow::new(label, current, NOT_AVAILABLE.to_string(), Verdict::NotApplicable)
    }
}

/// Receives rows in evaluation order, as they are computed.
pub trait RowSink {
    fn emit(&mut self, row: ComplianceRow) -> Result<()>;

    /// Called between rule groups.
    fn group_break(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RowSink for Vec<ComplianceRow> {
    fn emit(&mut self, row: ComplianceRow) -> Result<()> {
        self.push(row);
        Ok(())
    }
}

/// The facts a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Host(&'a HostFacts),
    Guest {
        guest: &'a GuestFacts,
        host: &'a HostFacts,
    },
}

impl<'a> Subject<'a> {
    pub fn host(&self) -> &'a HostFacts {
        match self {
            Subject::Host(host) => host,
            Subject::Guest { host, .. } => host,
        }
    }

    pub fn guest(&self) -> Option<&'a GuestFacts> {
        match self {
            Subject::Host(_) => None,
            Subject::Guest { guest, .. } => Some(guest),
        }
    }

    pub fn label(&self, what: &str) -> String {
        match self {
            Subject::Host(_) => format!("ESXi {}", what),
            Subject::Guest { guest, .. } => guest.label(what),
        }
    }
}

/// Inputs shared by every rule of one run.
pub struct RuleContext<'a> {
    pub settings: &'a RecommendedSettings,
    pub disk_tier: DiskTier,
}

/// The trait to be implemented by every rule template. A rule emits one or more
/// rows for the subject, or none when the subject is of the wrong level.
pub trait Evaluate {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()>;
}

macro_rules! compliance_rules {
    ($( $compliance_rule:ident ), *) => {
        pub enum ComplianceRule {
            $(
                $compliance_rule($compliance_rule),
            )*
        }

        impl ComplianceRule {
            pub fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
                match self {
                    $(
                        ComplianceRule::$compliance_rule(ref compliance_rule) => compliance_rule.evaluate(ctx, subject, sink),
                    )*
                }
            }
        }
    };
}

// Register all rule templates here
compliance_rules!(
    FactInfoRule,
    VersionAtLeastRule,
    MinimumValueRule,
    ExpectedValueRule,
    CpuReservationRule,
    MemoryReservationRule,
    CpuHeadroomRule,
    MemoryAllocationRule,
    NicDriverRule,
    ScsiControllerTypeRule,
    ControllerBalanceRule,
    DiskProvisionRule,
    StoragePathRule
);

/// Runs the host-level and guest-level rule groups, in their fixed order,
/// streaming rows to a sink.
pub struct ComplianceEngine {
    settings: RecommendedSettings,
    disk_tier: DiskTier,
    host_rules: Vec<Vec<ComplianceRule>>,
    guest_rules: Vec<Vec<ComplianceRule>>,
}

impl ComplianceEngine {
    pub fn new(settings: RecommendedSettings, disk_tier: DiskTier, provision_check: ProvisionCheck) -> Self {
        ComplianceEngine {
            settings,
            disk_tier,
            host_rules: rules::host::get_host_rules(),
            guest_rules: rules::guest::get_guest_rules(provision_check),
        }
    }

    pub fn settings(&self) -> &RecommendedSettings {
        &self.settings
    }

    pub fn disk_tier(&self) -> DiskTier {
        self.disk_tier
    }

    fn run(&self, groups: &[Vec<ComplianceRule>], subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let ctx = RuleContext {
            settings: &self.settings,
            disk_tier: self.disk_tier,
        };
        for (index, group) in groups.iter().enumerate() {
            if index > 0 {
                sink.group_break()?;
            }
            for rule in group {
                rule.evaluate(&ctx, subject, sink)?;
            }
        }
        Ok(())
    }

    pub fn evaluate_host(&self, host: &HostFacts, sink: &mut dyn RowSink) -> Result<()> {
        debug!("Evaluating host {}", host.name);
        self.run(&self.host_rules, &Subject::Host(host), sink)
    }

    pub fn evaluate_guest(&self, guest: &GuestFacts, host: &HostFacts, sink: &mut dyn RowSink) -> Result<()> {
        debug!("Evaluating guest {} on {}", guest.name, host.name);
        self.run(&self.guest_rules, &Subject::Guest { guest, host }, sink)
    }
}
