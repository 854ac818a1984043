use crate::analytics::rule_templates::disk_provision_rule::ProvisionCheck;
use crate::analytics::ComplianceEngine;
use crate::data::collect_facts;
use crate::data::inventory::Inventory;
use crate::report::{ConsoleReport, Transcript};
use crate::settings::{DiskTier, RecommendedSettings};
use crate::summary::{GuestCsvRow, HostCsvRow, SummaryWriter};
use crate::utils::split_names;
use crate::IRRError;
use anyhow::Result;
use clap::Args;
use log::{error, info};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const TRANSCRIPT_FILE: &str = "esxi_checklist.log";

#[derive(Args, Debug)]
pub struct Check {
    /// Inventory snapshot of the vCenter/ESXi endpoint (YAML or JSON).
    #[clap(long, value_parser)]
    pub inventory: PathBuf,

    /// Endpoint the snapshot is expected to come from.
    #[clap(long, value_parser)]
    pub host: Option<String>,

    /// Delphix VMs to check. Specify as comma separated values.
    #[clap(short = 'm', long, value_parser, value_names = &["VM>,<VM>,...,<VM"])]
    pub vm: String,

    /// Storage tier of the Delphix VM disks: ssd or non_ssd.
    #[clap(short = 't', long, value_parser, default_value = "non_ssd")]
    pub disk_type: String,

    /// YAML file overriding recommended settings.
    #[clap(long, value_parser)]
    pub settings: Option<PathBuf>,

    /// Also grade the eager/lazy zeroing format of each disk.
    #[clap(long, value_parser)]
    pub strict_disk_format: bool,

    /// Directory receiving the transcript and summary CSV files.
    #[clap(short, long, value_parser, default_value = ".")]
    pub output_dir: PathBuf,
}

fn load_settings(path: Option<&Path>) -> Result<RecommendedSettings> {
    match path {
        Some(path) => {
            info!("Loading recommended settings from {}", path.display());
            RecommendedSettings::from_file(path)
        }
        None => Ok(RecommendedSettings::default()),
    }
}

fn is_skippable(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<IRRError>(),
        Some(IRRError::TargetNotFound(_))
            | Some(IRRError::HostNotFound(_))
            | Some(IRRError::TargetNotPoweredOn(_))
    )
}

/// Evaluate every requested VM, and the host each runs on, against the
/// recommended settings. Targets that are missing or powered off are reported
/// and skipped; the first such error is returned once the others are done.
pub fn check(check: &Check) -> Result<()> {
    let disk_tier = DiskTier::parse(&check.disk_type)?;
    let vm_names = split_names(&check.vm);
    if vm_names.is_empty() {
        return Err(IRRError::InvalidArgument("no VM names given".to_string()).into());
    }
    let settings = load_settings(check.settings.as_deref())?;

    // Outputs of a previous run must not survive a failed connection.
    fs::create_dir_all(&check.output_dir)?;
    let mut transcript = Transcript::create(&check.output_dir.join(TRANSCRIPT_FILE))?;
    let mut summaries = SummaryWriter::create(&check.output_dir)?;
    let inventory = match Inventory::open(&check.inventory, check.host.as_deref()) {
        Ok(inventory) => inventory,
        Err(err) => {
            transcript.line(&format!("{}", err))?;
            transcript.flush()?;
            return Err(err);
        }
    };

    let provision_check = if check.strict_disk_format {
        ProvisionCheck::TypeAndFormat
    } else {
        ProvisionCheck::TypeOnly
    };
    let engine = ComplianceEngine::new(settings, disk_tier, provision_check);
    let skipped = run_checks(&engine, &inventory, &vm_names, &mut transcript, &mut summaries)?;

    transcript.flush()?;
    summaries.flush()?;
    match skipped {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Streams the report for each VM. Returns the first skipped-target error.
pub fn run_checks(
    engine: &ComplianceEngine,
    inventory: &Inventory,
    vm_names: &[String],
    transcript: &mut Transcript,
    summaries: &mut SummaryWriter,
) -> Result<Option<anyhow::Error>> {
    let mut seen_hosts: HashSet<String> = HashSet::new();
    let mut skipped = None;

    for vm_name in vm_names {
        let (host, guest) = match collect_facts(inventory, vm_name) {
            Ok(facts) => facts,
            Err(err) if is_skippable(&err) => {
                error!("{}", err);
                transcript.line(&format!("{}", err))?;
                if skipped.is_none() {
                    skipped = Some(err);
                }
                continue;
            }
            Err(err) => return Err(err),
        };

        let mut report = ConsoleReport::new(transcript);
        if seen_hosts.insert(host.name.clone()) {
            report.section(&format!("ESXi Host : {}", host.name))?;
            report.header()?;
            engine.evaluate_host(&host, &mut report)?;
            report.footer()?;
            summaries.write_host(&HostCsvRow::from_facts(&host, engine.settings())?)?;
        }

        report.section(&format!("Delphix VM : {} (disk type {})", guest.name, engine.disk_tier().as_ref()))?;
        report.header()?;
        engine.evaluate_guest(&guest, &host, &mut report)?;
        report.footer()?;
        summaries.write_guest(&GuestCsvRow::from_facts(&guest, &host, engine.settings())?)?;
    }
    Ok(skipped)
}
