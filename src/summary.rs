use crate::analytics::rule_templates::{
    controller_balance_rule::controller_balance,
    expected_value_rule::matches_expected,
    reservation_rule::{cpu_reservation_verdict, memory_reservation_verdict},
};
use crate::analytics::Verdict;
use crate::data::guest::{ControllerCounts, GuestFacts};
use crate::data::host::HostFacts;
use crate::settings::RecommendedSettings;
use crate::NOT_AVAILABLE;
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const HOST_SUMMARY_FILE: &str = "esxi_host_summary.csv";
pub const GUEST_SUMMARY_FILE: &str = "esxi_vm_summary.csv";

fn field<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string().replace(',', ";"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn flag(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "Pass",
        Verdict::Fail => "Fail",
        Verdict::Manual | Verdict::NotApplicable => "Manual",
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HostCsvRow {
    pub version: String,
    pub build: String,
    pub update_level: Option<String>,
    pub sockets: Option<u32>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub ht_active: Option<bool>,
    pub ht_config: Option<bool>,
    pub ht_best_practice: Verdict,
}

impl HostCsvRow {
    pub fn from_facts(host: &HostFacts, settings: &RecommendedSettings) -> Result<Self> {
        let expected = settings.get("hyperthreading")?;
        let ht_best_practice = match host.hyperthreading_active {
            Some(active) => matches_expected(&active.to_string(), expected, true),
            None => Verdict::Manual,
        };
        Ok(HostCsvRow {
            version: host.version.clone(),
            build: host.build.clone(),
            update_level: host.update_level.clone(),
            sockets: host.cpu_sockets,
            cores: host.cpu_cores,
            threads: host.cpu_threads,
            ht_active: host.hyperthreading_active,
            ht_config: host.hyperthreading_config,
            ht_best_practice,
        })
    }

    pub fn csv_header() -> &'static str {
        "version,build,update_level,sockets,cores,threads,ht_active,ht_config,ht_best_practice"
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.version.replace(',', ";"),
            self.build.replace(',', ";"),
            field(self.update_level.as_ref()),
            field(self.sockets),
            field(self.cores),
            field(self.threads),
            field(self.ht_active),
            field(self.ht_config),
            flag(self.ht_best_practice),
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GuestCsvRow {
    pub name: String,
    pub vcpus: Option<u32>,
    pub cores_per_socket: Option<u32>,
    pub cpu_reservation: String,
    pub cpu_reservation_pass: Verdict,
    pub memory_gb: Option<u64>,
    pub memory_reserved_gb: f64,
    pub memory_reservation_pass: Verdict,
    pub ht_sharing: Option<String>,
    pub ht_sharing_pass: Verdict,
    pub controller_counts: ControllerCounts,
    pub controller_balance_pass: Verdict,
}

impl GuestCsvRow {
    pub fn from_facts(guest: &GuestFacts, host: &HostFacts, settings: &RecommendedSettings) -> Result<Self> {
        let expected_sharing = settings.get("ht_sharing")?;
        let ht_sharing_pass = match &guest.ht_sharing {
            Some(sharing) => matches_expected(sharing, expected_sharing, true),
            None => Verdict::Manual,
        };
        let controller_counts = ControllerCounts::from_devices(&guest.devices);
        Ok(GuestCsvRow {
            name: guest.name.clone(),
            vcpus: guest.vcpus,
            cores_per_socket: guest.cores_per_socket,
            cpu_reservation: guest.cpu_reservation.to_string(),
            cpu_reservation_pass: cpu_reservation_verdict(&guest.cpu_reservation, host.cpu_mhz, guest.vcpus),
            memory_gb: guest.memory_gb,
            memory_reserved_gb: guest.memory_reservation.as_gb(),
            memory_reservation_pass: memory_reservation_verdict(&guest.memory_reservation, guest.memory_gb),
            ht_sharing: guest.ht_sharing.clone(),
            ht_sharing_pass,
            controller_balance_pass: controller_balance(&controller_counts),
            controller_counts,
        })
    }

    pub fn csv_header() -> &'static str {
        "name,vcpus,cores_per_socket,cpu_reservation,cpu_reservation_pass,memory_gb,memory_reserved_gb,memory_reservation_pass,memory_gb,ht_sharing,ht_sharing_pass,controller_counts,controller_balance_pass"
    }

    pub fn to_csv_row(&self) -> String {
        // memory_gb appears twice in the header; both columns carry it.
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.name.replace(',', ";"),
            field(self.vcpus),
            field(self.cores_per_socket),
            self.cpu_reservation.replace(',', ";"),
            flag(self.cpu_reservation_pass),
            field(self.memory_gb),
            self.memory_reserved_gb,
            flag(self.memory_reservation_pass),
            field(self.memory_gb),
            field(self.ht_sharing.as_ref()),
            flag(self.ht_sharing_pass),
            self.controller_counts.describe(),
            flag(self.controller_balance_pass),
        )
    }
}

/// The two summary files of a run. Both are truncated and given a header when
/// opened.
pub struct SummaryWriter {
    host: File,
    guest: File,
}

impl SummaryWriter {
    pub fn create(dir: &Path) -> Result<Self> {
        let host_path = dir.join(HOST_SUMMARY_FILE);
        let guest_path = dir.join(GUEST_SUMMARY_FILE);
        debug!("Writing summaries to {} and {}", host_path.display(), guest_path.display());

        let mut host = File::create(host_path)?;
        writeln!(host, "{}", HostCsvRow::csv_header())?;
        let mut guest = File::create(guest_path)?;
        writeln!(guest, "{}", GuestCsvRow::csv_header())?;
        Ok(SummaryWriter { host, guest })
    }

    pub fn write_host(&mut self, row: &HostCsvRow) -> Result<()> {
        writeln!(self.host, "{}", row.to_csv_row())?;
        Ok(())
    }

    pub fn write_guest(&mut self, row: &GuestCsvRow) -> Result<()> {
        writeln!(self.guest, "{}", row.to_csv_row())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.host.flush()?;
        self.guest.flush()?;
        Ok(())
    }
}
