use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

pub const WINDOWS_HOST: &str = "WindowsHost";

/// A host registered with the engine, as listed before probing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineHost {
    pub name: String,
    pub reference: String,
    pub address: String,
    pub host_type: String,
    #[serde(default)]
    pub connector_port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActiveHost {
    pub name: String,
    pub reference: String,
    pub address: String,
    pub host_type: String,
    /// Always 0 for non-Windows hosts.
    pub connector_port: u16,
}

impl ActiveHost {
    pub fn from_engine_host(host: &EngineHost) -> Self {
        let connector_port = if host.host_type == WINDOWS_HOST {
            host.connector_port
        } else {
            0
        };
        ActiveHost {
            name: host.name.clone(),
            reference: host.reference.clone(),
            address: host.address.clone(),
            host_type: host.host_type.clone(),
            connector_port,
        }
    }

    /// Windows sources without a connector port cannot run throughput tests.
    pub fn supports_throughput(&self) -> bool {
        !(self.host_type == WINDOWS_HOST && self.connector_port == 0)
    }

    /// "name(address)"
    pub fn display_name(&self) -> String {
        format!("{}({})", self.name, self.address)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InactiveHost {
    pub name: String,
    pub reference: String,
    pub address: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum JobKind {
    Latency,
    Throughput,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Direction {
    Transmit,
    Receive,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Transmit, Direction::Receive];
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub kind: JobKind,
    pub job_ref: String,
    pub direction: Option<Direction>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Failed,
    NotSupported,
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Failed => "Failed",
            JobStatus::NotSupported => "Not Supported",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobErrorRecord {
    pub kind: JobKind,
    pub host_name: String,
    pub host_address: String,
    /// A direction, or "Throughput Test" when the whole test was skipped.
    pub direction: Option<String>,
    pub status: JobStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LatencyResult {
    pub name: String,
    pub remote_address: String,
    pub state: String,
    pub end_time: DateTime<Utc>,
    pub average_usec: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ThroughputResult {
    pub name: String,
    pub remote_address: String,
    pub direction: Direction,
    pub state: String,
    pub end_time: DateTime<Utc>,
    pub throughput_bps: f64,
}

/// Everything one network test run learns, threaded through each phase.
#[derive(Debug, Default)]
pub struct EvaluationContext {
    pub active_hosts: Vec<ActiveHost>,
    pub inactive_hosts: Vec<InactiveHost>,
    pub job_results: Vec<JobRecord>,
    pub job_errors: Vec<JobErrorRecord>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        EvaluationContext::default()
    }

    pub fn job_count(&self, kind: JobKind) -> usize {
        self.job_results.iter().filter(|j| j.kind == kind).count()
    }

    pub fn jobs_of(&self, kind: JobKind) -> impl Iterator<Item = &JobRecord> {
        self.job_results.iter().filter(move |j| j.kind == kind)
    }

    pub fn errors_of(&self, kind: JobKind) -> impl Iterator<Item = &JobErrorRecord> {
        self.job_errors.iter().filter(move |e| e.kind == kind)
    }
}
