use crate::network::context::{Direction, EngineHost, LatencyResult, ThroughputResult};
use crate::IRRError;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const COMPLETED: &str = "COMPLETED";

/// The engine side of a network test run: host discovery, job submission and
/// result lookup.
pub trait NetworkTestEngine {
    fn hosts(&self) -> Result<Vec<EngineHost>>;

    /// Runs one latency test against the host and returns its job reference.
    fn run_latency_test(&mut self, host_reference: &str) -> Result<String>;

    fn run_throughput_test(&mut self, host_reference: &str, direction: Direction) -> Result<String>;

    fn latency_result(&self, job_ref: &str) -> Result<LatencyResult>;

    fn throughput_result(&self, job_ref: &str) -> Result<ThroughputResult>;

    /// Every latency result the engine still holds, including older runs.
    fn latency_results(&self) -> Result<Vec<LatencyResult>>;

    fn throughput_results(&self) -> Result<Vec<ThroughputResult>>;
}

/// Outcome of new jobs against one host. A missing figure makes that job fail.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ReplayOutcome {
    #[serde(default)]
    pub latency_usec: Option<f64>,
    #[serde(default)]
    pub transmit_bps: Option<f64>,
    #[serde(default)]
    pub receive_bps: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ReplayHistory {
    #[serde(default)]
    pub latency: Vec<LatencyResult>,
    #[serde(default)]
    pub throughput: Vec<ThroughputResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReplayDocument {
    pub engine: String,
    /// Time stamped on the first job submitted; each later job is a second on.
    pub clock: DateTime<Utc>,
    pub hosts: Vec<EngineHost>,
    /// Keyed by host reference.
    #[serde(default)]
    pub outcomes: IndexMap<String, ReplayOutcome>,
    #[serde(default)]
    pub history: ReplayHistory,
}

/// Engine backed by a recorded document, so runs are reproducible offline.
pub struct ReplayEngine {
    document: ReplayDocument,
    latency_jobs: IndexMap<String, LatencyResult>,
    throughput_jobs: IndexMap<String, ThroughputResult>,
    submitted: i64,
}

impl ReplayEngine {
    pub fn open(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| IRRError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        let engine = ReplayEngine::parse(&contents)
            .map_err(|e| IRRError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        info!("Connected to Delphix Engine {}", engine.document.engine);
        Ok(engine)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let document: ReplayDocument = serde_yaml::from_str(contents)?;
        Ok(ReplayEngine {
            document,
            latency_jobs: IndexMap::new(),
            throughput_jobs: IndexMap::new(),
            submitted: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.document.engine
    }

    fn host(&self, reference: &str) -> Result<&EngineHost> {
        self.document
            .hosts
            .iter()
            .find(|h| h.reference == reference)
            .ok_or_else(|| IRRError::RemoteJobFailure(format!("unknown host {}", reference)).into())
    }

    fn next_job(&mut self) -> (String, DateTime<Utc>) {
        let end_time = self.document.clock + Duration::seconds(self.submitted);
        self.submitted += 1;
        (format!("JOB-{}", self.submitted), end_time)
    }
}

impl NetworkTestEngine for ReplayEngine {
    fn hosts(&self) -> Result<Vec<EngineHost>> {
        Ok(self.document.hosts.clone())
    }

    fn run_latency_test(&mut self, host_reference: &str) -> Result<String> {
        let host = self.host(host_reference)?.clone();
        let average = self
            .document
            .outcomes
            .get(host_reference)
            .and_then(|o| o.latency_usec)
            .ok_or_else(|| IRRError::RemoteJobFailure(format!("latency test against {}", host.name)))?;
        let (job_ref, end_time) = self.next_job();
        let result = LatencyResult {
            name: format!("{}-{}", host.name, job_ref),
            remote_address: host.address.clone(),
            state: COMPLETED.to_string(),
            end_time,
            average_usec: average,
        };
        debug!("Latency job {} finished: {:?}", job_ref, result);
        self.document.history.latency.push(result.clone());
        self.latency_jobs.insert(job_ref.clone(), result);
        Ok(job_ref)
    }

    fn run_throughput_test(&mut self, host_reference: &str, direction: Direction) -> Result<String> {
        let host = self.host(host_reference)?.clone();
        let outcome = self.document.outcomes.get(host_reference);
        let throughput = match direction {
            Direction::Transmit => outcome.and_then(|o| o.transmit_bps),
            Direction::Receive => outcome.and_then(|o| o.receive_bps),
        }
        .ok_or_else(|| {
            IRRError::RemoteJobFailure(format!("{} throughput test against {}", direction, host.name))
        })?;
        let (job_ref, end_time) = self.next_job();
        let result = ThroughputResult {
            name: format!("{}-{}", host.name, job_ref),
            remote_address: host.address.clone(),
            direction,
            state: COMPLETED.to_string(),
            end_time,
            throughput_bps: throughput,
        };
        debug!("Throughput job {} finished: {:?}", job_ref, result);
        self.document.history.throughput.push(result.clone());
        self.throughput_jobs.insert(job_ref.clone(), result);
        Ok(job_ref)
    }

    fn latency_result(&self, job_ref: &str) -> Result<LatencyResult> {
        self.latency_jobs
            .get(job_ref)
            .cloned()
            .ok_or_else(|| IRRError::RemoteJobFailure(format!("no latency job {}", job_ref)).into())
    }

    fn throughput_result(&self, job_ref: &str) -> Result<ThroughputResult> {
        self.throughput_jobs
            .get(job_ref)
            .cloned()
            .ok_or_else(|| IRRError::RemoteJobFailure(format!("no throughput job {}", job_ref)).into())
    }

    fn latency_results(&self) -> Result<Vec<LatencyResult>> {
        Ok(self.document.history.latency.clone())
    }

    fn throughput_results(&self) -> Result<Vec<ThroughputResult>> {
        Ok(self.document.history.throughput.clone())
    }
}
