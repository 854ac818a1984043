pub mod context;
pub mod engine;
pub mod probe;
pub mod results;

use crate::report::{Level, Transcript};
use crate::utils::{split_names, timestamped_file_name};
use crate::IRRError;
use anyhow::Result;
use chrono::Local;
use clap::Args;
use context::{
    ActiveHost, Direction, EvaluationContext, InactiveHost, JobErrorRecord, JobKind, JobRecord,
    JobStatus,
};
use engine::{NetworkTestEngine, ReplayEngine};
use log::{debug, info};
use probe::{PingProbe, Reachability};
use std::path::PathBuf;

pub const LATENCY_TEST_SECS: u64 = 20;
pub const THROUGHPUT_TEST_SECS: u64 = 75;

#[derive(Args, Debug)]
pub struct Network {
    /// Recorded Delphix Engine session to run the tests against.
    #[clap(short, long, value_parser)]
    pub engine: PathBuf,

    /// Target hosts to test. Specify as comma separated values. Tests every host if not provided.
    #[clap(short, long, value_parser, value_names = &["Host>,<Host>,...,<Host"])]
    pub tgtlist: Option<String>,

    /// Name of a custom log file.
    #[clap(short, long, value_parser)]
    pub logfile: Option<String>,

    /// Mark every target host reachable without pinging it.
    #[clap(short, long, value_parser)]
    pub force: bool,
}

#[cfg(unix)]
fn check_interrupt() -> Result<()> {
    let stdin = std::io::stdin();
    crate::interrupt::confirm_if_requested(&mut stdin.lock(), &mut std::io::stdout())
}

#[cfg(not(unix))]
fn check_interrupt() -> Result<()> {
    Ok(())
}

fn is_job_failure(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<IRRError>(), Some(IRRError::RemoteJobFailure(_)))
}

fn host_line(name: &str, reference: &str, address: &str, status: &str) -> String {
    format!("{:28} {:20} {:15} {:6}", name, reference, address, status)
}

/// Sort the engine's hosts into reachable and unreachable ones. With targets,
/// only the named hosts are considered.
pub fn gen_host_lists(
    ctx: &mut EvaluationContext,
    engine: &dyn NetworkTestEngine,
    probe: &dyn Reachability,
    targets: &[String],
    force: bool,
    transcript: &mut Transcript,
) -> Result<()> {
    transcript.line(" ")?;
    transcript.message(
        Level::Info,
        1,
        "Generating list of environments to conduct Network Tests. Please wait ...........",
        false,
    )?;
    transcript.line(" ")?;
    transcript.line(&host_line("EnvironmentName", "EnvironmentReference", "IP Address", "Ping"))?;
    transcript.line(&host_line(&"-".repeat(28), &"-".repeat(20), &"-".repeat(15), &"-".repeat(6)))?;

    for host in engine.hosts()? {
        if !targets.is_empty() && !targets.contains(&host.name) {
            continue;
        }
        if force || probe.is_reachable(&host.address) {
            let status = if force { "Force OK" } else { "OK" };
            transcript.line(&host_line(&host.name, &host.reference, &host.address, status))?;
            ctx.active_hosts.push(ActiveHost::from_engine_host(&host));
        } else {
            transcript.line(&host_line(&host.name, &host.reference, &host.address, "NOT OK"))?;
            ctx.inactive_hosts.push(InactiveHost {
                name: host.name,
                reference: host.reference,
                address: host.address,
            });
        }
    }

    transcript.line(" ")?;
    transcript.message(Level::Info, 1, "Environment list generated.", false)?;
    transcript.line(" ")
}

/// Total expected run time in seconds.
pub fn estimate_test_duration(ctx: &EvaluationContext, transcript: &mut Transcript) -> Result<u64> {
    let hosts = ctx.active_hosts.len() as u64;
    let total = hosts * LATENCY_TEST_SECS + hosts * THROUGHPUT_TEST_SECS * 2;
    transcript.message(
        Level::Info,
        1,
        &format!(
            "Running {} network latency tests, {} network throughput tests (in both directions)",
            hosts,
            hosts * 2
        ),
        false,
    )?;
    transcript.message(
        Level::Info,
        1,
        &format!("Estimated duration to complete all tests is about {} seconds", total),
        false,
    )?;
    transcript.line(" ")?;
    Ok(total)
}

pub fn run_latency_tests(
    ctx: &mut EvaluationContext,
    engine: &mut dyn NetworkTestEngine,
    transcript: &mut Transcript,
) -> Result<()> {
    for host in &ctx.active_hosts {
        check_interrupt()?;
        transcript.message(
            Level::Info,
            1,
            &format!(
                "Processing Network Latency Test for: {}. Please wait ...........",
                host.display_name()
            ),
            false,
        )?;
        match engine.run_latency_test(&host.reference) {
            Ok(job_ref) => {
                ctx.job_results.push(JobRecord {
                    kind: JobKind::Latency,
                    job_ref,
                    direction: None,
                });
                transcript.message(
                    Level::Info,
                    1,
                    &format!("Successfully completed Network Latency Test for: {}", host.display_name()),
                    false,
                )?;
            }
            Err(err) if is_job_failure(&err) => {
                debug!("{}", err);
                transcript.message(
                    Level::Error,
                    1,
                    &format!("Failed Network Latency Test for: {}", host.display_name()),
                    false,
                )?;
                ctx.job_errors.push(JobErrorRecord {
                    kind: JobKind::Latency,
                    host_name: host.name.clone(),
                    host_address: host.address.clone(),
                    direction: None,
                    status: JobStatus::Failed,
                });
            }
            Err(err) => return Err(err),
        }
        transcript.line(" ")?;
    }
    Ok(())
}

/// Transmit then receive, one host at a time.
pub fn run_throughput_tests(
    ctx: &mut EvaluationContext,
    engine: &mut dyn NetworkTestEngine,
    transcript: &mut Transcript,
) -> Result<()> {
    for host in &ctx.active_hosts {
        if !host.supports_throughput() {
            transcript.message(
                Level::Warn,
                1,
                &format!(
                    "Network Throughput (TRANSMIT/RECEIVE) Test NOT SUPPORTED for Windows Source Environment: {}",
                    host.display_name()
                ),
                false,
            )?;
            ctx.job_errors.push(JobErrorRecord {
                kind: JobKind::Throughput,
                host_name: host.name.clone(),
                host_address: host.address.clone(),
                direction: Some("Throughput Test".to_string()),
                status: JobStatus::NotSupported,
            });
            transcript.line(" ")?;
            continue;
        }

        for direction in Direction::ALL {
            check_interrupt()?;
            transcript.message(
                Level::Info,
                1,
                &format!(
                    "Processing Network Throughput {} Test for: {}. Please wait ........... ",
                    direction,
                    host.display_name()
                ),
                false,
            )?;
            match engine.run_throughput_test(&host.reference, direction) {
                Ok(job_ref) => {
                    ctx.job_results.push(JobRecord {
                        kind: JobKind::Throughput,
                        job_ref,
                        direction: Some(direction),
                    });
                    transcript.message(
                        Level::Info,
                        1,
                        &format!(
                            "Successfully completed Network Throughput {} Test for: {}",
                            direction,
                            host.display_name()
                        ),
                        false,
                    )?;
                }
                Err(err) if is_job_failure(&err) => {
                    debug!("{}", err);
                    transcript.message(
                        Level::Error,
                        1,
                        &format!(
                            "Failed Network Throughput {} Test for: {}",
                            direction,
                            host.display_name()
                        ),
                        false,
                    )?;
                    ctx.job_errors.push(JobErrorRecord {
                        kind: JobKind::Throughput,
                        host_name: host.name.clone(),
                        host_address: host.address.clone(),
                        direction: Some(direction.to_string()),
                        status: JobStatus::Failed,
                    });
                }
                Err(err) => return Err(err),
            }
        }
        transcript.line(" ")?;
    }
    Ok(())
}

fn timestamp() -> String {
    Local::now().format("%a %b %d %H:%M:%S %Z %Y").to_string()
}

/// Every phase of a run, in order, against an already opened engine.
pub fn run_network_tests(
    engine: &mut dyn NetworkTestEngine,
    probe: &dyn Reachability,
    targets: &[String],
    force: bool,
    transcript: &mut Transcript,
) -> Result<EvaluationContext> {
    let mut ctx = EvaluationContext::new();

    transcript.line(" ")?;
    transcript.line("INFRASTRUCTURE READINESS REPORT (IRR) - Network Tests")?;
    transcript.line(&"=".repeat(53))?;
    transcript.line(&format!("{} : Start Time", timestamp()))?;

    gen_host_lists(&mut ctx, engine, probe, targets, force, transcript)?;
    estimate_test_duration(&ctx, transcript)?;
    run_latency_tests(&mut ctx, engine, transcript)?;
    run_throughput_tests(&mut ctx, engine, transcript)?;

    let with_targets = !targets.is_empty();
    for line in results::latency_results_table(&ctx, engine, with_targets)? {
        transcript.line(&line)?;
    }
    for line in results::throughput_results_table(&ctx, engine, with_targets)? {
        transcript.line(&line)?;
    }
    for line in results::inactive_hosts_table(&ctx.inactive_hosts) {
        transcript.line(&line)?;
    }

    transcript.line(&format!("{} : End Time", timestamp()))?;
    transcript.line(" ")?;
    Ok(ctx)
}

pub fn network(network: &Network) -> Result<()> {
    let targets = network
        .tgtlist
        .as_deref()
        .map(split_names)
        .unwrap_or_default();
    let log_file = match &network.logfile {
        Some(name) => name.clone(),
        None => timestamped_file_name("network_test", &Local::now(), "log"),
    };
    let mut engine = ReplayEngine::open(&network.engine)?;
    debug!("Using engine {}", engine.name());

    #[cfg(unix)]
    crate::interrupt::install()?;

    let mut transcript = Transcript::create(&PathBuf::from(&log_file))?;
    run_network_tests(&mut engine, &PingProbe, &targets, network.force, &mut transcript)?;
    transcript.line(&format!("Logfile : {} generated for this run", log_file))?;
    transcript.flush()?;
    info!("Network tests complete");
    Ok(())
}
