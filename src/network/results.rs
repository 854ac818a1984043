use crate::network::context::{
    EvaluationContext, InactiveHost, JobKind, LatencyResult, ThroughputResult,
};
use crate::network::engine::NetworkTestEngine;
use anyhow::Result;

const BYTES_PER_GIB: f64 = 1073741824.0;
const BYTES_PER_MIB: f64 = 1048576.0;

pub fn banner() -> String {
    "=".repeat(103)
}

/// Averages above 100 usec are shown in msec.
pub fn format_latency(average_usec: f64) -> String {
    if average_usec > 100.0 {
        format!("{:.3} msec", average_usec / 1000.0)
    } else {
        format!("{:.3} usec", average_usec)
    }
}

pub fn format_throughput(bps: f64) -> String {
    if bps > 0.0 {
        if bps / BYTES_PER_GIB > 0.975 {
            format!("{:.2} Gbps", bps / BYTES_PER_GIB)
        } else {
            format!("{:.2} Mbps", bps / BYTES_PER_MIB)
        }
    } else {
        format!("{} bps", bps)
    }
}

/// Newest result per remote address.
pub fn latest_latency(mut results: Vec<LatencyResult>) -> Vec<LatencyResult> {
    results.sort_by(|a, b| {
        (&b.remote_address, b.end_time).cmp(&(&a.remote_address, a.end_time))
    });
    results.dedup_by(|next, kept| next.remote_address == kept.remote_address);
    results
}

/// Newest result per remote address and direction. Directions sort by name,
/// descending, so TRANSMIT is listed before RECEIVE.
pub fn latest_throughput(mut results: Vec<ThroughputResult>) -> Vec<ThroughputResult> {
    results.sort_by(|a, b| {
        (&b.remote_address, b.direction.to_string(), b.end_time).cmp(&(
            &a.remote_address,
            a.direction.to_string(),
            a.end_time,
        ))
    });
    results.dedup_by(|next, kept| {
        next.remote_address == kept.remote_address && next.direction == kept.direction
    });
    results
}

fn latency_line(name: &str, address: &str, status: &str, average: &str) -> String {
    format!("{:55} {:15} {:<15} {:>13}", name, address, status, average)
}

fn throughput_line(name: &str, direction: &str, status: &str, average: &str) -> String {
    format!("{:55} {:15} {:<15} {:>15}", name, direction, status, average)
}

/// Latency results of this run. With a target list, the jobs just submitted are
/// looked up; otherwise the latest result per address is taken from the
/// engine's history. Empty when no latency job ran.
pub fn latency_results_table(
    ctx: &EvaluationContext,
    engine: &dyn NetworkTestEngine,
    with_targets: bool,
) -> Result<Vec<String>> {
    if ctx.job_count(JobKind::Latency) == 0 {
        return Ok(Vec::new());
    }
    let mut lines = vec![
        String::new(),
        banner(),
        "List of latest Network Latency Test Results <<<".to_string(),
        banner(),
        latency_line("Latency Test Name", "Remote Address", "Status", "Avg. Latency"),
        latency_line(&"-".repeat(55), &"-".repeat(15), &"-".repeat(15), &"-".repeat(13)),
    ];

    let results = if with_targets {
        ctx.jobs_of(JobKind::Latency)
            .map(|job| engine.latency_result(&job.job_ref))
            .collect::<Result<Vec<_>>>()?
    } else {
        latest_latency(engine.latency_results()?)
    };
    for result in &results {
        lines.push(latency_line(
            &result.name,
            &result.remote_address,
            &result.state,
            &format_latency(result.average_usec),
        ));
    }
    for error in ctx.errors_of(JobKind::Latency) {
        lines.push(latency_line(
            &format!("{}({})", error.host_name, error.host_address),
            &error.host_address,
            error.status.label(),
            "-",
        ));
    }
    Ok(lines)
}

pub fn throughput_results_table(
    ctx: &EvaluationContext,
    engine: &dyn NetworkTestEngine,
    with_targets: bool,
) -> Result<Vec<String>> {
    if ctx.job_count(JobKind::Throughput) == 0 {
        return Ok(Vec::new());
    }
    let mut lines = vec![
        String::new(),
        banner(),
        "# >>> List of latest Network Throughput Test Results <<<".to_string(),
        banner(),
        throughput_line("Throughput Test Name", "Direction", "Status", "Avg. Throughput"),
        throughput_line(&"-".repeat(55), &"-".repeat(15), &"-".repeat(15), &"-".repeat(15)),
    ];

    let results = if with_targets {
        ctx.jobs_of(JobKind::Throughput)
            .map(|job| engine.throughput_result(&job.job_ref))
            .collect::<Result<Vec<_>>>()?
    } else {
        latest_throughput(engine.throughput_results()?)
    };
    for result in &results {
        lines.push(throughput_line(
            &result.name,
            &result.direction.to_string(),
            &result.state,
            &format_throughput(result.throughput_bps),
        ));
    }
    for error in ctx.errors_of(JobKind::Throughput) {
        lines.push(throughput_line(
            &format!("{}({})", error.host_name, error.host_address),
            error.direction.as_deref().unwrap_or("-"),
            error.status.label(),
            "-",
        ));
    }
    Ok(lines)
}

/// Hosts the ping probe could not reach. Empty when every host answered.
pub fn inactive_hosts_table(hosts: &[InactiveHost]) -> Vec<String> {
    if hosts.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![
        String::new(),
        banner(),
        "List of Hosts/Environments (Unable to ping from localhost) ".to_string(),
        banner(),
        format!("{:25} {:25}", "Host Name", "IP Address"),
        format!("{:25} {:25}", "-".repeat(25), "-".repeat(25)),
    ];
    for host in hosts {
        lines.push(format!("{:25} {:25}", host.name, host.address));
    }
    lines.push(String::new());
    lines
}
