use log::debug;
use std::process::Command;

/// Whether the local machine can reach a host before tests are submitted.
pub trait Reachability {
    fn is_reachable(&self, address: &str) -> bool;
}

/// One ICMP echo through the platform `ping` command.
pub struct PingProbe;

impl Reachability for PingProbe {
    #[cfg(not(target_os = "windows"))]
    fn is_reachable(&self, address: &str) -> bool {
        let status = Command::new("ping")
            .args(["-c", "1", address])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
        debug!("ping {}: {:?}", address, status);
        matches!(status, Ok(s) if s.success())
    }

    #[cfg(target_os = "windows")]
    fn is_reachable(&self, address: &str) -> bool {
        // Windows ping exits 0 on "Destination host unreachable"; look for a reply.
        match Command::new("ping").args([address, "-n", "1"]).output() {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
                debug!("ping {}: {}", address, stdout);
                stdout.contains("reply from") && !stdout.contains("unreachable")
            }
            Err(_) => false,
        }
    }
}
