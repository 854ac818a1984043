use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use crate::data::units::{format_gb, Allocation, Unit};
use anyhow::Result;

/// The guest's CPU reservation must cover every vCPU at the host's per-core
/// clock. An unset reservation always fails.
pub struct CpuReservationRule {
    pub name: &'static str,
}

/// The guest's memory reservation must cover its configured memory. An unset
/// reservation counts as zero.
pub struct MemoryReservationRule {
    pub name: &'static str,
}

pub fn required_cpu_mhz(host_mhz: Option<u64>, vcpus: Option<u32>) -> Option<u64> {
    Some(host_mhz? * vcpus? as u64)
}

pub fn cpu_reservation_verdict(reservation: &Allocation, host_mhz: Option<u64>, vcpus: Option<u32>) -> Verdict {
    if reservation.is_unset() {
        return Verdict::Fail;
    }
    match (reservation.amount(), required_cpu_mhz(host_mhz, vcpus)) {
        (Some(amount), Some(required)) => Verdict::from_bool(amount >= required),
        _ => Verdict::Manual,
    }
}

pub fn memory_reservation_verdict(reservation: &Allocation, memory_gb: Option<u64>) -> Verdict {
    match memory_gb {
        Some(memory_gb) => Verdict::from_bool(reservation.as_gb() >= memory_gb as f64),
        None => Verdict::Manual,
    }
}

impl Evaluate for CpuReservationRule {
    fn evaluate(&self, _ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let Some(guest) = subject.guest() else {
            return Ok(());
        };
        let host = subject.host();
        let label = subject.label(self.name);
        let recommended = match required_cpu_mhz(host.cpu_mhz, guest.vcpus) {
            Some(mhz) => format!("{} {}", mhz, Unit::Mhz),
            None => crate::VERIFY_MANUALLY.to_string(),
        };
        let verdict = cpu_reservation_verdict(&guest.cpu_reservation, host.cpu_mhz, guest.vcpus);
        sink.emit(ComplianceRow::new(
            label,
            guest.cpu_reservation.to_string(),
            recommended,
            verdict,
        ))
    }
}

impl Evaluate for MemoryReservationRule {
    fn evaluate(&self, _ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let Some(guest) = subject.guest() else {
            return Ok(());
        };
        let label = subject.label(self.name);
        let Some(memory_gb) = guest.memory_gb else {
            return sink.emit(ComplianceRow::manual(label, crate::NOT_AVAILABLE.to_string()));
        };
        let current = match guest.memory_reservation {
            Allocation::Unset => guest.memory_reservation.to_string(),
            _ => format_gb(guest.memory_reservation.as_gb()),
        };
        sink.emit(ComplianceRow::new(
            label,
            current,
            format_gb(memory_gb as f64),
            memory_reservation_verdict(&guest.memory_reservation, Some(memory_gb)),
        ))
    }
}
