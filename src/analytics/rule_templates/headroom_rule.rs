use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use anyhow::Result;

/// Cores left over once every powered-on guest's vCPUs are counted against the
/// host.
pub struct CpuHeadroomRule {
    pub name: &'static str,
    pub key: &'static str,
}

/// Share of host memory configured across powered-on guests.
pub struct MemoryAllocationRule {
    pub name: &'static str,
    pub key: &'static str,
}

/// Negative headroom (an over-committed host) fails like any shortfall.
pub fn cpu_headroom_verdict(free_cores: Option<i64>, minimum: f64) -> Verdict {
    match free_cores {
        Some(free) => Verdict::from_bool(free as f64 >= minimum),
        None => Verdict::Manual,
    }
}

pub fn memory_allocation_verdict(allocated_pct: Option<f64>, maximum: f64) -> Verdict {
    match allocated_pct {
        Some(pct) => Verdict::from_bool(pct <= maximum),
        None => Verdict::Manual,
    }
}

impl Evaluate for CpuHeadroomRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let minimum = ctx.settings.get_number(self.key)?;
        let recommended = format!(">= {} cores unallocated", minimum);
        let label = subject.label(self.name);
        let free_cores = subject.host().unallocated_cores();
        match free_cores {
            Some(free) => sink.emit(ComplianceRow::new(
                label,
                format!("{} cores unallocated", free),
                recommended,
                cpu_headroom_verdict(free_cores, minimum),
            )),
            None => sink.emit(ComplianceRow::manual(label, recommended)),
        }
    }
}

impl Evaluate for MemoryAllocationRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let maximum = ctx.settings.get_number(self.key)?;
        let recommended = format!("<= {}% allocated", maximum);
        let label = subject.label(self.name);
        let allocated_pct = subject.host().memory_allocation_pct();
        match allocated_pct {
            Some(pct) => sink.emit(ComplianceRow::new(
                label,
                format!("{:.1}% allocated", pct),
                recommended,
                memory_allocation_verdict(allocated_pct, maximum),
            )),
            None => sink.emit(ComplianceRow::manual(label, recommended)),
        }
    }
}
