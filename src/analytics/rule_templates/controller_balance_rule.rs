use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use crate::data::guest::ControllerCounts;
use anyhow::Result;

/// Disks must be spread evenly over the four SCSI controllers. Controller 0
/// also carries the system disk, which is left out of the count.
pub struct ControllerBalanceRule {
    pub name: &'static str,
    pub key: &'static str,
}

pub fn controller_balance(counts: &ControllerCounts) -> Verdict {
    let reference = counts.0[0] as i64 - 1;
    for count in counts.0.iter().skip(1) {
        if *count as i64 != reference {
            return Verdict::Fail;
        }
    }
    Verdict::Pass
}

impl Evaluate for ControllerBalanceRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let Some(guest) = subject.guest() else {
            return Ok(());
        };
        let policy = ctx.settings.get(self.key)?;
        let counts = ControllerCounts::from_devices(&guest.devices);
        sink.emit(ComplianceRow::new(
            subject.label(self.name),
            counts.describe(),
            policy.to_string(),
            controller_balance(&counts),
        ))
    }
}
