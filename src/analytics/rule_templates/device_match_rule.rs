use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use anyhow::Result;

/// One row per network adapter: the recommended driver name must appear in the
/// adapter description.
pub struct NicDriverRule {
    pub name: &'static str,
    pub key: &'static str,
}

/// One row per SCSI controller: the controller type must equal the
/// recommended type.
pub struct ScsiControllerTypeRule {
    pub name: &'static str,
    pub key: &'static str,
}

pub fn nic_matches(description: &str, driver: &str) -> Verdict {
    Verdict::from_bool(description.to_lowercase().contains(&driver.to_lowercase()))
}

pub fn controller_type_matches(controller_type: &str, expected: &str) -> Verdict {
    Verdict::from_bool(controller_type.trim() == expected)
}

impl Evaluate for NicDriverRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let Some(guest) = subject.guest() else {
            return Ok(());
        };
        let driver = ctx.settings.get(self.key)?;
        if guest.devices.network_adapters.is_empty() {
            return sink.emit(ComplianceRow::manual(subject.label(self.name), driver.to_string()));
        }
        for adapter in &guest.devices.network_adapters {
            let description = adapter.description();
            let verdict = nic_matches(&description, driver);
            sink.emit(ComplianceRow::new(
                subject.label(self.name),
                description,
                driver.to_string(),
                verdict,
            ))?;
        }
        Ok(())
    }
}

impl Evaluate for ScsiControllerTypeRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let Some(guest) = subject.guest() else {
            return Ok(());
        };
        let expected = ctx.settings.get(self.key)?;
        if guest.devices.controllers.is_empty() {
            return sink.emit(ComplianceRow::manual(subject.label(self.name), expected.to_string()));
        }
        for controller in &guest.devices.controllers {
            let verdict = controller_type_matches(&controller.controller_type, expected);
            sink.emit(ComplianceRow::new(
                subject.label(&format!("{} [{}]", self.name, controller.label)),
                controller.controller_type.clone(),
                expected.to_string(),
                verdict,
            ))?;
        }
        Ok(())
    }
}
