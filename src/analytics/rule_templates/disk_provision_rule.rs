use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use crate::data::device::{Disk, Provisioning};
use crate::data::units::format_gb;
use anyhow::Result;
use serde::{Deserialize, Serialize};

const THICK: &str = "Thick";
const EAGER_ZERO: &str = "Eager-Zero";
const LAZY_ZERO: &str = "Lazy-Zero";

/// How strictly disk provisioning is graded.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProvisionCheck {
    /// Grade on the provisioning type alone.
    #[default]
    TypeOnly,
    /// Also require the eager/lazy zeroing format of the tier. Superseded by
    /// TypeOnly, kept for operators who still want it.
    TypeAndFormat,
}

/// One row per disk, graded against the provisioning recommended for the
/// selected disk tier.
pub struct DiskProvisionRule {
    pub name: &'static str,
    pub check: ProvisionCheck,
}

pub fn provision_verdict(
    provisioning: Option<Provisioning>,
    expected_type: &str,
    expected_format: &str,
    check: ProvisionCheck,
) -> Verdict {
    let Some(provisioning) = provisioning else {
        return Verdict::Manual;
    };
    let type_ok = provisioning.is_thick() && expected_type.eq_ignore_ascii_case(THICK);
    match check {
        ProvisionCheck::TypeOnly => Verdict::from_bool(type_ok),
        ProvisionCheck::TypeAndFormat => {
            let format_ok = match provisioning.eager_zero() {
                Some(true) => expected_format.eq_ignore_ascii_case(EAGER_ZERO),
                Some(false) => expected_format.eq_ignore_ascii_case(LAZY_ZERO),
                None => false,
            };
            Verdict::from_bool(type_ok && format_ok)
        }
    }
}

/// "Thick Prov:true , EagerZero:true , Ctrl: 0:1, Size: 8 GB"
fn describe(disk: &Disk) -> Option<String> {
    let provisioning = disk.provisioning?;
    let eager_zero = provisioning
        .eager_zero()
        .map(|e| e.to_string())
        .unwrap_or_else(|| crate::NOT_AVAILABLE.to_string());
    Some(format!(
        "Thick Prov:{} , EagerZero:{} , Ctrl: {}, Size: {}",
        provisioning.is_thick(),
        eager_zero,
        disk.controller_unit().unwrap_or_else(|| "?".to_string()),
        disk.capacity_gb
            .map(format_gb)
            .unwrap_or_else(|| crate::NOT_AVAILABLE.to_string()),
    ))
}

impl Evaluate for DiskProvisionRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let Some(guest) = subject.guest() else {
            return Ok(());
        };
        let expected_type = ctx.settings.disk_provision_type(ctx.disk_tier)?;
        let expected_format = ctx.settings.disk_provision_format(ctx.disk_tier)?;
        let recommended = match self.check {
            ProvisionCheck::TypeOnly => expected_type.to_string(),
            ProvisionCheck::TypeAndFormat => format!("{} {}", expected_type, expected_format),
        };

        for guest_disk in &guest.disks {
            let disk = &guest_disk.disk;
            let label = subject.label(&format!("{} [{}]", self.name, disk.label));
            match describe(disk) {
                Some(current) => sink.emit(ComplianceRow::new(
                    label,
                    current,
                    recommended.clone(),
                    provision_verdict(disk.provisioning, expected_type, expected_format, self.check),
                ))?,
                None => sink.emit(ComplianceRow::manual(label, recommended.clone()))?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{provision_verdict, ProvisionCheck};
    use crate::analytics::Verdict;
    use crate::data::device::Provisioning;

    #[test]
    fn test_thick_disk_type_only() {
        let thick = Provisioning::from_backing(Some(false), Some(false));
        assert_eq!(
            provision_verdict(thick, "Thick", "Eager-Zero", ProvisionCheck::TypeOnly),
            Verdict::Pass
        );
        let thin = Provisioning::from_backing(Some(true), None);
        assert_eq!(
            provision_verdict(thin, "Thick", "Eager-Zero", ProvisionCheck::TypeOnly),
            Verdict::Fail
        );
        assert_eq!(
            provision_verdict(None, "Thick", "Eager-Zero", ProvisionCheck::TypeOnly),
            Verdict::Manual
        );
    }

    #[test]
    fn test_strict_format_sees_eager_zero() {
        // Thick disks always report eager-zero, so a lazy-zero tier never passes.
        let thick = Provisioning::from_backing(Some(false), Some(false));
        assert_eq!(
            provision_verdict(thick, "Thick", "Lazy-Zero", ProvisionCheck::TypeAndFormat),
            Verdict::Fail
        );
        assert_eq!(
            provision_verdict(thick, "Thick", "Eager-Zero", ProvisionCheck::TypeAndFormat),
            Verdict::Pass
        );
    }
}
