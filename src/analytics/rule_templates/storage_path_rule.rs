use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use crate::data::host::StoragePath;
use anyhow::Result;

/// One row per disk for the multipath policy of the datastore it lives on.
/// NAS datastores only expose a host-wide list, so their rows are labelled
/// as such.
pub struct StoragePathRule {
    pub name: &'static str,
    pub key: &'static str,
}

pub fn storage_path_verdict(path: &StoragePath, expected: &str) -> Verdict {
    match path {
        StoragePath::Block {
            policy: Some(policy),
            ..
        } => Verdict::from_bool(policy == expected),
        StoragePath::Nas { host_policies } if !host_policies.is_empty() => {
            Verdict::from_bool(host_policies.iter().all(|p| p == expected))
        }
        _ => Verdict::Manual,
    }
}

impl Evaluate for StoragePathRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let Some(guest) = subject.guest() else {
            return Ok(());
        };
        let expected = ctx.settings.get(self.key)?;

        for guest_disk in &guest.disks {
            let what = format!("{} [{}]", self.name, guest_disk.disk.label);
            let verdict = storage_path_verdict(&guest_disk.storage_path, expected);
            let row = match &guest_disk.storage_path {
                StoragePath::Block {
                    policy: Some(policy),
                    ..
                } => ComplianceRow::new(subject.label(&what), policy.clone(), expected.to_string(), verdict),
                StoragePath::Nas { host_policies } => {
                    let label = subject.label(&format!("{} (NAS)", what));
                    let current = if host_policies.is_empty() {
                        format!("NAS host-wide: {}", crate::VERIFY_MANUALLY)
                    } else {
                        format!("NAS host-wide: {}", host_policies.join(", "))
                    };
                    ComplianceRow::new(label, current, expected.to_string(), verdict)
                }
                _ => ComplianceRow::manual(subject.label(&what), expected.to_string()),
            };
            sink.emit(row)?;
        }
        Ok(())
    }
}
