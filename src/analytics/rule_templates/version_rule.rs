use crate::analytics::rule_templates::FactReader;
use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use anyhow::Result;
use std::fmt;
use std::fmt::Formatter;

/// Passes when the current version is at least the recommended one. The
/// comparison is lexical, so "5.10" sorts before "5.5".
pub struct VersionAtLeastRule {
    pub name: &'static str,
    pub key: &'static str,
    pub value: FactReader<String>,
}

macro_rules! version_at_least {
    {
        name: $name:literal,
        key: $key:literal,
        value: $value:expr,
    } => {
        ComplianceRule::VersionAtLeastRule(VersionAtLeastRule {
            name: $name,
            key: $key,
            value: $value,
        })
    };
}

pub(crate) use version_at_least;

impl fmt::Display for VersionAtLeastRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VersionAtLeastRule {} <checking if the version is at least {}>",
            self.name, self.key
        )
    }
}

pub fn version_verdict(current: &str, recommended: &str) -> Verdict {
    Verdict::from_bool(current >= recommended)
}

impl Evaluate for VersionAtLeastRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let recommended = ctx.settings.get(self.key)?;
        let label = subject.label(self.name);
        match (self.value)(subject) {
            Some(current) => {
                let verdict = version_verdict(&current, recommended);
                sink.emit(ComplianceRow::new(label, current, recommended.to_string(), verdict))
            }
            None => sink.emit(ComplianceRow::manual(label, recommended.to_string())),
        }
    }
}
