use crate::analytics::rule_templates::FactReader;
use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject};
use anyhow::Result;

/// Reports a fact without grading it.
pub struct FactInfoRule {
    pub name: &'static str,
    pub value: FactReader<String>,
}

macro_rules! fact_info {
    {
        name: $name:literal,
        value: $value:expr,
    } => {
        ComplianceRule::FactInfoRule(FactInfoRule {
            name: $name,
            value: $value,
        })
    };
}

pub(crate) use fact_info;

impl Evaluate for FactInfoRule {
    fn evaluate(&self, _ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let label = subject.label(self.name);
        match (self.value)(subject) {
            Some(value) => sink.emit(ComplianceRow::info(label, value)),
            None => sink.emit(ComplianceRow::manual(label, crate::NOT_AVAILABLE.to_string())),
        }
    }
}
