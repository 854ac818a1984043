use crate::analytics::rule_templates::FactReader;
use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use anyhow::Result;

/// Passes when a numeric fact is at least the recommended value.
pub struct MinimumValueRule {
    pub name: &'static str,
    pub key: &'static str,
    pub value: FactReader<f64>,
    /// Appended to both values when rendered, e.g. "GB".
    pub unit: &'static str,
}

macro_rules! minimum_value {
    {
        name: $name:literal,
        key: $key:literal,
        value: $value:expr,
        unit: $unit:literal,
    } => {
        ComplianceRule::MinimumValueRule(MinimumValueRule {
            name: $name,
            key: $key,
            value: $value,
            unit: $unit,
        })
    };
    {
        name: $name:literal,
        key: $key:literal,
        value: $value:expr,
    } => {
        ComplianceRule::MinimumValueRule(MinimumValueRule {
            name: $name,
            key: $key,
            value: $value,
            unit: "",
        })
    };
}

pub(crate) use minimum_value;

pub fn at_least(current: f64, recommended: f64) -> Verdict {
    Verdict::from_bool(current >= recommended)
}

fn with_unit(value: String, unit: &str) -> String {
    if unit.is_empty() {
        value
    } else {
        format!("{} {}", value, unit)
    }
}

impl Evaluate for MinimumValueRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let recommended = ctx.settings.get_number(self.key)?;
        let recommended_str = with_unit(ctx.settings.get(self.key)?.to_string(), self.unit);
        let label = subject.label(self.name);
        match (self.value)(subject) {
            Some(current) => sink.emit(ComplianceRow::new(
                label,
                with_unit(current.to_string(), self.unit),
                recommended_str,
                at_least(current, recommended),
            )),
            None => sink.emit(ComplianceRow::manual(label, recommended_str)),
        }
    }
}
