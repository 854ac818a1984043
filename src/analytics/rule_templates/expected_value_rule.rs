use crate::analytics::rule_templates::FactReader;
use crate::analytics::{ComplianceRow, Evaluate, RowSink, RuleContext, Subject, Verdict};
use anyhow::Result;
use std::fmt;
use std::fmt::Formatter;

/// Checks a fact against an expected value from the catalog. A missing fact is
/// left for the operator to verify.
pub struct ExpectedValueRule {
    pub name: &'static str,
    pub key: &'static str,
    pub value: FactReader<String>,
    pub ignore_case: bool,
}

macro_rules! expected_value {
    {
        name: $name:literal,
        key: $key:literal,
        value: $value:expr,
        ignore_case: $ignore_case:literal,
    } => {
        ComplianceRule::ExpectedValueRule(ExpectedValueRule {
            name: $name,
            key: $key,
            value: $value,
            ignore_case: $ignore_case,
        })
    };
    {
        name: $name:literal,
        key: $key:literal,
        value: $value:expr,
    } => {
        ComplianceRule::ExpectedValueRule(ExpectedValueRule {
            name: $name,
            key: $key,
            value: $value,
            ignore_case: false,
        })
    };
}

pub(crate) use expected_value;

impl fmt::Display for ExpectedValueRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExpectedValueRule {} <checking if the value is the expected value of {}>",
            self.name, self.key
        )
    }
}

pub fn matches_expected(current: &str, expected: &str, ignore_case: bool) -> Verdict {
    let (current, expected) = (current.trim(), expected.trim());
    if ignore_case {
        Verdict::from_bool(current.eq_ignore_ascii_case(expected))
    } else {
        Verdict::from_bool(current == expected)
    }
}

impl Evaluate for ExpectedValueRule {
    fn evaluate(&self, ctx: &RuleContext, subject: &Subject, sink: &mut dyn RowSink) -> Result<()> {
        let expected = ctx.settings.get(self.key)?;
        let label = subject.label(self.name);
        match (self.value)(subject) {
            Some(current) => {
                let verdict = matches_expected(&current, expected, self.ignore_case);
                sink.emit(ComplianceRow::new(label, current, expected.to_string(), verdict))
            }
            None => sink.emit(ComplianceRow::manual(label, expected.to_string())),
        }
    }
}
