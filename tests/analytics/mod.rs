pub mod test_helpers;

mod test_compliance_engine;
mod test_rule_templates;
