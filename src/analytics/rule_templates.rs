pub mod controller_balance_rule;
pub mod device_match_rule;
pub mod disk_provision_rule;
pub mod expected_value_rule;
pub mod fact_info_rule;
pub mod headroom_rule;
pub mod minimum_value_rule;
pub mod reservation_rule;
pub mod storage_path_rule;
pub mod version_rule;

/*
   Rule Template Naming Convention

   <Facts Used>_<Behavior>_rule.rs

   - Facts Used: fact, version, value, reservation, headroom, device, controller_balance,
     disk_provision, storage_path
   - Behavior: info, at_least, minimum, expected, match, balance
*/

use crate::analytics::Subject;

/// Reads one fact off a subject. None means the fact is missing.
pub type FactReader<T> = fn(&Subject) -> Option<T>;
