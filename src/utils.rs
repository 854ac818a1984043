use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Split a comma separated list given on the command line, dropping empty
/// entries and surrounding whitespace.
pub fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// "network_test_10182026_142501.log"
pub fn timestamped_file_name<Tz: TimeZone>(prefix: &str, time: &DateTime<Tz>, extension: &str) -> String
where
    Tz::Offset: Display,
{
    format!("{}_{}.{}", prefix, time.format("%m%d%Y_%H%M%S"), extension)
}

#[cfg(test)]
mod tests {
    use super::{split_names, timestamped_file_name};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("vm1, vm2,,vm3 "), vec!["vm1", "vm2", "vm3"]);
        assert!(split_names(" , ").is_empty());
    }

    #[test]
    fn test_timestamped_file_name() {
        let time = Utc.with_ymd_and_hms(2026, 10, 18, 14, 25, 1).unwrap();
        assert_eq!(
            timestamped_file_name("network_test", &time, "log"),
            "network_test_10182026_142501.log"
        );
    }
}
