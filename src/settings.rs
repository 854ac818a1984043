use crate::IRRError;
use anyhow::Result;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{AsRefStr, EnumString};

lazy_static! {
    /// Recommended values shipped with the tool.
    static ref DEFAULT_SETTINGS: Vec<(&'static str, &'static str)> = vec![
        ("esxi_version", "5.5"),
        ("hyperthreading", "false"),
        ("esxi_ha", "enabled"),
        ("esxi_drs", "disabled"),
        ("power_policy", "High Performance"),
        ("minimum_cpu", "8"),
        ("minimum_memory", "64"),
        ("ht_sharing", "none"),
        ("ssd_disk_provision_type", "Thick"),
        ("ssd_disk_provision_format", "Lazy-Zero"),
        ("non_ssd_disk_provision_type", "Thick"),
        ("non_ssd_disk_provision_format", "Eager-Zero"),
        ("disk_controllers", "Distribute VMDKs"),
        ("scsi_controller_type", "LSI Logic"),
        ("vnic", "vmxnet3"),
        ("storage_path_policy", "VMW_PSP_RR"),
        ("host_cpu_headroom_cores", "4"),
        ("host_memory_max_allocation_pct", "90"),
    ];
}

/// Keys whose values are compared numerically.
const NUMERIC_SETTINGS: [&str; 4] = [
    "minimum_cpu",
    "minimum_memory",
    "host_cpu_headroom_cores",
    "host_memory_max_allocation_pct",
];

/// Storage tier selecting which set of disk provisioning recommendations apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DiskTier {
    Ssd,
    NonSsd,
}

impl DiskTier {
    /// Validate a user supplied tier. Anything outside `ssd | non_ssd` is fatal.
    pub fn parse(value: &str) -> Result<Self> {
        DiskTier::from_str(value.trim())
            .map_err(|_| IRRError::InvalidDiskType(value.to_lowercase()).into())
    }

    pub fn provision_type_key(&self) -> String {
        format!("{}_disk_provision_type", self.as_ref())
    }

    pub fn provision_format_key(&self) -> String {
        format!("{}_disk_provision_format", self.as_ref())
    }
}

#[derive(Deserialize, Debug)]
struct SettingsFile {
    dx_settings: HashMap<String, serde_yaml::Value>,
}

/// Immutable catalog of recommended values, keyed by rule.
#[derive(Debug, Clone)]
pub struct RecommendedSettings {
    values: IndexMap<String, String>,
}

impl Default for RecommendedSettings {
    fn default() -> Self {
        RecommendedSettings {
            values: DEFAULT_SETTINGS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl RecommendedSettings {
    /// Build the catalog from the shipped defaults, overriding keys from a YAML
    /// file of the form `dx_settings: { key: value, ... }`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| IRRError::InvalidArgument(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let file: SettingsFile = serde_yaml::from_str(contents)?;
        let mut settings = RecommendedSettings::default();
        for (key, value) in file.dx_settings {
            let key = key.to_lowercase();
            if !settings.values.contains_key(&key) {
                return Err(IRRError::UnknownSettingKey(key).into());
            }
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(IRRError::InvalidSettingValue {
                        key,
                        value: format!("{:?}", other),
                    }
                    .into())
                }
            };
            debug!("Overriding recommended setting {} = {}", key, value);
            settings.values.insert(key, value);
        }
        for key in NUMERIC_SETTINGS {
            settings.get_number(key)?;
        }
        Ok(settings)
    }

    pub fn get(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(|v| v.as_str())
            .ok_or_else(|| IRRError::UnknownSettingKey(key.to_string()).into())
    }

    pub fn get_number(&self, key: &str) -> Result<f64> {
        let value = self.get(key)?;
        value.trim().parse::<f64>().map_err(|_| {
            IRRError::InvalidSettingValue {
                key: key.to_string(),
                value: value.to_string(),
            }
            .into()
        })
    }

    pub fn disk_provision_type(&self, tier: DiskTier) -> Result<&str> {
        self.get(&tier.provision_type_key())
    }

    pub fn disk_provision_format(&self, tier: DiskTier) -> Result<&str> {
        self.get(&tier.provision_format_key())
    }
}
