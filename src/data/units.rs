use serde::{Deserialize, Serialize};
use std::fmt;

const KB_PER_GB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Mhz,
    MB,
    GB,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Mhz => write!(f, "Mhz"),
            Unit::MB => write!(f, "MB"),
            Unit::GB => write!(f, "GB"),
        }
    }
}

/// Memory units a raw inventory field may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUnit {
    Bytes,
    KB,
    MB,
}

impl MemoryUnit {
    pub fn to_gb(self, value: f64) -> f64 {
        match self {
            MemoryUnit::Bytes => value / BYTES_PER_GB,
            MemoryUnit::KB => value / KB_PER_GB,
            MemoryUnit::MB => value / 1024.0,
        }
    }
}

/// Nearest whole GB, used for host and guest configured memory.
pub fn whole_gb(value: f64, unit: MemoryUnit) -> u64 {
    unit.to_gb(value).round() as u64
}

/// Nearest 0.1 GB, used for reservations and disk capacities.
pub fn tenth_gb(value: f64, unit: MemoryUnit) -> f64 {
    (unit.to_gb(value) * 10.0).round() / 10.0
}

/// A CPU or memory limit/reservation. `Unset` (nothing configured) is distinct
/// from an explicit zero.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Allocation {
    Unset,
    Zero,
    Value { amount: u64, unit: Unit },
}

impl Allocation {
    /// Limits use -1 for "no limit".
    pub fn from_limit(raw: Option<i64>, unit: Unit) -> Self {
        match raw {
            None => Allocation::Unset,
            Some(v) if v < 0 => Allocation::Unset,
            Some(0) => Allocation::Zero,
            Some(v) => Allocation::Value {
                amount: v as u64,
                unit,
            },
        }
    }

    /// Reservations use 0 for "no reservation".
    pub fn from_reservation(raw: Option<i64>, unit: Unit) -> Self {
        match raw {
            Some(v) if v > 0 => Allocation::Value {
                amount: v as u64,
                unit,
            },
            _ => Allocation::Unset,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Allocation::Unset)
    }

    /// Numeric amount, or None when nothing is configured.
    pub fn amount(&self) -> Option<u64> {
        match self {
            Allocation::Unset => None,
            Allocation::Zero => Some(0),
            Allocation::Value { amount, .. } => Some(*amount),
        }
    }

    /// Amount in GB for memory allocations. Unset counts as zero.
    pub fn as_gb(&self) -> f64 {
        match self {
            Allocation::Unset | Allocation::Zero => 0.0,
            Allocation::Value { amount, unit } => match unit {
                Unit::MB => tenth_gb(*amount as f64, MemoryUnit::MB),
                Unit::GB => *amount as f64,
                Unit::Mhz => 0.0,
            },
        }
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allocation::Unset => write!(f, "None"),
            Allocation::Zero => write!(f, "0"),
            Allocation::Value { amount, unit } => write!(f, "{} {}", amount, unit),
        }
    }
}

/// Render a GB quantity without a trailing ".0" for whole numbers.
pub fn format_gb(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0} GB", value)
    } else {
        format!("{:.1} GB", value)
    }
}
