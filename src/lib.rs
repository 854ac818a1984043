#[macro_use]
extern crate lazy_static;

pub mod analytics;
pub mod check;
pub mod completions;
pub mod data;
#[cfg(unix)]
pub mod interrupt;
pub mod network;
pub mod report;
pub mod settings;
pub mod summary;
pub mod utils;

use thiserror::Error;

/// Marker substituted for a current value the engine could not read.
pub const VERIFY_MANUALLY: &str = "Verify Manually";

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Error, Debug)]
pub enum IRRError {
    #[error("Could not connect to {0}")]
    ConnectionError(String),

    #[error("Disk Type not valid! {0} << (expected ssd | non_ssd)")]
    InvalidDiskType(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Virtual Machine {0} was not found in the inventory")]
    TargetNotFound(String),

    #[error("ESXi host {0} was not found in the inventory")]
    HostNotFound(String),

    #[error("Problem connecting to Virtual Machine. {0} is likely powered off or suspended")]
    TargetNotPoweredOn(String),

    #[error("Unknown recommended setting key {0}")]
    UnknownSettingKey(String),

    #[error("Recommended setting {key} has an invalid value {value:?}")]
    InvalidSettingValue { key: String, value: String },

    #[error("A job failed in the Delphix Engine: {0}")]
    RemoteJobFailure(String),

    #[error("Run interrupted by the operator")]
    Interrupted,

    #[error("Invalid verbose option")]
    InvalidVerboseOption,
}

impl IRRError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            IRRError::ConnectionError(_) => 2,
            IRRError::InvalidDiskType(_)
            | IRRError::InvalidArgument(_)
            | IRRError::UnknownSettingKey(_)
            | IRRError::InvalidSettingValue { .. }
            | IRRError::InvalidVerboseOption => 3,
            IRRError::TargetNotFound(_)
            | IRRError::HostNotFound(_)
            | IRRError::TargetNotPoweredOn(_) => 4,
            IRRError::Interrupted => 5,
            IRRError::RemoteJobFailure(_) => 1,
        }
    }
}

/// Exit code for any error surfaced by a subcommand.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<IRRError>() {
        Some(e) => e.exit_code(),
        None => 1,
    }
}
