//! Configuration types for the trigger wizard.
//!
//! `WizardConfig` represents an optional `rvtrigger.toml` describing the
//! debug target (register width) and the trigger collection limits.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub collection: CollectionConfig,
}

/// Debug target description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Register width used when encoding `tdata1`.
    #[serde(default)]
    pub xlen: Xlen,
}

/// Limits applied by the trigger collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Number of hardware trigger slots. `None` or `0` means unlimited.
    #[serde(default)]
    pub max_triggers: Option<usize>,
}

impl CollectionConfig {
    /// Effective capacity, treating `0` as unlimited.
    pub fn capacity(&self) -> Option<usize> {
        self.max_triggers.filter(|max| *max > 0)
    }
}

/// Register width of the target hart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Xlen {
    #[default]
    Rv32,
    Rv64,
}

impl Xlen {
    pub fn bits(&self) -> u32 {
        match self {
            Xlen::Rv32 => 32,
            Xlen::Rv64 => 64,
        }
    }
}

impl fmt::Display for Xlen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rv{}", self.bits())
    }
}

impl TryFrom<u8> for Xlen {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            32 => Ok(Xlen::Rv32),
            64 => Ok(Xlen::Rv64),
            other => Err(format!("unsupported xlen {other}, expected 32 or 64")),
        }
    }
}

impl From<Xlen> for u8 {
    fn from(value: Xlen) -> Self {
        match value {
            Xlen::Rv32 => 32,
            Xlen::Rv64 => 64,
        }
    }
}
