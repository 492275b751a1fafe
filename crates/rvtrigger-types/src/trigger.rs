use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::SecondaryDataError;

/// Unique identifier for a trigger, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TriggerId(pub Uuid);

impl TriggerId {
    /// Create a new TriggerId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a TriggerId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TriggerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TriggerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Trigger kinds defined by the RISC-V debug module.
///
/// Only `mcontrol` and `icount` can be configured; `itrigger` and
/// `etrigger` are reserved and rejected by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    MControl,
    ICount,
    ITrigger,
    ETrigger,
}

impl TriggerKind {
    /// Whether the wizard has a parameter step for this kind.
    pub fn is_supported(&self) -> bool {
        matches!(self, TriggerKind::MControl | TriggerKind::ICount)
    }

    /// Value of the `type` field in `tdata1` for this kind.
    pub fn tdata1_type(&self) -> u8 {
        match self {
            TriggerKind::MControl => 2,
            TriggerKind::ICount => 3,
            TriggerKind::ITrigger => 4,
            TriggerKind::ETrigger => 5,
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::MControl => write!(f, "mcontrol"),
            TriggerKind::ICount => write!(f, "icount"),
            TriggerKind::ITrigger => write!(f, "itrigger"),
            TriggerKind::ETrigger => write!(f, "etrigger"),
        }
    }
}

impl FromStr for TriggerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mcontrol" => Ok(TriggerKind::MControl),
            "icount" => Ok(TriggerKind::ICount),
            "itrigger" => Ok(TriggerKind::ITrigger),
            "etrigger" => Ok(TriggerKind::ETrigger),
            other => Err(format!("invalid trigger kind: '{other}'")),
        }
    }
}

/// Memory access an `mcontrol` trigger matches on.
///
/// The access type also fixes the leading byte of the secondary data
/// (`tdata2`) value, see [`AccessType::required_prefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Execute,
    Store,
    Load,
}

impl AccessType {
    /// Prefix the normalized secondary data must start with.
    pub fn required_prefix(&self) -> &'static str {
        match self {
            AccessType::Execute => "0x80",
            AccessType::Store => "0x40",
            AccessType::Load => "0x00",
        }
    }

    /// A well-formed secondary data value for this access type.
    pub fn example_value(&self) -> &'static str {
        match self {
            AccessType::Execute => "0x80000004",
            AccessType::Store => "0x40000004",
            AccessType::Load => "0x00000004",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Execute => write!(f, "execute"),
            AccessType::Store => write!(f, "store"),
            AccessType::Load => write!(f, "load"),
        }
    }
}

impl FromStr for AccessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "execute" => Ok(AccessType::Execute),
            "store" => Ok(AccessType::Store),
            "load" => Ok(AccessType::Load),
            other => Err(format!("invalid access type: '{other}'")),
        }
    }
}

/// Privilege levels under which a trigger is armed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PrivilegeModes {
    pub machine: bool,
    pub supervisor: bool,
    pub user: bool,
}

impl PrivilegeModes {
    pub fn any(&self) -> bool {
        self.machine || self.supervisor || self.user
    }

    /// Compact label such as `MSU`, `M-U` or `---`.
    pub fn label(&self) -> String {
        [
            (self.machine, 'M'),
            (self.supervisor, 'S'),
            (self.user, 'U'),
        ]
        .iter()
        .map(|(on, c)| if *on { *c } else { '-' })
        .collect()
    }
}

/// Control block of an address/data match trigger (`tdata1`, type 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MControlBlock {
    pub dmode: bool,
    /// Width of the largest naturally aligned address mask (log2).
    pub maskmax: u8,
    /// Set by hardware when the trigger fires; preserved across edits.
    #[serde(default)]
    pub hit: bool,
    /// Compare against data instead of address.
    pub select: bool,
    /// Fire after the instruction instead of before it.
    pub timing: bool,
    pub sizelo: u8,
    pub sizehi: u8,
    pub action: u8,
    #[serde(rename = "match")]
    pub match_mode: u8,
    pub chain: bool,
    pub modes: PrivilegeModes,
    pub access: AccessType,
}

/// Control block of an instruction count trigger (`tdata1`, type 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ICountBlock {
    pub dmode: bool,
    #[serde(default)]
    pub hit: bool,
    pub action: u8,
    /// Instructions to retire before firing. Always at least 1.
    pub count: u32,
    pub modes: PrivilegeModes,
}

/// Kind-discriminated control block.
///
/// The trigger kind is derived from the variant, so a descriptor can never
/// carry a block that disagrees with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TriggerControl {
    MControl(MControlBlock),
    ICount(ICountBlock),
}

impl TriggerControl {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerControl::MControl(_) => TriggerKind::MControl,
            TriggerControl::ICount(_) => TriggerKind::ICount,
        }
    }

    pub fn modes(&self) -> &PrivilegeModes {
        match self {
            TriggerControl::MControl(block) => &block.modes,
            TriggerControl::ICount(block) => &block.modes,
        }
    }

    pub fn dmode(&self) -> bool {
        match self {
            TriggerControl::MControl(block) => block.dmode,
            TriggerControl::ICount(block) => block.dmode,
        }
    }

    pub fn action(&self) -> u8 {
        match self {
            TriggerControl::MControl(block) => block.action,
            TriggerControl::ICount(block) => block.action,
        }
    }

    pub fn hit(&self) -> bool {
        match self {
            TriggerControl::MControl(block) => block.hit,
            TriggerControl::ICount(block) => block.hit,
        }
    }
}

/// Normalized secondary data (`tdata2`) value.
///
/// Always `0x` followed by 1-8 lowercase hex digits. Construct with
/// [`SecondaryData::parse`]; deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecondaryData(String);

impl SecondaryData {
    /// Maximum number of hex digits after the `0x` prefix.
    pub const MAX_DIGITS: usize = 8;

    /// Parse and normalize a hex value. Accepts `0x`/`0X` and any case.
    pub fn parse(raw: &str) -> Result<Self, SecondaryDataError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SecondaryDataError::Empty);
        }

        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| SecondaryDataError::MissingPrefix(trimmed.to_string()))?;

        if digits.is_empty() || digits.len() > Self::MAX_DIGITS {
            return Err(SecondaryDataError::DigitCount(trimmed.to_string()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SecondaryDataError::NotHex(trimmed.to_string()));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the hex digits.
    pub fn value(&self) -> u32 {
        // parse() guarantees at most 8 hex digits
        u32::from_str_radix(&self.0[2..], 16).unwrap_or_default()
    }
}

impl fmt::Display for SecondaryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SecondaryData {
    type Error = SecondaryDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SecondaryData> for String {
    fn from(value: SecondaryData) -> Self {
        value.0
    }
}

/// A committed trigger, as handed back to the host panel.
///
/// Produced only by a successful wizard run (or rebuilt from JSON). The
/// collection manager owns the list of descriptors; the wizard never mutates
/// one that has already been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TriggerDescriptor {
    pub id: TriggerId,
    /// Display name (trimmed, never empty).
    pub name: String,
    pub enabled: bool,
    /// Hart the trigger is bound to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hart_id: Option<u32>,
    pub control: TriggerControl,
    /// Comparison value (`tdata2`), only for `mcontrol`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub secondary_data: Option<SecondaryData>,
    /// `tdata3` select field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux_select: Option<u32>,
    /// `tdata3` value field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aux_value: Option<u32>,
}

impl TriggerDescriptor {
    pub fn kind(&self) -> TriggerKind {
        self.control.kind()
    }

    /// One-line description for list rendering.
    ///
    /// `WP1: mcontrol load 0x00000004 [--U]`, `Steps: icount x3 [M--]`
    pub fn summary(&self) -> String {
        let detail = match &self.control {
            TriggerControl::MControl(block) => match &self.secondary_data {
                Some(data) => format!("{} {}", block.access, data),
                None => block.access.to_string(),
            },
            TriggerControl::ICount(block) => format!("x{}", block.count),
        };
        let mut line = format!(
            "{}: {} {} [{}]",
            self.name,
            self.kind(),
            detail,
            self.control.modes().label()
        );
        if !self.enabled {
            line.push_str(" (disabled)");
        }
        line
    }
}
