//! Wizard draft shapes.
//!
//! A draft holds the raw, not-yet-validated field values of one wizard step
//! exactly as the user left them. Select inputs that the validator must
//! coerce (trigger kind, access type, count) stay strings here; everything
//! else already has its final type.
//!
//! Each draft has a matching `*Patch` with every field optional, used for the
//! shallow merge performed on every field change.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Which step a stored draft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    Step1,
    MControl,
    ICount,
}

impl fmt::Display for DraftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftKind::Step1 => write!(f, "step1"),
            DraftKind::MControl => write!(f, "mcontrol"),
            DraftKind::ICount => write!(f, "icount"),
        }
    }
}

/// Common behavior of the three draft shapes.
///
/// `Default` is the documented starting point returned when nothing has
/// been stored yet.
pub trait Draft: Clone + Default + Serialize + DeserializeOwned {
    type Patch: Default;

    const KIND: DraftKind;

    /// Shallow merge: fields present in `patch` overwrite, absent ones stay.
    fn apply(&mut self, patch: Self::Patch);
}

// ---------------------------------------------------------------------------
// Step 1
// ---------------------------------------------------------------------------

/// Identity step: name, kind and the optional hart binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step1Draft {
    pub name: String,
    /// Raw kind selection; empty until the user picks one.
    pub kind: String,
    pub hart_id: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step1Patch {
    pub name: Option<String>,
    pub kind: Option<String>,
    /// `Some(None)` clears the hart binding.
    pub hart_id: Option<Option<u32>>,
}

impl Draft for Step1Draft {
    type Patch = Step1Patch;

    const KIND: DraftKind = DraftKind::Step1;

    fn apply(&mut self, patch: Step1Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(hart_id) = patch.hart_id {
            self.hart_id = hart_id;
        }
    }
}

// ---------------------------------------------------------------------------
// mcontrol
// ---------------------------------------------------------------------------

/// Parameter step for an address/data match trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MControlDraft {
    pub dmode: bool,
    pub maskmax: u8,
    pub select: bool,
    pub timing: bool,
    pub sizelo: u8,
    pub sizehi: u8,
    pub action: u8,
    pub match_mode: u8,
    pub chain: bool,
    pub machine: bool,
    pub supervisor: bool,
    pub user: bool,
    /// Raw access type selection (`execute`, `store`, `load`).
    pub access_type: String,
    /// Raw secondary data text as typed.
    pub secondary_data: String,
    pub aux_select: Option<u32>,
    pub aux_value: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MControlPatch {
    pub dmode: Option<bool>,
    pub maskmax: Option<u8>,
    pub select: Option<bool>,
    pub timing: Option<bool>,
    pub sizelo: Option<u8>,
    pub sizehi: Option<u8>,
    pub action: Option<u8>,
    pub match_mode: Option<u8>,
    pub chain: Option<bool>,
    pub machine: Option<bool>,
    pub supervisor: Option<bool>,
    pub user: Option<bool>,
    pub access_type: Option<String>,
    pub secondary_data: Option<String>,
    pub aux_select: Option<Option<u32>>,
    pub aux_value: Option<Option<u32>>,
}

impl Draft for MControlDraft {
    type Patch = MControlPatch;

    const KIND: DraftKind = DraftKind::MControl;

    fn apply(&mut self, patch: MControlPatch) {
        if let Some(v) = patch.dmode {
            self.dmode = v;
        }
        if let Some(v) = patch.maskmax {
            self.maskmax = v;
        }
        if let Some(v) = patch.select {
            self.select = v;
        }
        if let Some(v) = patch.timing {
            self.timing = v;
        }
        if let Some(v) = patch.sizelo {
            self.sizelo = v;
        }
        if let Some(v) = patch.sizehi {
            self.sizehi = v;
        }
        if let Some(v) = patch.action {
            self.action = v;
        }
        if let Some(v) = patch.match_mode {
            self.match_mode = v;
        }
        if let Some(v) = patch.chain {
            self.chain = v;
        }
        if let Some(v) = patch.machine {
            self.machine = v;
        }
        if let Some(v) = patch.supervisor {
            self.supervisor = v;
        }
        if let Some(v) = patch.user {
            self.user = v;
        }
        if let Some(v) = patch.access_type {
            self.access_type = v;
        }
        if let Some(v) = patch.secondary_data {
            self.secondary_data = v;
        }
        if let Some(v) = patch.aux_select {
            self.aux_select = v;
        }
        if let Some(v) = patch.aux_value {
            self.aux_value = v;
        }
    }
}

// ---------------------------------------------------------------------------
// icount
// ---------------------------------------------------------------------------

/// Parameter step for an instruction count trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ICountDraft {
    pub dmode: bool,
    pub action: u8,
    /// Raw count selection; coerced to an integer on validation.
    pub count: String,
    pub machine: bool,
    pub supervisor: bool,
    pub user: bool,
}

impl Default for ICountDraft {
    fn default() -> Self {
        Self {
            dmode: false,
            action: 0,
            count: "1".to_string(),
            machine: false,
            supervisor: false,
            user: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ICountPatch {
    pub dmode: Option<bool>,
    pub action: Option<u8>,
    pub count: Option<String>,
    pub machine: Option<bool>,
    pub supervisor: Option<bool>,
    pub user: Option<bool>,
}

impl Draft for ICountDraft {
    type Patch = ICountPatch;

    const KIND: DraftKind = DraftKind::ICount;

    fn apply(&mut self, patch: ICountPatch) {
        if let Some(v) = patch.dmode {
            self.dmode = v;
        }
        if let Some(v) = patch.action {
            self.action = v;
        }
        if let Some(v) = patch.count {
            self.count = v;
        }
        if let Some(v) = patch.machine {
            self.machine = v;
        }
        if let Some(v) = patch.supervisor {
            self.supervisor = v;
        }
        if let Some(v) = patch.user {
            self.user = v;
        }
    }
}
