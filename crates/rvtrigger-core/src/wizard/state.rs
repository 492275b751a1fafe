//! Wizard state machine states.
//!
//! `Idle -> Step1 -> Step2(kind) -> {Committed | Cancelled} -> Idle`.
//! The terminal states are not stored: commit and cancel return their
//! outcome and drop straight back to `Idle`.

use rvtrigger_types::draft::{ICountDraft, MControlDraft};
use rvtrigger_types::error::WizardError;
use rvtrigger_types::trigger::{TriggerId, TriggerKind};

use crate::validation::Identity;

/// Whether the running session creates a new trigger or edits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    /// Id, enable flag and hardware `hit` status of the edited descriptor,
    /// reused on commit.
    Edit {
        id: TriggerId,
        enabled: bool,
        hit: bool,
    },
}

impl WizardMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, WizardMode::Edit { .. })
    }
}

/// Full state of the wizard, including what each step has accepted so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WizardState {
    #[default]
    Idle,
    Step1 {
        mode: WizardMode,
    },
    Step2 {
        mode: WizardMode,
        identity: Identity,
    },
}

/// Observable position of the wizard, without the carried data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Idle,
    Step1,
    Step2(TriggerKind),
}

impl WizardState {
    pub fn phase(&self) -> WizardPhase {
        match self {
            WizardState::Idle => WizardPhase::Idle,
            WizardState::Step1 { .. } => WizardPhase::Step1,
            WizardState::Step2 { identity, .. } => WizardPhase::Step2(identity.kind),
        }
    }

    pub fn mode(&self) -> Option<WizardMode> {
        match self {
            WizardState::Idle => None,
            WizardState::Step1 { mode } | WizardState::Step2 { mode, .. } => Some(*mode),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, WizardState::Idle)
    }

    /// Enter Step 1 from `Idle`. Any other state rejects the new session.
    pub fn open(&mut self, mode: WizardMode) -> Result<(), WizardError> {
        if !self.is_idle() {
            return Err(WizardError::State(format!(
                "a trigger wizard is already open ({:?})",
                self.phase()
            )));
        }
        *self = WizardState::Step1 { mode };
        Ok(())
    }

    /// Step 1 accepted: carry the identity into Step 2.
    pub fn advance(&mut self, identity: Identity) -> Result<(), WizardError> {
        match self {
            WizardState::Step1 { mode } => {
                let mode = *mode;
                *self = WizardState::Step2 { mode, identity };
                Ok(())
            }
            other => Err(unexpected("confirm step 1", other.phase())),
        }
    }

    /// Step 2 back to Step 1, keeping the mode.
    pub fn go_back(&mut self) -> Result<(), WizardError> {
        match self {
            WizardState::Step2 { mode, .. } => {
                let mode = *mode;
                *self = WizardState::Step1 { mode };
                Ok(())
            }
            other => Err(unexpected("go back", other.phase())),
        }
    }

    /// Leave any active state. Returns the state that was left.
    pub fn close(&mut self) -> Result<WizardState, WizardError> {
        if self.is_idle() {
            return Err(unexpected("close", WizardPhase::Idle));
        }
        Ok(std::mem::take(self))
    }
}

pub(crate) fn unexpected(action: &str, phase: WizardPhase) -> WizardError {
    WizardError::State(format!("cannot {action} while in {phase:?}"))
}

/// The kind-specific draft shown by Step 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step2Draft {
    MControl(MControlDraft),
    ICount(ICountDraft),
}

impl Step2Draft {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Step2Draft::MControl(_) => TriggerKind::MControl,
            Step2Draft::ICount(_) => TriggerKind::ICount,
        }
    }
}

/// What a step shows: the current draft and whether this is an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView<D> {
    pub draft: D,
    pub editing: bool,
}
