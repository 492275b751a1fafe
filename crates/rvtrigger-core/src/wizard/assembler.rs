//! TriggerAssembler -- builds finished descriptors from validated steps.
//!
//! The assembler is the final step of the wizard flow: it merges the Step-1
//! identity, the validated Step-2 control block and (for mcontrol) the
//! normalized secondary data into one `TriggerDescriptor`. It also performs
//! the inverse, seeding drafts from an existing descriptor for `edit()`.
//!
//! Stateless utility, no fields.

use rvtrigger_types::draft::{ICountDraft, MControlDraft, Step1Draft};
use rvtrigger_types::trigger::{
    ICountBlock, MControlBlock, TriggerControl, TriggerDescriptor, TriggerId,
};

use super::state::{Step2Draft, WizardMode};
use crate::validation::{Identity, ValidatedMControl};

/// Output of a successful Step-2 validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedStep2 {
    MControl(ValidatedMControl),
    ICount(ICountBlock),
}

pub struct TriggerAssembler;

impl TriggerAssembler {
    /// Build the descriptor.
    ///
    /// Create mints a fresh id, enables the trigger and clears `hit`; edit
    /// reuses the edited descriptor's id, enable flag and `hit`.
    pub fn assemble(
        identity: &Identity,
        step2: ValidatedStep2,
        mode: WizardMode,
    ) -> TriggerDescriptor {
        let (id, enabled, hit) = match mode {
            WizardMode::Create => (TriggerId::new(), true, false),
            WizardMode::Edit { id, enabled, hit } => (id, enabled, hit),
        };

        let (control, secondary_data, aux_select, aux_value) = match step2 {
            ValidatedStep2::MControl(validated) => (
                TriggerControl::MControl(MControlBlock {
                    hit,
                    ..validated.block
                }),
                Some(validated.secondary_data),
                validated.aux_select,
                validated.aux_value,
            ),
            ValidatedStep2::ICount(block) => (
                TriggerControl::ICount(ICountBlock { hit, ..block }),
                None,
                None,
                None,
            ),
        };

        TriggerDescriptor {
            id,
            name: identity.name.clone(),
            enabled,
            hart_id: identity.hart_id,
            control,
            secondary_data,
            aux_select,
            aux_value,
        }
    }

    /// Drafts that reproduce `descriptor` when confirmed unchanged.
    pub fn seed_drafts(descriptor: &TriggerDescriptor) -> (Step1Draft, Step2Draft) {
        let step1 = Step1Draft {
            name: descriptor.name.clone(),
            kind: descriptor.kind().to_string(),
            hart_id: descriptor.hart_id,
        };

        let step2 = match &descriptor.control {
            TriggerControl::MControl(block) => Step2Draft::MControl(MControlDraft {
                dmode: block.dmode,
                maskmax: block.maskmax,
                select: block.select,
                timing: block.timing,
                sizelo: block.sizelo,
                sizehi: block.sizehi,
                action: block.action,
                match_mode: block.match_mode,
                chain: block.chain,
                machine: block.modes.machine,
                supervisor: block.modes.supervisor,
                user: block.modes.user,
                access_type: block.access.to_string(),
                secondary_data: descriptor
                    .secondary_data
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                aux_select: descriptor.aux_select,
                aux_value: descriptor.aux_value,
            }),
            TriggerControl::ICount(block) => Step2Draft::ICount(ICountDraft {
                dmode: block.dmode,
                action: block.action,
                count: block.count.to_string(),
                machine: block.modes.machine,
                supervisor: block.modes.supervisor,
                user: block.modes.user,
            }),
        };

        (step1, step2)
    }
}
