//! TriggerWizard -- the two-step create/edit state machine.
//!
//! The wizard owns its draft store and the current session. Every field
//! change goes through the matching `update_*` call, which merges it into
//! the stored draft immediately; transitions validate the stored draft and
//! either move on or leave the wizard where it was with every error.

use rvtrigger_types::draft::{
    ICountDraft, ICountPatch, MControlDraft, MControlPatch, Step1Draft, Step1Patch,
};
use rvtrigger_types::error::WizardError;
use rvtrigger_types::trigger::{TriggerDescriptor, TriggerKind};
use tracing::{debug, info, warn};

use super::assembler::{TriggerAssembler, ValidatedStep2};
use super::state::{Step2Draft, StepView, WizardMode, WizardPhase, WizardState, unexpected};
use crate::draft_store::{DraftStore, DraftStoreExt, InMemoryDraftStore};
use crate::validation::{validate_icount, validate_mcontrol, validate_step1};

/// Create/edit wizard over a draft store.
///
/// At most one session runs per wizard: `create` and `edit` fail with
/// `WizardError::State` unless the wizard is idle.
#[derive(Debug, Default)]
pub struct TriggerWizard<S: DraftStore = InMemoryDraftStore> {
    store: S,
    state: WizardState,
}

impl TriggerWizard<InMemoryDraftStore> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: DraftStore> TriggerWizard<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            state: WizardState::Idle,
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.state.phase()
    }

    pub fn is_editing(&self) -> bool {
        self.state.mode().is_some_and(|mode| mode.is_edit())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn view<D>(&self, draft: D) -> StepView<D> {
        StepView {
            draft,
            editing: self.is_editing(),
        }
    }

    // -----------------------------------------------------------------------
    // Session entry
    // -----------------------------------------------------------------------

    /// Open Step 1 for a new trigger, showing whatever the draft holds.
    pub fn create(&mut self) -> Result<StepView<Step1Draft>, WizardError> {
        self.state.open(WizardMode::Create)?;
        debug!("Trigger wizard opened for create");
        Ok(self.view(self.store.get::<Step1Draft>()))
    }

    /// Open Step 1 pre-populated from `existing`.
    ///
    /// The descriptor's values overwrite the stored drafts of Step 1 and of
    /// its kind's Step 2. The hardware `hit` status stays with the session
    /// and never reaches the drafts.
    pub fn edit(
        &mut self,
        existing: &TriggerDescriptor,
    ) -> Result<StepView<Step1Draft>, WizardError> {
        self.state.open(WizardMode::Edit {
            id: existing.id,
            enabled: existing.enabled,
            hit: existing.control.hit(),
        })?;

        let (step1, step2) = TriggerAssembler::seed_drafts(existing);
        self.store.put(&step1);
        match &step2 {
            Step2Draft::MControl(draft) => self.store.put(draft),
            Step2Draft::ICount(draft) => self.store.put(draft),
        }

        debug!(id = %existing.id, name = %existing.name, "Trigger wizard opened for edit");
        Ok(self.view(step1))
    }

    // -----------------------------------------------------------------------
    // Field updates
    // -----------------------------------------------------------------------

    pub fn update_step1(&mut self, patch: Step1Patch) -> Result<Step1Draft, WizardError> {
        match self.phase() {
            WizardPhase::Step1 => Ok(self.store.merge::<Step1Draft>(patch)),
            phase => Err(unexpected("edit step 1", phase)),
        }
    }

    pub fn update_mcontrol(&mut self, patch: MControlPatch) -> Result<MControlDraft, WizardError> {
        match self.phase() {
            WizardPhase::Step2(TriggerKind::MControl) => {
                Ok(self.store.merge::<MControlDraft>(patch))
            }
            phase => Err(unexpected("edit mcontrol parameters", phase)),
        }
    }

    pub fn update_icount(&mut self, patch: ICountPatch) -> Result<ICountDraft, WizardError> {
        match self.phase() {
            WizardPhase::Step2(TriggerKind::ICount) => Ok(self.store.merge::<ICountDraft>(patch)),
            phase => Err(unexpected("edit icount parameters", phase)),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Validate Step 1 and open the Step 2 form for the chosen kind.
    pub fn confirm_step1(&mut self) -> Result<StepView<Step2Draft>, WizardError> {
        if self.phase() != WizardPhase::Step1 {
            return Err(unexpected("confirm step 1", self.phase()));
        }

        let identity = match validate_step1(&self.store.get::<Step1Draft>()) {
            Ok(identity) => identity,
            Err(err) => {
                warn!(%err, "Step 1 rejected");
                return Err(err);
            }
        };

        let draft = match identity.kind {
            TriggerKind::MControl => Step2Draft::MControl(self.store.get()),
            TriggerKind::ICount => Step2Draft::ICount(self.store.get()),
            other => return Err(WizardError::UnsupportedKind(other)),
        };

        debug!(name = %identity.name, kind = %identity.kind, "Step 1 accepted");
        self.state.advance(identity)?;
        Ok(self.view(draft))
    }

    /// Return from Step 2 to Step 1. Both drafts are kept.
    pub fn back(&mut self) -> Result<StepView<Step1Draft>, WizardError> {
        self.state.go_back()?;
        debug!("Returned to step 1");
        Ok(self.view(self.store.get::<Step1Draft>()))
    }

    /// Validate Step 2 and produce the finished descriptor.
    ///
    /// On success the wizard is idle again. On failure it stays in Step 2.
    pub fn commit(&mut self) -> Result<TriggerDescriptor, WizardError> {
        let WizardState::Step2 { mode, identity } = &self.state else {
            return Err(unexpected("commit", self.phase()));
        };

        let validated = match identity.kind {
            TriggerKind::MControl => validate_mcontrol(&self.store.get::<MControlDraft>())
                .map(ValidatedStep2::MControl),
            TriggerKind::ICount => {
                validate_icount(&self.store.get::<ICountDraft>()).map(ValidatedStep2::ICount)
            }
            other => return Err(WizardError::UnsupportedKind(other)),
        };

        let validated = match validated {
            Ok(validated) => validated,
            Err(errors) => {
                warn!(kind = %identity.kind, count = errors.len(), "Step 2 rejected");
                return Err(WizardError::Validation(errors));
            }
        };

        let editing = mode.is_edit();
        let descriptor = TriggerAssembler::assemble(identity, validated, *mode);
        self.state.close()?;

        info!(
            id = %descriptor.id,
            name = %descriptor.name,
            kind = %descriptor.kind(),
            editing,
            "Trigger wizard committed"
        );
        Ok(descriptor)
    }

    /// Return to `Idle` from a session nobody will finish. No-op when idle.
    pub(crate) fn abandon(&mut self) {
        if let Ok(left) = self.state.close() {
            warn!(phase = ?left.phase(), "Trigger wizard abandoned");
        }
    }

    /// Close the wizard without producing a descriptor. Drafts stay as they
    /// are.
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        let left = self.state.close()?;
        info!(phase = ?left.phase(), "Trigger wizard cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::TriggerCollection;
    use rvtrigger_types::error::Field;
    use rvtrigger_types::trigger::{AccessType, TriggerControl};

    fn step1(name: &str, kind: &str) -> Step1Patch {
        Step1Patch {
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            ..Default::default()
        }
    }

    fn load_watchpoint(data: &str) -> MControlPatch {
        MControlPatch {
            access_type: Some("load".to_string()),
            secondary_data: Some(data.to_string()),
            user: Some(true),
            ..Default::default()
        }
    }

    /// Run a create session through to a committed icount descriptor.
    fn committed_icount(wizard: &mut TriggerWizard, name: &str, count: &str) -> TriggerDescriptor {
        wizard.create().unwrap();
        wizard.update_step1(step1(name, "icount")).unwrap();
        wizard.confirm_step1().unwrap();
        wizard
            .update_icount(ICountPatch {
                count: Some(count.to_string()),
                machine: Some(true),
                ..Default::default()
            })
            .unwrap();
        wizard.commit().unwrap()
    }

    fn validation_errors(err: WizardError) -> rvtrigger_types::error::ValidationErrors {
        match err {
            WizardError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_load_watchpoint() {
        let mut wizard = TriggerWizard::new();
        let view = wizard.create().unwrap();
        assert!(!view.editing);
        assert_eq!(wizard.phase(), WizardPhase::Step1);

        wizard.update_step1(step1("WP1", "mcontrol")).unwrap();
        let step2 = wizard.confirm_step1().unwrap();
        assert_eq!(step2.draft.kind(), TriggerKind::MControl);
        assert_eq!(wizard.phase(), WizardPhase::Step2(TriggerKind::MControl));

        wizard.update_mcontrol(load_watchpoint("0x00000004")).unwrap();
        let descriptor = wizard.commit().unwrap();

        assert!(descriptor.enabled);
        assert_eq!(descriptor.name, "WP1");
        assert_eq!(descriptor.kind(), TriggerKind::MControl);
        let TriggerControl::MControl(block) = &descriptor.control else {
            panic!("expected mcontrol block");
        };
        assert_eq!(block.access, AccessType::Load);
        assert!(block.modes.user);
        assert_eq!(
            descriptor.secondary_data.as_ref().map(|d| d.as_str()),
            Some("0x00000004")
        );
        assert_eq!(wizard.phase(), WizardPhase::Idle);
    }

    #[test]
    fn test_prefix_mismatch_keeps_wizard_open() {
        let mut wizard = TriggerWizard::new();
        wizard.create().unwrap();
        wizard.update_step1(step1("WP1", "mcontrol")).unwrap();
        wizard.confirm_step1().unwrap();
        wizard.update_mcontrol(load_watchpoint("0x80000004")).unwrap();

        let errors = validation_errors(wizard.commit().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field(Field::SecondaryData));
        assert!(errors.messages()[0].contains("0x00"));
        assert_eq!(wizard.phase(), WizardPhase::Step2(TriggerKind::MControl));

        // Fixing the field lets the same session commit.
        wizard.update_mcontrol(load_watchpoint("0x004")).unwrap();
        let descriptor = wizard.commit().unwrap();
        assert_eq!(
            descriptor.secondary_data.as_ref().map(|d| d.as_str()),
            Some("0x004")
        );
    }

    #[test]
    fn test_icount_errors_are_aggregated() {
        let mut wizard = TriggerWizard::new();
        wizard.create().unwrap();
        wizard.update_step1(step1("IC", "icount")).unwrap();
        wizard.confirm_step1().unwrap();
        wizard
            .update_icount(ICountPatch {
                count: Some("0".to_string()),
                ..Default::default()
            })
            .unwrap();

        let errors = validation_errors(wizard.commit().unwrap_err());
        assert_eq!(
            errors.messages(),
            vec![
                "count must be ≥ 1",
                "select at least one mode (machine, supervisor, or user)"
            ]
        );
        assert_eq!(wizard.phase(), WizardPhase::Step2(TriggerKind::ICount));
    }

    #[test]
    fn test_step1_guard_stays_in_step1() {
        let mut wizard = TriggerWizard::new();
        wizard.create().unwrap();

        let errors = validation_errors(wizard.confirm_step1().unwrap_err());
        assert!(errors.has_field(Field::Name));
        assert!(errors.has_field(Field::Kind));
        assert_eq!(wizard.phase(), WizardPhase::Step1);
    }

    #[test]
    fn test_step1_rejects_reserved_kind() {
        let mut wizard = TriggerWizard::new();
        wizard.create().unwrap();
        wizard.update_step1(step1("T", "etrigger")).unwrap();

        let err = wizard.confirm_step1().unwrap_err();
        assert!(matches!(err, WizardError::UnsupportedKind(TriggerKind::ETrigger)));
        assert_eq!(wizard.phase(), WizardPhase::Step1);
    }

    #[test]
    fn test_edit_preserves_id_and_enabled() {
        let mut wizard = TriggerWizard::new();
        let mut collection = TriggerCollection::new();
        let original = committed_icount(&mut wizard, "IC", "3");
        collection.add(original.clone()).unwrap();
        collection.set_enabled(&original.id, false).unwrap();
        let existing = collection.get(&original.id).unwrap().clone();

        let view = wizard.edit(&existing).unwrap();
        assert!(view.editing);
        assert_eq!(view.draft.name, "IC");

        let step2 = wizard.confirm_step1().unwrap();
        let Step2Draft::ICount(draft) = step2.draft else {
            panic!("expected icount draft");
        };
        assert_eq!(draft.count, "3");

        wizard
            .update_icount(ICountPatch {
                count: Some("9".to_string()),
                ..Default::default()
            })
            .unwrap();
        let edited = wizard.commit().unwrap();
        assert_eq!(edited.id, original.id);
        assert!(!edited.enabled);

        collection.replace(&original.id, edited).unwrap();
        let TriggerControl::ICount(block) = &collection.get(&original.id).unwrap().control else {
            panic!("expected icount block");
        };
        assert_eq!(block.count, 9);
    }

    #[test]
    fn test_edit_then_cancel_leaves_collection_untouched() {
        let mut wizard = TriggerWizard::new();
        let mut collection = TriggerCollection::new();
        collection
            .add(committed_icount(&mut wizard, "IC", "3"))
            .unwrap();
        let before = serde_json::to_string(collection.as_slice()).unwrap();
        let existing = collection.as_slice()[0].clone();

        wizard.edit(&existing).unwrap();
        wizard.cancel().unwrap();

        assert_eq!(serde_json::to_string(collection.as_slice()).unwrap(), before);
        assert_eq!(wizard.phase(), WizardPhase::Idle);
    }

    #[test]
    fn test_hit_from_cancelled_edit_does_not_reach_new_trigger() {
        let mut wizard = TriggerWizard::new();
        let mut fired = committed_icount(&mut wizard, "IC", "3");
        let TriggerControl::ICount(block) = &mut fired.control else {
            panic!("expected icount block");
        };
        block.hit = true;

        wizard.edit(&fired).unwrap();
        wizard.cancel().unwrap();

        wizard.create().unwrap();
        wizard.confirm_step1().unwrap();
        let fresh = wizard.commit().unwrap();

        assert_ne!(fresh.id, fired.id);
        assert!(!fresh.control.hit());
    }

    #[test]
    fn test_edit_keeps_hit_status() {
        let mut wizard = TriggerWizard::new();
        let mut fired = committed_icount(&mut wizard, "IC", "3");
        let TriggerControl::ICount(block) = &mut fired.control else {
            panic!("expected icount block");
        };
        block.hit = true;

        wizard.edit(&fired).unwrap();
        wizard.confirm_step1().unwrap();
        let edited = wizard.commit().unwrap();

        assert_eq!(edited, fired);
    }

    #[test]
    fn test_partial_drafts_survive_cancel() {
        let mut wizard = TriggerWizard::new();
        wizard.create().unwrap();
        wizard.update_step1(step1("WP2", "mcontrol")).unwrap();
        wizard.confirm_step1().unwrap();
        wizard
            .update_mcontrol(MControlPatch {
                access_type: Some("store".to_string()),
                secondary_data: Some("0x40".to_string()),
                ..Default::default()
            })
            .unwrap();
        wizard.cancel().unwrap();

        let view = wizard.create().unwrap();
        assert_eq!(view.draft.name, "WP2");
        let step2 = wizard.confirm_step1().unwrap();
        let Step2Draft::MControl(draft) = step2.draft else {
            panic!("expected mcontrol draft");
        };
        assert_eq!(draft.access_type, "store");
        assert_eq!(draft.secondary_data, "0x40");
    }

    #[test]
    fn test_only_one_session_at_a_time() {
        let mut wizard = TriggerWizard::new();
        wizard.create().unwrap();

        assert!(matches!(wizard.create(), Err(WizardError::State(_))));
        let existing = {
            let mut other = TriggerWizard::new();
            committed_icount(&mut other, "IC", "1")
        };
        assert!(matches!(wizard.edit(&existing), Err(WizardError::State(_))));
        assert_eq!(wizard.phase(), WizardPhase::Step1);
    }

    #[test]
    fn test_back_keeps_both_drafts() {
        let mut wizard = TriggerWizard::new();
        wizard.create().unwrap();
        wizard.update_step1(step1("IC", "icount")).unwrap();
        wizard.confirm_step1().unwrap();
        wizard
            .update_icount(ICountPatch {
                count: Some("12".to_string()),
                ..Default::default()
            })
            .unwrap();

        let view = wizard.back().unwrap();
        assert_eq!(view.draft.name, "IC");
        assert_eq!(wizard.phase(), WizardPhase::Step1);

        // Switching kind after going back opens the other form.
        wizard
            .update_step1(Step1Patch {
                kind: Some("mcontrol".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            wizard.confirm_step1().unwrap().draft.kind(),
            TriggerKind::MControl
        );
        assert_eq!(wizard.store().get::<ICountDraft>().count, "12");
    }

    #[test]
    fn test_updates_rejected_outside_their_step() {
        let mut wizard = TriggerWizard::new();
        assert!(wizard.update_step1(Step1Patch::default()).is_err());
        assert!(wizard.cancel().is_err());
        assert!(wizard.commit().is_err());
        assert!(wizard.back().is_err());

        wizard.create().unwrap();
        wizard.update_step1(step1("IC", "icount")).unwrap();
        wizard.confirm_step1().unwrap();
        assert!(wizard.update_mcontrol(MControlPatch::default()).is_err());
        assert!(wizard.update_step1(Step1Patch::default()).is_err());
        assert!(wizard.confirm_step1().is_err());
    }

    #[test]
    fn test_committed_descriptors_keep_invariants() {
        let mut wizard = TriggerWizard::new();
        for (access, data) in [("execute", "0x80abc"), ("store", "0x40"), ("load", "0x00ff")] {
            wizard.create().unwrap();
            wizard.update_step1(step1("WP", "mcontrol")).unwrap();
            wizard.confirm_step1().unwrap();
            wizard
                .update_mcontrol(MControlPatch {
                    access_type: Some(access.to_string()),
                    secondary_data: Some(data.to_uppercase()),
                    machine: Some(true),
                    ..Default::default()
                })
                .unwrap();
            let descriptor = wizard.commit().unwrap();

            assert!(descriptor.control.modes().any());
            let data = descriptor.secondary_data.unwrap();
            let prefix = match access {
                "execute" => "0x80",
                "store" => "0x40",
                _ => "0x00",
            };
            assert!(data.as_str().starts_with(prefix));
            assert_eq!(data.as_str(), data.as_str().to_lowercase());
        }
    }
}
