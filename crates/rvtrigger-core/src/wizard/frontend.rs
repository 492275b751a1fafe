//! Request/response boundary between the wizard and whatever renders it.
//!
//! A `WizardFrontend` shows one step at a time and answers with the user's
//! edits plus what to do next. `run_create` and `run_edit` drive the state
//! machine until the user commits or cancels, re-prompting the same step
//! with every validation error whenever a transition is rejected.
//!
//! A session started by `run_create`/`run_edit` always ends back in `Idle`,
//! including when the returned future is dropped mid-step.

use std::future::Future;

use rvtrigger_types::draft::{
    ICountDraft, ICountPatch, MControlDraft, MControlPatch, Step1Draft, Step1Patch,
};
use rvtrigger_types::error::{Field, FieldError, WizardError};
use rvtrigger_types::trigger::{TriggerDescriptor, TriggerKind};
use tracing::debug;

use super::controller::TriggerWizard;
use super::state::WizardPhase;
use crate::draft_store::{DraftStore, DraftStoreExt};

/// What a step is asked to render.
#[derive(Debug, Clone, Copy)]
pub struct StepPrompt<'a, D> {
    pub draft: &'a D,
    /// Errors from the last rejected attempt at leaving this step.
    pub errors: &'a [FieldError],
    /// `true` labels the dialog "Edit Trigger" instead of "Create Trigger".
    pub editing: bool,
}

/// The user's answer to a prompt. The patch is merged into the draft
/// before the action is taken, so partial input is kept even on cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction<P> {
    Confirm(P),
    /// Step 2 only; treated as cancel on Step 1.
    Back(P),
    Cancel(P),
}

impl<P> StepAction<P> {
    fn into_parts(self) -> (P, Transition) {
        match self {
            StepAction::Confirm(patch) => (patch, Transition::Confirm),
            StepAction::Back(patch) => (patch, Transition::Back),
            StepAction::Cancel(patch) => (patch, Transition::Cancel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Confirm,
    Back,
    Cancel,
}

/// Renders wizard steps and waits for the user.
pub trait WizardFrontend {
    fn step1(
        &mut self,
        prompt: StepPrompt<'_, Step1Draft>,
    ) -> impl Future<Output = StepAction<Step1Patch>> + Send;

    fn mcontrol(
        &mut self,
        prompt: StepPrompt<'_, MControlDraft>,
    ) -> impl Future<Output = StepAction<MControlPatch>> + Send;

    fn icount(
        &mut self,
        prompt: StepPrompt<'_, ICountDraft>,
    ) -> impl Future<Output = StepAction<ICountPatch>> + Send;
}

/// Turn a rejected transition into errors the step can show.
fn step_errors(err: WizardError) -> Result<Vec<FieldError>, WizardError> {
    match err {
        WizardError::Validation(errors) => Ok(errors.into_iter().collect()),
        WizardError::UnsupportedKind(_) => Ok(vec![FieldError::new(Field::Kind, err.to_string())]),
        WizardError::State(_) => Err(err),
    }
}

/// Abandons the session on drop unless it already ended.
struct SessionGuard<'w, S: DraftStore> {
    wizard: &'w mut TriggerWizard<S>,
}

impl<S: DraftStore> Drop for SessionGuard<'_, S> {
    fn drop(&mut self) {
        self.wizard.abandon();
    }
}

impl<S: DraftStore> TriggerWizard<S> {
    /// Create a trigger interactively. `Ok(None)` means the user cancelled.
    pub async fn run_create<F: WizardFrontend>(
        &mut self,
        frontend: &mut F,
    ) -> Result<Option<TriggerDescriptor>, WizardError> {
        self.create()?;
        let mut session = SessionGuard { wizard: self };
        session.wizard.drive(frontend).await
    }

    /// Edit `existing` interactively. `Ok(None)` means the user cancelled
    /// and `existing` should be kept as is.
    pub async fn run_edit<F: WizardFrontend>(
        &mut self,
        frontend: &mut F,
        existing: &TriggerDescriptor,
    ) -> Result<Option<TriggerDescriptor>, WizardError> {
        self.edit(existing)?;
        let mut session = SessionGuard { wizard: self };
        session.wizard.drive(frontend).await
    }

    async fn drive<F: WizardFrontend>(
        &mut self,
        frontend: &mut F,
    ) -> Result<Option<TriggerDescriptor>, WizardError> {
        let editing = self.is_editing();
        let mut errors: Vec<FieldError> = Vec::new();

        loop {
            match self.phase() {
                WizardPhase::Idle => return Ok(None),

                WizardPhase::Step1 => {
                    let draft = self.store().get::<Step1Draft>();
                    let prompt = StepPrompt {
                        draft: &draft,
                        errors: &errors,
                        editing,
                    };
                    let (patch, transition) = frontend.step1(prompt).await.into_parts();
                    self.update_step1(patch)?;

                    match transition {
                        Transition::Confirm => match self.confirm_step1() {
                            Ok(_) => errors.clear(),
                            Err(err) => errors = step_errors(err)?,
                        },
                        Transition::Back | Transition::Cancel => {
                            self.cancel()?;
                            return Ok(None);
                        }
                    }
                }

                WizardPhase::Step2(kind) => {
                    let transition = match kind {
                        TriggerKind::MControl => {
                            let draft = self.store().get::<MControlDraft>();
                            let prompt = StepPrompt {
                                draft: &draft,
                                errors: &errors,
                                editing,
                            };
                            let (patch, transition) = frontend.mcontrol(prompt).await.into_parts();
                            self.update_mcontrol(patch)?;
                            transition
                        }
                        TriggerKind::ICount => {
                            let draft = self.store().get::<ICountDraft>();
                            let prompt = StepPrompt {
                                draft: &draft,
                                errors: &errors,
                                editing,
                            };
                            let (patch, transition) = frontend.icount(prompt).await.into_parts();
                            self.update_icount(patch)?;
                            transition
                        }
                        other => return Err(WizardError::UnsupportedKind(other)),
                    };

                    match transition {
                        Transition::Confirm => match self.commit() {
                            Ok(descriptor) => return Ok(Some(descriptor)),
                            Err(err) => errors = step_errors(err)?,
                        },
                        Transition::Back => {
                            self.back()?;
                            errors.clear();
                        }
                        Transition::Cancel => {
                            self.cancel()?;
                            return Ok(None);
                        }
                    }
                }
            }
            debug!(phase = ?self.phase(), errors = errors.len(), "Wizard step answered");
        }
    }
}
