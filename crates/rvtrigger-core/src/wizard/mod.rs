//! The two-step trigger wizard.
//!
//! `controller` holds the state machine, `assembler` turns validated steps
//! into descriptors, and `frontend` drives the machine against a UI.

pub mod assembler;
pub mod controller;
pub mod frontend;
pub mod state;

pub use assembler::{TriggerAssembler, ValidatedStep2};
pub use controller::TriggerWizard;
pub use frontend::{StepAction, StepPrompt, WizardFrontend};
pub use state::{Step2Draft, StepView, WizardMode, WizardPhase};
