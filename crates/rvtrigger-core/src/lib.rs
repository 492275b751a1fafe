//! Business logic for the RISC-V debug trigger wizard.
//!
//! This crate holds everything with real invariants: the validation engine,
//! the draft store, the step-by-step wizard state machine with its
//! assembler, the trigger collection, and the `tdata1` register encoder.
//! It depends only on `rvtrigger-types` -- rendering and hardware access
//! belong to the host.

pub mod collection;
pub mod config;
pub mod draft_store;
pub mod encoding;
pub mod validation;
pub mod wizard;
