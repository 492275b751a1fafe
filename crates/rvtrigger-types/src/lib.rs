//! Shared domain types for the RISC-V debug trigger wizard.
//!
//! This crate contains the trigger data model (descriptors and their
//! kind-discriminated control blocks), the wizard's draft shapes, the
//! configuration file types, and the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, schemars, thiserror.

pub mod config;
pub mod draft;
pub mod error;
pub mod trigger;
