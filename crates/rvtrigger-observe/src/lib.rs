//! Observability setup for hosts embedding the trigger wizard.
//!
//! The core crates only emit `tracing` events; installing a subscriber is
//! left to the host, which can call [`tracing_setup::init_tracing`].

pub mod tracing_setup;
