//! Call lifecycle for the Callweave platform.
//!
//! Owns the two halves of placing an agent call: the in-memory registry of
//! per-call conversation contexts, and the dispatcher that asks the
//! telephony provider to originate the outbound leg. The registry entry is
//! created before the provider is contacted and its id travels with the
//! origination request as the correlation token the provider echoes back
//! in later callbacks.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;

pub use config::TelephonyConfig;
pub use dispatch::{CallDispatcher, DispatchOutcome};
pub use error::CallError;
pub use registry::{CallRegistry, PERSONA_PROMPT};
