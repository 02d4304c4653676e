//! Shared conversation types for the Callweave platform.
//!
//! This crate provides the per-call data model used across the Callweave
//! crates: conversation turn roles, turns, and the call context that the
//! registry tracks for each live phone call.
//!
//! No crate in the workspace depends on anything *except* `callweave-types`
//! for cross-cutting type definitions. This keeps the dependency graph clean
//! and prevents circular dependencies.

pub mod conversation;

pub use conversation::{CallContext, Turn, TurnRole};
