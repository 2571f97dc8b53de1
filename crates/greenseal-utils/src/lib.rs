//! Shared foundation for the greenseal workflow engine
//!
//! This crate holds the backend-mirrored submission read model and the
//! tracing setup used by every other greenseal crate. It contains no
//! workflow logic of its own; the registry, policy, gate, router and
//! orchestrator crates all build on the types defined here.

pub mod logging;
pub mod types;
