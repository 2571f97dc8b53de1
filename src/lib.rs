//! greenseal: submission workflow engine for botanical forensic casework
//!
//! A forensic submission moves through a fixed approval pipeline: data
//! entry, finance approval, botanist review, a final cross-check, document
//! generation, email notification, and completion. This crate re-exports
//! the engine that models that pipeline:
//!
//! - [`phases`]: the ordered phase registry with display metadata
//! - [`can_advance`]: role-gated manual advancement policy
//! - [`blockers`]: data-completeness gating, independent of role
//! - [`view_for`] / [`resolve_view_mode`]: phase content routing and the
//!   historical/editable view-mode derivation
//! - [`WorkflowOrchestrator`]: confirmed, re-entrancy-guarded advancement
//!   against an injected backend
//! - [`SettingsService`]: pricing settings cache with a rate-limit circuit
//!   breaker, plus fee quoting
//!
//! The engine holds a read model of the submission and proposes
//! transitions; persistence, authentication and rendering belong to the
//! surrounding application.
//!
//! # Example
//!
//! ```rust
//! use greenseal::{ActorRole, Phase, can_advance, phases};
//!
//! let next = phases::next_phase(Phase::DataEntryStart);
//! assert_eq!(next, Some(Phase::FinanceApprovalProvided));
//! assert!(can_advance(Phase::DataEntryStart, ActorRole::Botanist));
//! ```

pub use greenseal_phases as phases;

pub use greenseal_gate::{blockers, unassessed_bag_count};
pub use greenseal_orchestrator::{
    AdvanceBackend, AdvanceOutcome, ConfirmationGate, WorkflowOrchestrator,
};
pub use greenseal_policy::{can_advance, manual_phases};
pub use greenseal_router::{
    EditorSpec, PhaseContent, RouterError, ViewMode, content_for, resolve, resolve_view_mode,
    view_for,
};
pub use greenseal_settings::{
    FeeQuote, FetchError, PricingSettings, SettingsError, SettingsFetcher, SettingsService, quote,
};
pub use greenseal_utils::logging;
pub use greenseal_utils::types::{
    ActorRef, ActorRole, BagAssessment, Determination, DrugBag, Phase, Submission,
};
