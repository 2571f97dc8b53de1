//! Phase content routing
//!
//! Given a phase to display, the router answers two questions and nothing
//! more: which content module handles it, and whether it renders read-only
//! or editable. All business logic stays in the modules themselves (see
//! [`views`]); the router performs only the mode derivation.
//!
//! Phase-to-module selection is a plain exhaustive match over [`Phase`], so
//! a new phase without a content module is a build error. Unknown phase
//! *keys* can still arrive from the backend (schema drift); those surface as
//! a recoverable [`RouterError::UnknownPhase`] at the string boundary.

mod views;

pub use views::EditorSpec;

use greenseal_utils::types::{ActorRole, Phase, Submission};
use thiserror::Error;
use tracing::warn;

/// How a phase renders relative to the submission's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Not the current phase; rendered as a read-only summary.
    Historical,
    /// The current phase, and the caller grants edit permission.
    CurrentEditable,
    /// The current phase, but the viewer may only read.
    CurrentReadonly,
}

/// Router errors. `UnknownPhase` indicates backend schema drift and is
/// recoverable: callers show a generic fallback and log a warning.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("unknown phase key '{key}'")]
    UnknownPhase { key: String },
}

/// Content modules. Six modules cover eight phases: both generation phases
/// share the documents module, and `InReview` reuses the data-entry summary
/// (the assembled submission is what a reviewer inspects).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseContent {
    DataEntry,
    FinanceApproval,
    BotanistReview,
    Documents,
    SendEmails,
    Complete,
}

/// Selects the content module for a phase. Exhaustive by construction.
#[must_use]
pub const fn content_for(phase: Phase) -> PhaseContent {
    match phase {
        Phase::DataEntryStart | Phase::InReview => PhaseContent::DataEntry,
        Phase::FinanceApprovalProvided => PhaseContent::FinanceApproval,
        Phase::BotanistApprovalProvided => PhaseContent::BotanistReview,
        Phase::CertificateGenerationStart | Phase::InvoiceGenerationStart => {
            PhaseContent::Documents
        }
        Phase::SendingEmails => PhaseContent::SendEmails,
        Phase::Complete => PhaseContent::Complete,
    }
}

/// Backend-facing entry point: resolve a raw phase key to a content module.
pub fn resolve(raw_key: &str) -> Result<PhaseContent, RouterError> {
    Phase::parse(raw_key).map(content_for).ok_or_else(|| {
        warn!(key = raw_key, "unrecognized phase key from backend");
        RouterError::UnknownPhase {
            key: raw_key.to_string(),
        }
    })
}

/// Derives the view mode for `viewed` on a submission currently in
/// `submission_phase`.
///
/// Any non-current phase renders `Historical`. Viewing a phase *ahead* of
/// the current one is not a navigable path in the product; it still renders
/// read-only but is logged at WARN so the unexpected navigation is visible.
///
/// `can_edit` is the caller's judgment of "may this viewer act on the
/// current phase's content"; it overlaps with the advancement policy but is
/// deliberately a separate input, since a user can be allowed to edit notes
/// before advancement becomes legal.
#[must_use]
pub fn resolve_view_mode(submission_phase: Phase, viewed: Phase, can_edit: bool) -> ViewMode {
    if viewed != submission_phase {
        if greenseal_phases::index_of(viewed) > greenseal_phases::index_of(submission_phase) {
            warn!(
                viewed = viewed.as_str(),
                current = submission_phase.as_str(),
                "viewing a phase ahead of the submission's current phase"
            );
        }
        return ViewMode::Historical;
    }
    if can_edit {
        ViewMode::CurrentEditable
    } else {
        ViewMode::CurrentReadonly
    }
}

/// Convenience resolution for the common case: edit permission defaults to
/// the advancement policy for `role`. Callers with a richer edit rule call
/// [`resolve_view_mode`] directly.
#[must_use]
pub fn view_for(
    submission: &Submission,
    viewed: Phase,
    role: ActorRole,
) -> (PhaseContent, ViewMode) {
    let can_edit = greenseal_policy::can_advance(viewed, role);
    (
        content_for(viewed),
        resolve_view_mode(submission.phase, viewed, can_edit),
    )
}
