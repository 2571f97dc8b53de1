//! Advancement access policy
//!
//! Pure role checks deciding whether a user may manually advance a
//! submission out of its current phase. Data-completeness gating is the
//! gate crate's job; this crate only answers "may this role push the
//! button at all".

use greenseal_utils::types::{ActorRole, Phase};

/// Whether `role` may manually advance a submission currently in `current`.
///
/// The two generation phases, `SendingEmails` and `Complete` always return
/// false: those transitions are driven by backend document and mail jobs,
/// never by a person. Total over both enums; never errors.
#[must_use]
pub const fn can_advance(current: Phase, role: ActorRole) -> bool {
    match current {
        Phase::DataEntryStart | Phase::InReview => {
            matches!(role, ActorRole::Botanist | ActorRole::Finance)
        }
        Phase::FinanceApprovalProvided => matches!(role, ActorRole::Finance),
        Phase::BotanistApprovalProvided => matches!(role, ActorRole::Botanist),
        Phase::CertificateGenerationStart
        | Phase::InvoiceGenerationStart
        | Phase::SendingEmails
        | Phase::Complete => false,
    }
}

/// Phases a human can advance at all, in workflow order.
pub fn manual_phases() -> impl Iterator<Item = Phase> {
    greenseal_phases::ORDERED
        .into_iter()
        .filter(|phase| can_advance(*phase, ActorRole::Botanist) || can_advance(*phase, ActorRole::Finance))
}
