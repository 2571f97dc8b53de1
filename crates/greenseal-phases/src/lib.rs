//! Phase registry for the submission workflow
//!
//! The registry is the single source of truth for phase ordering and display
//! metadata. Everything here is a total function over [`Phase`]; adding a
//! phase without updating the registry is a compile error, not a runtime
//! fallback.

use greenseal_utils::types::Phase;

/// The fixed phase sequence, index-stable.
///
/// Progress percentages, next-phase lookups and the phase indicator all
/// derive from positions in this array.
pub const ORDERED: [Phase; 8] = [
    Phase::DataEntryStart,
    Phase::FinanceApprovalProvided,
    Phase::BotanistApprovalProvided,
    Phase::InReview,
    Phase::CertificateGenerationStart,
    Phase::InvoiceGenerationStart,
    Phase::SendingEmails,
    Phase::Complete,
];

/// Position of `phase` in [`ORDERED`].
#[must_use]
pub const fn index_of(phase: Phase) -> usize {
    match phase {
        Phase::DataEntryStart => 0,
        Phase::FinanceApprovalProvided => 1,
        Phase::BotanistApprovalProvided => 2,
        Phase::InReview => 3,
        Phase::CertificateGenerationStart => 4,
        Phase::InvoiceGenerationStart => 5,
        Phase::SendingEmails => 6,
        Phase::Complete => 7,
    }
}

/// Human-facing label shown in the phase indicator.
#[must_use]
pub const fn display_name(phase: Phase) -> &'static str {
    match phase {
        Phase::DataEntryStart => "Data Entry",
        Phase::FinanceApprovalProvided => "Finance Approval",
        Phase::BotanistApprovalProvided => "Botanist Review",
        Phase::InReview => "In Review",
        Phase::CertificateGenerationStart => "Certificate Generation",
        Phase::InvoiceGenerationStart => "Invoice Generation",
        Phase::SendingEmails => "Sending Emails",
        Phase::Complete => "Complete",
    }
}

/// Icon hint for the phase indicator. Names, not glyphs; the presentation
/// layer owns the actual icon set.
#[must_use]
pub const fn icon(phase: Phase) -> &'static str {
    match phase {
        Phase::DataEntryStart => "pencil",
        Phase::FinanceApprovalProvided => "calculator",
        Phase::BotanistApprovalProvided => "leaf",
        Phase::InReview => "search",
        Phase::CertificateGenerationStart => "file-badge",
        Phase::InvoiceGenerationStart => "receipt",
        Phase::SendingEmails => "mail",
        Phase::Complete => "check-circle",
    }
}

/// One-line description of what happens in the phase.
#[must_use]
pub const fn description(phase: Phase) -> &'static str {
    match phase {
        Phase::DataEntryStart => "Case details, personnel and drug bags are recorded",
        Phase::FinanceApprovalProvided => "Finance officer approves the projected fees",
        Phase::BotanistApprovalProvided => "Botanist records a determination for every bag",
        Phase::InReview => "Final cross-check before documents are produced",
        Phase::CertificateGenerationStart => "Analysis certificate is being rendered",
        Phase::InvoiceGenerationStart => "Invoice is being rendered",
        Phase::SendingEmails => "Notifications are being sent to involved parties",
        Phase::Complete => "Submission is archived read-only",
    }
}

/// Overall progress through the workflow, as a rounded percentage.
///
/// `round((index + 1) / 8 * 100)`: 13 for the first phase, 100 for the last,
/// monotonically non-decreasing along the sequence.
#[must_use]
pub fn progress_percent(phase: Phase) -> u8 {
    let position = index_of(phase) + 1;
    ((position * 100) as f64 / ORDERED.len() as f64).round() as u8
}

/// The phase following `phase`, or `None` for the terminal phase.
#[must_use]
pub fn next_phase(phase: Phase) -> Option<Phase> {
    ORDERED.get(index_of(phase) + 1).copied()
}
