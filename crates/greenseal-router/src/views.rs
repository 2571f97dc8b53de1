//! Phase content modules
//!
//! Each module exposes two independently testable halves selected by the
//! view mode: `render_summary` for historical/read-only rendering and
//! `render_editor` for the editable field set. Both are pure over the
//! submission read model; the presentation layer owns widgets and layout.

use greenseal_utils::types::{ActorRef, Phase, Submission};

use crate::PhaseContent;

/// The field set an editable rendering of a module exposes. Plain data, not
/// a UI artifact; field names follow the backend serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSpec {
    pub module: &'static str,
    pub fields: Vec<&'static str>,
}

fn actor_line(label: &str, actor: Option<&ActorRef>) -> String {
    match actor {
        Some(actor) => format!("{label}: {}", actor.name),
        None => format!("{label}: unassigned"),
    }
}

fn recipient_line(actor: &ActorRef) -> String {
    match &actor.email {
        Some(email) => format!("Recipient: {} <{email}>", actor.name),
        None => format!("Recipient: {} (no email on file)", actor.name),
    }
}

impl PhaseContent {
    /// Stable module key used in log fields and editor specs.
    #[must_use]
    pub const fn module_name(self) -> &'static str {
        match self {
            Self::DataEntry => "data_entry",
            Self::FinanceApproval => "finance_approval",
            Self::BotanistReview => "botanist_review",
            Self::Documents => "documents",
            Self::SendEmails => "send_emails",
            Self::Complete => "complete",
        }
    }

    /// Line-oriented read-only summary of this module's slice of the
    /// submission.
    #[must_use]
    pub fn render_summary(self, submission: &Submission) -> String {
        let mut out = String::new();

        match self {
            Self::DataEntry => {
                let case = submission.case_number.as_deref().unwrap_or("unnumbered");
                out.push_str(&format!("Case {case}\n"));
                match submission.received_at {
                    Some(received_at) => {
                        out.push_str(&format!("Received {}\n", received_at.format("%Y-%m-%d")));
                    }
                    None => out.push_str("Received date not recorded\n"),
                }
                out.push_str(&actor_line("Botanist", submission.approved_botanist.as_ref()));
                out.push('\n');
                out.push_str(&actor_line(
                    "Finance officer",
                    submission.finance_officer.as_ref(),
                ));
                out.push('\n');
                out.push_str(&format!("Bags: {}\n", submission.bags.len()));
                if submission.is_draft {
                    out.push_str("Draft submission\n");
                }
                if submission.is_urgent {
                    out.push_str("Urgent processing requested\n");
                }
            }
            Self::FinanceApproval => {
                out.push_str(&actor_line(
                    "Finance officer",
                    submission.finance_officer.as_ref(),
                ));
                out.push('\n');
                out.push_str(&format!("Billable bags: {}\n", submission.bags.len()));
                if submission.phase > Phase::FinanceApprovalProvided {
                    out.push_str("Fees approved\n");
                } else {
                    out.push_str("Awaiting fee approval\n");
                }
            }
            Self::BotanistReview => {
                for bag in &submission.bags {
                    let seal = bag.seal_number.as_deref().unwrap_or("unsealed");
                    match &bag.assessment {
                        Some(assessment) => out.push_str(&format!(
                            "Bag {seal}: {}\n",
                            assessment.determination.as_str()
                        )),
                        None => out.push_str(&format!("Bag {seal}: not assessed\n")),
                    }
                }
                let pending = greenseal_gate::unassessed_bag_count(submission);
                if pending > 0 {
                    out.push_str(&format!("{pending} bag(s) awaiting assessment\n"));
                }
            }
            Self::Documents => {
                let certificate = if submission.phase > Phase::CertificateGenerationStart {
                    "generated"
                } else if submission.phase == Phase::CertificateGenerationStart {
                    "in progress"
                } else {
                    "pending"
                };
                let invoice = if submission.phase > Phase::InvoiceGenerationStart {
                    "generated"
                } else if submission.phase == Phase::InvoiceGenerationStart {
                    "in progress"
                } else {
                    "pending"
                };
                out.push_str(&format!("Certificate: {certificate}\n"));
                out.push_str(&format!("Invoice: {invoice}\n"));
            }
            Self::SendEmails => {
                for actor in [
                    submission.approved_botanist.as_ref(),
                    submission.finance_officer.as_ref(),
                ]
                .into_iter()
                .flatten()
                {
                    out.push_str(&recipient_line(actor));
                    out.push('\n');
                }
                if submission.phase > Phase::SendingEmails {
                    out.push_str("Notifications dispatched\n");
                } else {
                    out.push_str("Notifications queued\n");
                }
            }
            Self::Complete => {
                let case = submission.case_number.as_deref().unwrap_or("unnumbered");
                out.push_str(&format!(
                    "Case {case} complete: {} bag(s) processed\n",
                    submission.bags.len()
                ));
            }
        }

        out
    }

    /// The editable field set for this module. Defined for every module so
    /// the router stays total; the generation, mailing and terminal modules
    /// expose only their re-trigger controls (or nothing).
    #[must_use]
    pub fn render_editor(self, _submission: &Submission) -> EditorSpec {
        let fields = match self {
            Self::DataEntry => vec![
                "case_number",
                "received_at",
                "is_urgent",
                "approved_botanist",
                "finance_officer",
                "bags",
            ],
            Self::FinanceApproval => vec!["finance_officer", "fee_notes"],
            Self::BotanistReview => vec!["bags[].determination", "bags[].notes"],
            Self::Documents => vec!["regenerate_certificate", "regenerate_invoice"],
            Self::SendEmails => vec!["resend_notifications"],
            Self::Complete => Vec::new(),
        };
        EditorSpec {
            module: self.module_name(),
            fields,
        }
    }
}
