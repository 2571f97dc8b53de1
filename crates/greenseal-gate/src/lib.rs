//! Advancement blocker evaluation
//!
//! Blockers are data-completeness reasons a submission cannot leave its
//! current phase, independent of who is asking. They are recomputed from the
//! raw submission on every call; the data may have changed since the last
//! render, so nothing here caches.
//!
//! Message text and ordering are part of the observable contract: the UI
//! renders the returned list verbatim.

use greenseal_utils::types::{Phase, Submission};

/// Reasons `submission` cannot currently advance out of `current`.
///
/// Empty iff advancement is legal from a data-completeness standpoint. Role
/// permission is a separate question answered by the policy crate.
#[must_use]
pub fn blockers(submission: &Submission, current: Phase) -> Vec<String> {
    let mut reasons = Vec::new();

    match current {
        Phase::DataEntryStart => {
            if submission.approved_botanist.is_none() {
                reasons.push("Approved botanist must be assigned".to_string());
            }
            if submission.finance_officer.is_none() {
                reasons.push("Finance officer must be assigned".to_string());
            }
            if submission.bags.is_empty() {
                reasons.push("At least one drug bag must be added".to_string());
            }
            if submission.is_draft {
                reasons.push("Submission must not be a draft".to_string());
            }
        }
        Phase::BotanistApprovalProvided => {
            let pending = unassessed_bag_count(submission);
            if pending > 0 {
                reasons.push(format!("{pending} bag(s) still need botanical assessment"));
            }
        }
        // No local gating: finance/in-review advance on role alone, and the
        // generation, mailing and terminal phases are backend-driven.
        Phase::FinanceApprovalProvided
        | Phase::InReview
        | Phase::CertificateGenerationStart
        | Phase::InvoiceGenerationStart
        | Phase::SendingEmails
        | Phase::Complete => {}
    }

    reasons
}

/// Count of bags with no assessment, or one still marked pending.
///
/// Counted from the bags themselves rather than any backend "all assessed"
/// flag, so the gate cannot drift from the bag data.
#[must_use]
pub fn unassessed_bag_count(submission: &Submission) -> usize {
    submission.bags.iter().filter(|bag| !bag.is_assessed()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenseal_utils::types::{ActorRef, BagAssessment, Determination, DrugBag};

    fn actor(id: i64, name: &str) -> ActorRef {
        ActorRef {
            id,
            name: name.to_string(),
            email: None,
        }
    }

    fn bag(id: i64, determination: Option<Determination>) -> DrugBag {
        DrugBag {
            id,
            seal_number: None,
            weight_grams: None,
            assessment: determination.map(|determination| BagAssessment {
                determination,
                notes: None,
                assessed_at: None,
            }),
        }
    }

    fn empty_submission(phase: Phase) -> Submission {
        Submission {
            id: 1,
            phase,
            is_draft: false,
            is_urgent: false,
            case_number: None,
            received_at: None,
            approved_botanist: None,
            finance_officer: None,
            bags: Vec::new(),
        }
    }

    #[test]
    fn test_data_entry_reports_all_blockers_in_contract_order() {
        let mut submission = empty_submission(Phase::DataEntryStart);
        submission.is_draft = true;

        assert_eq!(
            blockers(&submission, Phase::DataEntryStart),
            vec![
                "Approved botanist must be assigned".to_string(),
                "Finance officer must be assigned".to_string(),
                "At least one drug bag must be added".to_string(),
                "Submission must not be a draft".to_string(),
            ]
        );
    }

    #[test]
    fn test_data_entry_clear_when_complete() {
        let mut submission = empty_submission(Phase::DataEntryStart);
        submission.approved_botanist = Some(actor(10, "R. Linden"));
        submission.finance_officer = Some(actor(11, "M. Okafor"));
        submission.bags.push(bag(1, None));

        assert!(blockers(&submission, Phase::DataEntryStart).is_empty());
    }

    #[test]
    fn test_data_entry_partial_blockers_keep_relative_order() {
        let mut submission = empty_submission(Phase::DataEntryStart);
        submission.approved_botanist = Some(actor(10, "R. Linden"));
        submission.is_draft = true;

        assert_eq!(
            blockers(&submission, Phase::DataEntryStart),
            vec![
                "Finance officer must be assigned".to_string(),
                "At least one drug bag must be added".to_string(),
                "Submission must not be a draft".to_string(),
            ]
        );
    }

    #[test]
    fn test_botanist_review_counts_pending_bags() {
        let mut submission = empty_submission(Phase::BotanistApprovalProvided);
        submission.bags.push(bag(1, Some(Determination::CannabisSativa)));
        submission.bags.push(bag(2, Some(Determination::CannabisSativa)));
        submission.bags.push(bag(3, Some(Determination::Pending)));

        assert_eq!(
            blockers(&submission, Phase::BotanistApprovalProvided),
            vec!["1 bag(s) still need botanical assessment".to_string()]
        );
    }

    #[test]
    fn test_botanist_review_counts_missing_assessments_too() {
        let mut submission = empty_submission(Phase::BotanistApprovalProvided);
        submission.bags.push(bag(1, None));
        submission.bags.push(bag(2, Some(Determination::Pending)));
        submission.bags.push(bag(3, Some(Determination::NotCannabis)));

        assert_eq!(unassessed_bag_count(&submission), 2);
        assert_eq!(
            blockers(&submission, Phase::BotanistApprovalProvided),
            vec!["2 bag(s) still need botanical assessment".to_string()]
        );
    }

    #[test]
    fn test_botanist_review_clear_when_all_assessed() {
        let mut submission = empty_submission(Phase::BotanistApprovalProvided);
        submission.bags.push(bag(1, Some(Determination::CannabisIndica)));
        submission.bags.push(bag(2, Some(Determination::Inconclusive)));

        assert!(blockers(&submission, Phase::BotanistApprovalProvided).is_empty());
    }

    #[test]
    fn test_other_phases_have_no_local_blockers() {
        // Even a thoroughly incomplete submission is not gated outside the
        // two phases with local rules.
        let mut submission = empty_submission(Phase::InReview);
        submission.is_draft = true;

        for phase in [
            Phase::FinanceApprovalProvided,
            Phase::InReview,
            Phase::CertificateGenerationStart,
            Phase::InvoiceGenerationStart,
            Phase::SendingEmails,
            Phase::Complete,
        ] {
            assert!(blockers(&submission, phase).is_empty(), "{phase:?}");
        }
    }
}
