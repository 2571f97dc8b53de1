//! Workflow action orchestration
//!
//! Executes a confirmed phase advancement end to end: blocker validation,
//! the user-facing confirmation gate, then the backend advance call. The
//! orchestrator never mutates the submission itself; all mutation goes
//! through the injected [`AdvanceBackend`], and every outcome, including
//! cancellation and failure, is returned as a value rather than thrown.
//!
//! A per-submission in-flight guard makes overlapping advancement attempts
//! for the same submission resolve to [`AdvanceOutcome::AlreadyInProgress`]
//! without touching either collaborator. The guard is released by an RAII
//! drop, so an abandoned attempt (dropped future, timed-out dialog) cannot
//! leave a submission stuck in the in-flight state.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{Instrument, info, warn};

use greenseal_utils::logging::advance_span;
use greenseal_utils::types::{Phase, Submission};

/// User-facing confirmation dialog. Resolving `false` (or dismissing the
/// dialog) is a normal outcome, not an error.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self) -> bool;
}

/// The backend advance operation. The backend owns persistence and the
/// phase-history audit trail; a rejection here surfaces as
/// [`AdvanceOutcome::Failed`] with the error's message.
#[async_trait]
pub trait AdvanceBackend: Send + Sync {
    async fn advance(&self, submission_id: i64, target: Phase) -> anyhow::Result<()>;
}

/// Tagged outcome of an advancement attempt.
///
/// Only `Failed` represents something going wrong; the other non-`Advanced`
/// variants are ordinary user or state outcomes and are never logged as
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The backend accepted the transition to the given phase.
    Advanced(Phase),
    /// The user declined (or abandoned) the confirmation dialog.
    Cancelled,
    /// Data-completeness blockers prevent advancement; the list is
    /// user-renderable verbatim.
    Blocked(Vec<String>),
    /// The backend call failed; retry is a user-initiated re-invocation.
    Failed(String),
    /// Another advancement for the same submission is still in flight.
    AlreadyInProgress,
}

/// Orchestrates advancement attempts across submissions.
///
/// Cheap to clone via the shared in-flight set; typically one instance per
/// process.
#[derive(Debug, Clone, Default)]
pub struct WorkflowOrchestrator {
    in_flight: Arc<Mutex<HashSet<i64>>>,
    confirm_timeout: Option<Duration>,
}

fn lock(set: &Mutex<HashSet<i64>>) -> MutexGuard<'_, HashSet<i64>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the in-flight claim when dropped, including when the owning
/// future is abandoned mid-await.
struct InFlightClaim {
    set: Arc<Mutex<HashSet<i64>>>,
    submission_id: i64,
}

impl InFlightClaim {
    fn acquire(set: &Arc<Mutex<HashSet<i64>>>, submission_id: i64) -> Option<Self> {
        if !lock(set).insert(submission_id) {
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            submission_id,
        })
    }
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.submission_id);
    }
}

impl WorkflowOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the confirmation await. An unanswered dialog past the limit
    /// resolves as [`AdvanceOutcome::Cancelled`]; without a limit the drop
    /// guard still releases the in-flight claim if the caller gives up.
    #[must_use]
    pub fn with_confirm_timeout(timeout: Duration) -> Self {
        Self {
            in_flight: Arc::default(),
            confirm_timeout: Some(timeout),
        }
    }

    /// Whether an advancement for `submission_id` is currently in flight.
    /// Intended for spinner/disable state on the advance control.
    #[must_use]
    pub fn in_flight(&self, submission_id: i64) -> bool {
        lock(&self.in_flight).contains(&submission_id)
    }

    /// Attempt to advance `submission` to `target`.
    ///
    /// Step order is part of the contract: in-flight check, blocker
    /// validation, confirmation, backend call. `gate` and `backend` are
    /// only reached when every earlier step passed.
    pub async fn advance(
        &self,
        submission: &Submission,
        target: Phase,
        gate: &dyn ConfirmationGate,
        backend: &dyn AdvanceBackend,
    ) -> AdvanceOutcome {
        let span = advance_span(submission.id, submission.phase.as_str(), target.as_str());

        let Some(_claim) = InFlightClaim::acquire(&self.in_flight, submission.id) else {
            return AdvanceOutcome::AlreadyInProgress;
        };

        async {
            let reasons = greenseal_gate::blockers(submission, submission.phase);
            if !reasons.is_empty() {
                info!(blocker_count = reasons.len(), "advancement blocked");
                return AdvanceOutcome::Blocked(reasons);
            }

            let confirmed = match self.confirm_timeout {
                Some(limit) => tokio::time::timeout(limit, gate.confirm())
                    .await
                    .unwrap_or(false),
                None => gate.confirm().await,
            };
            if !confirmed {
                info!("advancement cancelled at confirmation");
                return AdvanceOutcome::Cancelled;
            }

            match backend.advance(submission.id, target).await {
                Ok(()) => {
                    info!("advancement accepted by backend");
                    AdvanceOutcome::Advanced(target)
                }
                Err(err) => {
                    warn!(error = %err, "backend rejected advancement");
                    AdvanceOutcome::Failed(err.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Mutex as AsyncMutex, oneshot};

    use greenseal_utils::types::{ActorRef, BagAssessment, Determination, DrugBag};

    struct YesGate;

    #[async_trait]
    impl ConfirmationGate for YesGate {
        async fn confirm(&self) -> bool {
            true
        }
    }

    struct NoGate;

    #[async_trait]
    impl ConfirmationGate for NoGate {
        async fn confirm(&self) -> bool {
            false
        }
    }

    /// Parks on confirmation until the test releases it via the channel.
    struct HeldGate {
        release: AsyncMutex<Option<oneshot::Receiver<bool>>>,
    }

    impl HeldGate {
        fn new() -> (Self, oneshot::Sender<bool>) {
            let (tx, rx) = oneshot::channel();
            (
                Self {
                    release: AsyncMutex::new(Some(rx)),
                },
                tx,
            )
        }
    }

    #[async_trait]
    impl ConfirmationGate for HeldGate {
        async fn confirm(&self) -> bool {
            let receiver = self.release.lock().await.take();
            match receiver {
                Some(receiver) => receiver.await.unwrap_or(false),
                None => false,
            }
        }
    }

    /// Never resolves; models an abandoned dialog.
    struct AbandonedGate;

    #[async_trait]
    impl ConfirmationGate for AbandonedGate {
        async fn confirm(&self) -> bool {
            std::future::pending::<bool>().await
        }
    }

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl CountingBackend {
        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(message.to_string()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AdvanceBackend for CountingBackend {
        async fn advance(&self, _submission_id: i64, _target: Phase) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(message) => Err(anyhow::anyhow!("{message}")),
                None => Ok(()),
            }
        }
    }

    fn ready_submission(id: i64, phase: Phase) -> Submission {
        Submission {
            id,
            phase,
            is_draft: false,
            is_urgent: false,
            case_number: Some("GS-2026-0007".to_string()),
            received_at: None,
            approved_botanist: Some(ActorRef {
                id: 10,
                name: "R. Linden".to_string(),
                email: None,
            }),
            finance_officer: Some(ActorRef {
                id: 11,
                name: "M. Okafor".to_string(),
                email: None,
            }),
            bags: vec![DrugBag {
                id: 1,
                seal_number: None,
                weight_grams: None,
                assessment: Some(BagAssessment {
                    determination: Determination::CannabisSativa,
                    notes: None,
                    assessed_at: None,
                }),
            }],
        }
    }

    #[tokio::test]
    async fn test_blocked_submission_never_reaches_collaborators() {
        let orchestrator = WorkflowOrchestrator::new();
        let backend = CountingBackend::default();

        let mut submission = ready_submission(1, Phase::DataEntryStart);
        submission.approved_botanist = None;
        submission.is_draft = true;

        let outcome = orchestrator
            .advance(
                &submission,
                Phase::FinanceApprovalProvided,
                &YesGate,
                &backend,
            )
            .await;

        match outcome {
            AdvanceOutcome::Blocked(reasons) => {
                assert_eq!(
                    reasons,
                    vec![
                        "Approved botanist must be assigned".to_string(),
                        "Submission must not be a draft".to_string(),
                    ]
                );
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_declined_confirmation_is_cancelled_without_backend_call() {
        let orchestrator = WorkflowOrchestrator::new();
        let backend = CountingBackend::default();
        let submission = ready_submission(2, Phase::InReview);

        let outcome = orchestrator
            .advance(
                &submission,
                Phase::CertificateGenerationStart,
                &NoGate,
                &backend,
            )
            .await;

        assert_eq!(outcome, AdvanceOutcome::Cancelled);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_confirmed_advancement_reaches_backend() {
        let orchestrator = WorkflowOrchestrator::new();
        let backend = CountingBackend::default();
        let submission = ready_submission(3, Phase::DataEntryStart);

        let outcome = orchestrator
            .advance(
                &submission,
                Phase::FinanceApprovalProvided,
                &YesGate,
                &backend,
            )
            .await;

        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced(Phase::FinanceApprovalProvided)
        );
        assert_eq!(backend.calls(), 1);
        assert!(!orchestrator.in_flight(3));
    }

    #[tokio::test]
    async fn test_backend_rejection_surfaces_message_without_retry() {
        let orchestrator = WorkflowOrchestrator::new();
        let backend = CountingBackend::failing("submission was modified concurrently");
        let submission = ready_submission(4, Phase::DataEntryStart);

        let outcome = orchestrator
            .advance(
                &submission,
                Phase::FinanceApprovalProvided,
                &YesGate,
                &backend,
            )
            .await;

        assert_eq!(
            outcome,
            AdvanceOutcome::Failed("submission was modified concurrently".to_string())
        );
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_concurrent_advance_is_already_in_progress() {
        let orchestrator = Arc::new(WorkflowOrchestrator::new());
        let backend = Arc::new(CountingBackend::default());
        let submission = Arc::new(ready_submission(5, Phase::InReview));
        let (gate, release) = HeldGate::new();
        let gate = Arc::new(gate);

        let first = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            let backend = Arc::clone(&backend);
            let submission = Arc::clone(&submission);
            let gate = Arc::clone(&gate);
            async move {
                orchestrator
                    .advance(
                        &submission,
                        Phase::CertificateGenerationStart,
                        gate.as_ref(),
                        backend.as_ref(),
                    )
                    .await
            }
        });

        // Wait until the first attempt holds the claim and is parked at the
        // confirmation gate.
        while !orchestrator.in_flight(5) {
            tokio::task::yield_now().await;
        }

        let second = orchestrator
            .advance(
                &submission,
                Phase::CertificateGenerationStart,
                &YesGate,
                backend.as_ref(),
            )
            .await;
        assert_eq!(second, AdvanceOutcome::AlreadyInProgress);
        assert_eq!(backend.calls(), 0);

        release.send(true).expect("first attempt still waiting");
        let first = first.await.expect("first attempt panicked");
        assert_eq!(
            first,
            AdvanceOutcome::Advanced(Phase::CertificateGenerationStart)
        );
        assert_eq!(backend.calls(), 1);
        assert!(!orchestrator.in_flight(5));
    }

    #[tokio::test]
    async fn test_different_submissions_advance_independently() {
        let orchestrator = Arc::new(WorkflowOrchestrator::new());
        let backend = Arc::new(CountingBackend::default());
        let (gate, release) = HeldGate::new();
        let gate = Arc::new(gate);

        let held = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            let backend = Arc::clone(&backend);
            let gate = Arc::clone(&gate);
            async move {
                let submission = ready_submission(6, Phase::InReview);
                orchestrator
                    .advance(
                        &submission,
                        Phase::CertificateGenerationStart,
                        gate.as_ref(),
                        backend.as_ref(),
                    )
                    .await
            }
        });

        while !orchestrator.in_flight(6) {
            tokio::task::yield_now().await;
        }

        // A different submission id is not affected by the held claim.
        let other = ready_submission(7, Phase::DataEntryStart);
        let outcome = orchestrator
            .advance(
                &other,
                Phase::FinanceApprovalProvided,
                &YesGate,
                backend.as_ref(),
            )
            .await;
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced(Phase::FinanceApprovalProvided)
        );

        release.send(false).expect("held attempt still waiting");
        assert_eq!(
            held.await.expect("held attempt panicked"),
            AdvanceOutcome::Cancelled
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_attempt_releases_in_flight_claim() {
        let orchestrator = WorkflowOrchestrator::new();
        let backend = CountingBackend::default();
        let submission = ready_submission(8, Phase::InReview);

        let attempt = orchestrator.advance(
            &submission,
            Phase::CertificateGenerationStart,
            &AbandonedGate,
            &backend,
        );
        let abandoned = tokio::time::timeout(Duration::from_millis(50), attempt).await;

        assert!(abandoned.is_err(), "gate should never have resolved");
        assert!(!orchestrator.in_flight(8));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_timeout_resolves_as_cancelled() {
        let orchestrator = WorkflowOrchestrator::with_confirm_timeout(Duration::from_secs(30));
        let backend = CountingBackend::default();
        let submission = ready_submission(9, Phase::InReview);

        let outcome = orchestrator
            .advance(
                &submission,
                Phase::CertificateGenerationStart,
                &AbandonedGate,
                &backend,
            )
            .await;

        assert_eq!(outcome, AdvanceOutcome::Cancelled);
        assert_eq!(backend.calls(), 0);
        assert!(!orchestrator.in_flight(9));
    }
}
