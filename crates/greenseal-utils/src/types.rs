use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase identifiers for the submission approval workflow.
///
/// `Phase` represents the stages a forensic submission passes through on its
/// way from intake to completion. Phases execute in a fixed order; a
/// submission is only ever moved backwards by the backend's send-back
/// operation, which records a reason.
///
/// # Phase Order
///
/// ```text
/// DataEntryStart → FinanceApprovalProvided → BotanistApprovalProvided
///   → InReview → CertificateGenerationStart → InvoiceGenerationStart
///   → SendingEmails → Complete
/// ```
///
/// The first four phases are advanced manually by privileged users; the
/// generation and mailing phases advance automatically as the backend's
/// document and mail jobs finish.
///
/// # Example
///
/// ```rust
/// use greenseal_utils::types::Phase;
///
/// let phase = Phase::DataEntryStart;
/// assert_eq!(phase.as_str(), "data_entry_start");
/// assert_eq!(Phase::parse("complete"), Some(Phase::Complete));
/// assert_eq!(Phase::parse("archived"), None);
/// ```
///
/// # Serialization
///
/// `Phase` serializes to the backend's snake_case wire names
/// (e.g. `"data_entry_start"`, `"in_review"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Intake: case details, personnel assignments and drug bags are recorded.
    DataEntryStart,
    /// Finance officer reviews and approves the projected fees.
    FinanceApprovalProvided,
    /// Botanist assesses every drug bag and records a determination.
    BotanistApprovalProvided,
    /// Final cross-check of the assembled submission before documents.
    InReview,
    /// Backend job renders the analysis certificate.
    CertificateGenerationStart,
    /// Backend job renders the invoice.
    InvoiceGenerationStart,
    /// Backend mailer notifies the involved parties.
    SendingEmails,
    /// Terminal phase; the submission is archived read-only.
    Complete,
}

impl Phase {
    /// Returns the canonical wire name of the phase.
    ///
    /// This is the lowercase name used by the backend serializers, the CLI
    /// and log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DataEntryStart => "data_entry_start",
            Self::FinanceApprovalProvided => "finance_approval_provided",
            Self::BotanistApprovalProvided => "botanist_approval_provided",
            Self::InReview => "in_review",
            Self::CertificateGenerationStart => "certificate_generation_start",
            Self::InvoiceGenerationStart => "invoice_generation_start",
            Self::SendingEmails => "sending_emails",
            Self::Complete => "complete",
        }
    }

    /// Parses a wire name back into a `Phase`.
    ///
    /// Returns `None` for unrecognized keys; callers at the backend boundary
    /// treat that as schema drift, not a panic.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "data_entry_start" => Some(Self::DataEntryStart),
            "finance_approval_provided" => Some(Self::FinanceApprovalProvided),
            "botanist_approval_provided" => Some(Self::BotanistApprovalProvided),
            "in_review" => Some(Self::InReview),
            "certificate_generation_start" => Some(Self::CertificateGenerationStart),
            "invoice_generation_start" => Some(Self::InvoiceGenerationStart),
            "sending_emails" => Some(Self::SendingEmails),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }
}

/// Workflow permission class of the authenticated session.
///
/// Supplied by the session layer, never derived by this engine. Unknown role
/// strings map to [`ActorRole::None`] so a misconfigured session degrades to
/// read-only rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Botanist,
    Finance,
    None,
}

impl ActorRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Botanist => "botanist",
            Self::Finance => "finance",
            Self::None => "none",
        }
    }

    /// Maps a session role string to a role, defaulting to `None`.
    #[must_use]
    pub fn from_session_str(raw: &str) -> Self {
        match raw {
            "botanist" => Self::Botanist,
            "finance" => Self::Finance,
            _ => Self::None,
        }
    }
}

/// Reference to a person assigned to a submission (botanist, finance officer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Botanical determination recorded for a drug bag.
///
/// `Pending` is the backend's "not yet assessed" marker; every other variant
/// counts as an assessment for gating purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Determination {
    Pending,
    CannabisSativa,
    CannabisIndica,
    NotCannabis,
    Inconclusive,
}

impl Determination {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::CannabisSativa => "cannabis_sativa",
            Self::CannabisIndica => "cannabis_indica",
            Self::NotCannabis => "not_cannabis",
            Self::Inconclusive => "inconclusive",
        }
    }
}

/// Botanist's assessment of a single drug bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagAssessment {
    pub determination: Determination,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assessed_at: Option<DateTime<Utc>>,
}

/// A physical drug bag attached to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugBag {
    pub id: i64,
    #[serde(default)]
    pub seal_number: Option<String>,
    #[serde(default)]
    pub weight_grams: Option<f64>,
    #[serde(default)]
    pub assessment: Option<BagAssessment>,
}

impl DrugBag {
    /// Whether the bag carries a real determination.
    ///
    /// Derived from the raw assessment, never from a backend convenience
    /// flag, so gating cannot diverge from the bag data.
    #[must_use]
    pub fn is_assessed(&self) -> bool {
        self.assessment
            .as_ref()
            .is_some_and(|a| a.determination != Determination::Pending)
    }
}

/// Read model of a submission as served by the backend.
///
/// The engine proposes and validates phase transitions against this view but
/// never persists it; all mutation goes through the injected advance
/// operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub phase: Phase,
    pub is_draft: bool,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_botanist: Option<ActorRef>,
    #[serde(default)]
    pub finance_officer: Option<ActorRef>,
    #[serde(default)]
    pub bags: Vec<DrugBag>,
}
