use std::fmt;
use std::time::Duration;

use ballot_types::{AccountId, CandidateId};
use serde::{Deserialize, Serialize};

use crate::config::GateConfig;
use crate::error::GateError;

// ---------------------------------------------------------------------------
// BallotRequest
// ---------------------------------------------------------------------------

/// A mutating call on the ballot, described before it is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallotRequest {
    AddCandidate { caller: AccountId, name: String },
    RemoveCandidate { caller: AccountId, id: CandidateId },
    Vote { voter: AccountId, candidate: CandidateId },
}

impl BallotRequest {
    /// The identity issuing the request.
    pub fn caller(&self) -> &AccountId {
        match self {
            Self::AddCandidate { caller, .. } | Self::RemoveCandidate { caller, .. } => caller,
            Self::Vote { voter, .. } => voter,
        }
    }

    /// Registry mutations are reserved for the administrator.
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::AddCandidate { .. } | Self::RemoveCandidate { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddCandidate { .. } => "add_candidate",
            Self::RemoveCandidate { .. } => "remove_candidate",
            Self::Vote { .. } => "vote",
        }
    }
}

// ---------------------------------------------------------------------------
// RegistryView
// ---------------------------------------------------------------------------

/// Read-only view of ballot state that stages evaluate against.
///
/// The store implements this on its locked state so a request is judged
/// against exactly the state it would mutate.
pub trait RegistryView {
    fn administrator(&self) -> &AccountId;
    fn contains_candidate(&self, id: CandidateId) -> bool;
    fn has_voted(&self, voter: &AccountId) -> bool;
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

/// Why a request was turned away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Caller is not the administrator on a restricted request.
    Unauthorized { caller: AccountId },
    /// Registry lookup for an absent id.
    NotFound(CandidateId),
    /// Vote for an absent id.
    CandidateNotFound(CandidateId),
    /// Voter already has a recorded vote.
    AlreadyVoted { voter: AccountId },
    /// Candidate name failed an enabled name check.
    InvalidName(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized { caller } => write!(f, "unauthorized caller {caller}"),
            Self::NotFound(id) => write!(f, "candidate {id} not found"),
            Self::CandidateNotFound(id) => write!(f, "vote target {id} does not exist"),
            Self::AlreadyVoted { voter } => write!(f, "{voter} has already voted"),
            Self::InvalidName(reason) => write!(f, "invalid name: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// StageDecision / StageResult
// ---------------------------------------------------------------------------

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    Pass,
    Fail(Rejection),
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage_name: String,
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateContext
// ---------------------------------------------------------------------------

/// Everything a stage may consult besides the request itself.
pub struct GateContext<'a> {
    pub view: &'a dyn RegistryView,
    pub config: &'a GateConfig,
}

impl<'a> GateContext<'a> {
    pub fn new(view: &'a dyn RegistryView, config: &'a GateConfig) -> Self {
        Self { view, config }
    }
}

// ---------------------------------------------------------------------------
// GateStage trait
// ---------------------------------------------------------------------------

/// A single evaluation stage in the gate pipeline.
///
/// The trait is object-safe and `Send + Sync` so stages can be stored in
/// a `Vec<Box<dyn GateStage>>`.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "administrator", "voter").
    fn name(&self) -> &str;

    /// Evaluate the request and return a decision.
    fn evaluate(
        &self,
        request: &BallotRequest,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError>;
}
