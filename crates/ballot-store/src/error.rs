use ballot_gate::{GateError, Rejection};
use ballot_types::{AccountId, CandidateId};

/// Errors produced by Ballot Store operations.
///
/// Every failure leaves the store exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BallotError {
    #[error("Only owner can perform this action")]
    Unauthorized { caller: AccountId },

    #[error("candidate {0} not found")]
    NotFound(CandidateId),

    #[error("Candidate does not exist.")]
    CandidateNotFound(CandidateId),

    #[error("You have already voted.")]
    AlreadyVoted { voter: AccountId },

    #[error("invalid candidate name: {0}")]
    InvalidName(String),

    #[error("gate error: {0}")]
    Gate(String),

    #[error("ballot lock poisoned")]
    LockPoisoned,

    #[error("corrupt journal at seq {seq}: {reason}")]
    CorruptJournal { seq: u64, reason: String },

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl BallotError {
    /// True for both absent-candidate kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::CandidateNotFound(_))
    }
}

impl From<Rejection> for BallotError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Unauthorized { caller } => Self::Unauthorized { caller },
            Rejection::NotFound(id) => Self::NotFound(id),
            Rejection::CandidateNotFound(id) => Self::CandidateNotFound(id),
            Rejection::AlreadyVoted { voter } => Self::AlreadyVoted { voter },
            Rejection::InvalidName(reason) => Self::InvalidName(reason),
        }
    }
}

impl From<GateError> for BallotError {
    fn from(err: GateError) -> Self {
        Self::Gate(err.to_string())
    }
}

impl From<std::io::Error> for BallotError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BallotError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience type alias for ballot operations.
pub type Result<T> = std::result::Result<T, BallotError>;
