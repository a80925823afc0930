//! The ordered record of successful mutations.

use ballot_types::{AccountId, CandidateId};
use serde::{Deserialize, Serialize};

/// A state change that went through the gate and was applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BallotEvent {
    CandidateAdded {
        id: CandidateId,
        name: String,
        by: AccountId,
    },
    CandidateRemoved {
        id: CandidateId,
        by: AccountId,
        /// Tally dropped together with the candidate.
        discarded_votes: u64,
    },
    VoteCast {
        voter: AccountId,
        candidate: CandidateId,
    },
}

impl BallotEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CandidateAdded { .. } => "candidate_added",
            Self::CandidateRemoved { .. } => "candidate_removed",
            Self::VoteCast { .. } => "vote_cast",
        }
    }
}

/// A journal slot. `seq` starts at 1 and has no gaps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    #[serde(flatten)]
    pub event: BallotEvent,
}
