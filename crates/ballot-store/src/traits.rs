use ballot_types::{AccountId, Candidate, CandidateId};

use crate::error::Result;
use crate::journal::JournalEntry;
use crate::snapshot::BallotSnapshot;

/// Write boundary: the three gated mutations.
pub trait BallotWriter: Send + Sync {
    /// Register a candidate. Administrator only.
    fn add_candidate(&self, caller: &AccountId, name: &str) -> Result<CandidateId>;

    /// Drop a candidate and its tally. Administrator only.
    fn remove_candidate(&self, caller: &AccountId, id: CandidateId) -> Result<()>;

    /// Cast the voter's single vote.
    fn vote(&self, voter: &AccountId, candidate: CandidateId) -> Result<()>;
}

/// Read boundary: queries never change state.
pub trait BallotReader: Send + Sync {
    fn owner(&self) -> AccountId;

    fn total_votes(&self, id: CandidateId) -> Result<u64>;

    fn candidates_count(&self) -> Result<u64>;

    /// Returns `Ok(None)` if the candidate does not exist.
    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>>;

    /// Live candidates ordered by id.
    fn candidates(&self) -> Result<Vec<Candidate>>;

    fn has_voted(&self, voter: &AccountId) -> Result<bool>;

    fn voter_count(&self) -> Result<u64>;

    /// Highest id ever handed out.
    fn id_counter(&self) -> Result<u64>;

    fn journal(&self) -> Result<Vec<JournalEntry>>;

    fn journal_len(&self) -> Result<u64> {
        Ok(self.journal()?.len() as u64)
    }

    fn snapshot(&self) -> Result<BallotSnapshot>;
}
