use ballot_types::AccountId;

use crate::error::{BallotError, Result};
use crate::journal::JournalEntry;
use crate::snapshot::BallotSnapshot;
use crate::state::BallotState;
use crate::traits::BallotReader;

/// Result of replaying a journal from an empty ballot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub administrator: AccountId,
    pub applied_events: u64,
    pub snapshot: BallotSnapshot,
}

/// Deterministic replay of ballot journals.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Rebuild state by applying `journal` to an empty ballot owned by
    /// `administrator`.
    pub fn replay_journal(
        administrator: &AccountId,
        journal: &[JournalEntry],
    ) -> Result<ReplayResult> {
        let mut state = BallotState::new(administrator.clone());

        for entry in journal {
            let expected = state.journal().len() as u64 + 1;
            if entry.seq != expected {
                return Err(BallotError::CorruptJournal {
                    seq: entry.seq,
                    reason: format!("expected seq {expected}"),
                });
            }
            state.apply(entry.event.clone())?;
        }

        Ok(ReplayResult {
            administrator: administrator.clone(),
            applied_events: journal.len() as u64,
            snapshot: state.to_snapshot(),
        })
    }

    /// Replay the journal carried inside a snapshot.
    pub fn replay_snapshot(snapshot: &BallotSnapshot) -> Result<ReplayResult> {
        Self::replay_journal(&snapshot.administrator, &snapshot.journal)
    }

    /// Whether replaying a reader's journal reproduces its current state.
    pub fn verify_convergence<R: BallotReader>(reader: &R) -> Result<bool> {
        Self::snapshot_converges(&reader.snapshot()?)
    }

    /// Whether a snapshot's journal reproduces the snapshot's own state.
    pub fn snapshot_converges(snapshot: &BallotSnapshot) -> Result<bool> {
        let replayed = Self::replay_snapshot(snapshot)?;
        let converged = replayed.snapshot == *snapshot;
        if !converged {
            tracing::warn!(
                journal = snapshot.journal.len(),
                replayed_candidates = replayed.snapshot.candidates_count,
                recorded_candidates = snapshot.candidates_count,
                "ballot journal does not reproduce recorded state"
            );
        }
        Ok(converged)
    }
}

#[cfg(test)]
mod tests {
    use ballot_types::CandidateId;

    use super::*;
    use crate::memory::InMemoryBallotStore;
    use crate::traits::BallotWriter;

    fn owner() -> AccountId {
        AccountId::from_label("owner")
    }

    fn busy_store() -> InMemoryBallotStore {
        let store = InMemoryBallotStore::new(owner());
        store.add_candidate(&owner(), "A").unwrap();
        store.add_candidate(&owner(), "B").unwrap();
        store.add_candidate(&owner(), "C").unwrap();
        for (i, target) in [1u64, 2, 2, 3, 2].into_iter().enumerate() {
            let voter = AccountId::from_label(format!("voter-{i}"));
            store.vote(&voter, CandidateId(target)).unwrap();
        }
        store.remove_candidate(&owner(), CandidateId(1)).unwrap();
        store
    }

    #[test]
    fn replay_reproduces_live_state() {
        let store = busy_store();
        let result = ReplayEngine::replay_journal(&owner(), &store.journal().unwrap()).unwrap();
        assert_eq!(result.applied_events, 9);
        assert_eq!(result.snapshot, store.snapshot().unwrap());
        assert!(ReplayEngine::verify_convergence(&store).unwrap());
    }

    #[test]
    fn replay_empty_journal() {
        let result = ReplayEngine::replay_journal(&owner(), &[]).unwrap();
        assert_eq!(result.applied_events, 0);
        assert_eq!(result.snapshot.candidates_count, 0);
        assert_eq!(result.snapshot.id_counter, 0);
    }

    #[test]
    fn tampered_tally_does_not_converge() {
        let mut snapshot = busy_store().snapshot().unwrap();
        snapshot.candidates[0].vote_count += 10;
        assert!(!ReplayEngine::snapshot_converges(&snapshot).unwrap());
    }

    #[test]
    fn gap_in_sequence_is_corrupt() {
        let mut journal = busy_store().journal().unwrap();
        journal.remove(3);
        let err = ReplayEngine::replay_journal(&owner(), &journal).unwrap_err();
        assert!(matches!(err, BallotError::CorruptJournal { seq: 5, .. }));
    }

    #[test]
    fn journal_under_other_administrator_is_corrupt() {
        let journal = busy_store().journal().unwrap();
        let err =
            ReplayEngine::replay_journal(&AccountId::from_label("mallory"), &journal).unwrap_err();
        assert!(matches!(err, BallotError::CorruptJournal { seq: 1, .. }));
    }
}
