use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use ballot_gate::{BallotGate, BallotRequest, GateConfig, RegistryView};
use ballot_types::{AccountId, Candidate, CandidateId};

use crate::error::{BallotError, Result};
use crate::journal::{BallotEvent, JournalEntry};
use crate::replay::ReplayEngine;
use crate::snapshot::BallotSnapshot;
use crate::state::BallotState;
use crate::traits::{BallotReader, BallotWriter};

/// In-memory Ballot Store.
///
/// The whole aggregate sits behind one `RwLock`. A mutation takes the write
/// lock, runs the gate against the locked state, and applies the event
/// before releasing it, so no caller observes a half-applied call.
pub struct InMemoryBallotStore {
    administrator: AccountId,
    gate: BallotGate,
    inner: RwLock<BallotState>,
}

impl InMemoryBallotStore {
    /// Create an empty ballot administered by `administrator`.
    pub fn new(administrator: AccountId) -> Self {
        Self::with_config(administrator, GateConfig::default())
    }

    pub fn with_config(administrator: AccountId, config: GateConfig) -> Self {
        Self::from_state(BallotState::new(administrator), config)
    }

    /// Rebuild a store from a snapshot after checking its invariants.
    ///
    /// A snapshot carrying a journal must also be reproduced by replaying
    /// that journal.
    pub fn restore(snapshot: BallotSnapshot, config: GateConfig) -> Result<Self> {
        snapshot.check()?;
        if !snapshot.journal.is_empty() && !ReplayEngine::snapshot_converges(&snapshot)? {
            return Err(BallotError::CorruptSnapshot(
                "journal does not reproduce the recorded state".into(),
            ));
        }
        let state = BallotState::from_snapshot(snapshot)?;
        tracing::info!(
            administrator = %state.administrator(),
            candidates = state.candidates_count(),
            journal = state.journal().len(),
            "ballot restored from snapshot"
        );
        Ok(Self::from_state(state, config))
    }

    pub(crate) fn from_state(state: BallotState, config: GateConfig) -> Self {
        Self {
            administrator: state.administrator().clone(),
            gate: BallotGate::with_default_stages(config),
            inner: RwLock::new(state),
        }
    }

    pub fn gate(&self) -> &BallotGate {
        &self.gate
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BallotState>> {
        self.inner.read().map_err(|_| BallotError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BallotState>> {
        self.inner.write().map_err(|_| BallotError::LockPoisoned)
    }

    /// Gate the request, then build and apply its event under one lock.
    fn submit(
        &self,
        request: BallotRequest,
        build: impl FnOnce(&BallotState) -> BallotEvent,
    ) -> Result<JournalEntry> {
        let mut state = self.write()?;
        self.gate.evaluate(&request, &*state)?.into_result()?;

        let event = build(&*state);
        let entry = state.apply(event)?.clone();
        tracing::debug!(
            seq = entry.seq,
            event = entry.event.kind(),
            caller = %request.caller(),
            "ballot mutation applied"
        );
        Ok(entry)
    }
}

impl BallotWriter for InMemoryBallotStore {
    fn add_candidate(&self, caller: &AccountId, name: &str) -> Result<CandidateId> {
        let request = BallotRequest::AddCandidate {
            caller: caller.clone(),
            name: name.to_string(),
        };
        let entry = self.submit(request, |state| BallotEvent::CandidateAdded {
            id: state.next_id(),
            name: name.to_string(),
            by: caller.clone(),
        })?;

        match entry.event {
            BallotEvent::CandidateAdded { id, .. } => Ok(id),
            _ => unreachable!(),
        }
    }

    fn remove_candidate(&self, caller: &AccountId, id: CandidateId) -> Result<()> {
        let request = BallotRequest::RemoveCandidate {
            caller: caller.clone(),
            id,
        };
        self.submit(request, |state| BallotEvent::CandidateRemoved {
            id,
            by: caller.clone(),
            discarded_votes: state.candidate(id).map(|c| c.vote_count).unwrap_or(0),
        })?;
        Ok(())
    }

    fn vote(&self, voter: &AccountId, candidate: CandidateId) -> Result<()> {
        let request = BallotRequest::Vote {
            voter: voter.clone(),
            candidate,
        };
        self.submit(request, |_| BallotEvent::VoteCast {
            voter: voter.clone(),
            candidate,
        })?;
        Ok(())
    }
}

impl BallotReader for InMemoryBallotStore {
    fn owner(&self) -> AccountId {
        self.administrator.clone()
    }

    fn total_votes(&self, id: CandidateId) -> Result<u64> {
        self.read()?
            .candidate(id)
            .map(|c| c.vote_count)
            .ok_or(BallotError::NotFound(id))
    }

    fn candidates_count(&self) -> Result<u64> {
        Ok(self.read()?.candidates_count())
    }

    fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.read()?.candidate(id).cloned())
    }

    fn candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.read()?.candidates().cloned().collect())
    }

    fn has_voted(&self, voter: &AccountId) -> Result<bool> {
        Ok(self.read()?.has_voted(voter))
    }

    fn voter_count(&self) -> Result<u64> {
        Ok(self.read()?.voter_count())
    }

    fn id_counter(&self) -> Result<u64> {
        Ok(self.read()?.id_counter())
    }

    fn journal(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.read()?.journal().to_vec())
    }

    fn journal_len(&self) -> Result<u64> {
        Ok(self.read()?.journal().len() as u64)
    }

    fn snapshot(&self) -> Result<BallotSnapshot> {
        Ok(self.read()?.to_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountId {
        AccountId::from_label("owner")
    }

    fn addr1() -> AccountId {
        AccountId::from_label("addr1")
    }

    /// Store with "Candidate A" (#1) and "Candidate B" (#2).
    fn seeded() -> InMemoryBallotStore {
        let store = InMemoryBallotStore::new(owner());
        store.add_candidate(&owner(), "Candidate A").unwrap();
        store.add_candidate(&owner(), "Candidate B").unwrap();
        store
    }

    #[test]
    fn sets_the_owner() {
        let store = InMemoryBallotStore::new(owner());
        assert_eq!(store.owner(), owner());
        assert_eq!(store.candidates_count().unwrap(), 0);
        assert_eq!(store.id_counter().unwrap(), 0);
    }

    #[test]
    fn owner_adds_candidates_with_sequential_ids() {
        let store = InMemoryBallotStore::new(owner());
        assert_eq!(store.add_candidate(&owner(), "A").unwrap(), CandidateId(1));
        assert_eq!(store.add_candidate(&owner(), "B").unwrap(), CandidateId(2));
        assert_eq!(store.candidates_count().unwrap(), 2);

        let listed: Vec<_> = store.candidates().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(listed, vec!["A", "B"]);
    }

    #[test]
    fn non_owner_cannot_add() {
        let store = seeded();
        let err = store.add_candidate(&addr1(), "Candidate C").unwrap_err();
        assert_eq!(err, BallotError::Unauthorized { caller: addr1() });
        assert_eq!(store.candidates_count().unwrap(), 2);
        assert_eq!(store.id_counter().unwrap(), 2);
        assert_eq!(store.journal_len().unwrap(), 2);
    }

    #[test]
    fn non_owner_cannot_remove() {
        let store = seeded();
        let err = store.remove_candidate(&addr1(), CandidateId(1)).unwrap_err();
        assert_eq!(err, BallotError::Unauthorized { caller: addr1() });
        assert_eq!(store.candidates_count().unwrap(), 2);
    }

    #[test]
    fn owner_removes_candidate() {
        let store = seeded();
        store.remove_candidate(&owner(), CandidateId(1)).unwrap();
        assert_eq!(store.candidates_count().unwrap(), 1);
        assert_eq!(
            store.total_votes(CandidateId(1)).unwrap_err(),
            BallotError::NotFound(CandidateId(1))
        );
        assert!(store.candidate(CandidateId(1)).unwrap().is_none());
    }

    #[test]
    fn removing_absent_candidate_is_not_found() {
        let store = seeded();
        let err = store.remove_candidate(&owner(), CandidateId(7)).unwrap_err();
        assert_eq!(err, BallotError::NotFound(CandidateId(7)));
        assert_eq!(store.candidates_count().unwrap(), 2);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let store = seeded();
        store.remove_candidate(&owner(), CandidateId(2)).unwrap();
        assert_eq!(store.add_candidate(&owner(), "C").unwrap(), CandidateId(3));
    }

    #[test]
    fn user_can_vote() {
        let store = seeded();
        store.vote(&addr1(), CandidateId(1)).unwrap();
        assert_eq!(store.total_votes(CandidateId(1)).unwrap(), 1);
        assert!(store.has_voted(&addr1()).unwrap());
    }

    #[test]
    fn user_cannot_vote_twice() {
        let store = seeded();
        store.vote(&addr1(), CandidateId(1)).unwrap();
        let err = store.vote(&addr1(), CandidateId(1)).unwrap_err();
        assert_eq!(err, BallotError::AlreadyVoted { voter: addr1() });
        assert_eq!(store.total_votes(CandidateId(1)).unwrap(), 1);

        // Switching target does not help either.
        let err = store.vote(&addr1(), CandidateId(2)).unwrap_err();
        assert!(matches!(err, BallotError::AlreadyVoted { .. }));
        assert_eq!(store.total_votes(CandidateId(2)).unwrap(), 0);
    }

    #[test]
    fn vote_for_nonexistent_candidate() {
        let store = seeded();
        let err = store.vote(&addr1(), CandidateId(3)).unwrap_err();
        assert_eq!(err, BallotError::CandidateNotFound(CandidateId(3)));
        assert!(err.is_not_found());
        assert!(!store.has_voted(&addr1()).unwrap());

        store.vote(&addr1(), CandidateId(2)).unwrap();
        assert_eq!(store.total_votes(CandidateId(2)).unwrap(), 1);
    }

    #[test]
    fn voter_of_removed_candidate_stays_marked() {
        let store = seeded();
        store.vote(&addr1(), CandidateId(1)).unwrap();
        store.remove_candidate(&owner(), CandidateId(1)).unwrap();

        assert!(store.has_voted(&addr1()).unwrap());
        let err = store.vote(&addr1(), CandidateId(2)).unwrap_err();
        assert!(matches!(err, BallotError::AlreadyVoted { .. }));

        let journal = store.journal().unwrap();
        assert_eq!(
            journal.last().unwrap().event,
            BallotEvent::CandidateRemoved {
                id: CandidateId(1),
                by: owner(),
                discarded_votes: 1,
            }
        );
    }

    #[test]
    fn failed_calls_leave_no_journal_entry() {
        let store = seeded();
        let _ = store.add_candidate(&addr1(), "X");
        let _ = store.remove_candidate(&owner(), CandidateId(9));
        let _ = store.vote(&addr1(), CandidateId(9));
        assert_eq!(store.journal_len().unwrap(), 2);
    }

    #[test]
    fn strict_config_applies_name_checks() {
        let store = InMemoryBallotStore::with_config(owner(), GateConfig::strict());
        let err = store.add_candidate(&owner(), "   ").unwrap_err();
        assert!(matches!(err, BallotError::InvalidName(_)));
        assert_eq!(store.id_counter().unwrap(), 0);
    }

    #[test]
    fn restore_rejects_tallies_without_voters() {
        let store = seeded();
        let mut snapshot = store.snapshot().unwrap();
        snapshot.journal.clear();
        snapshot.candidates[0].vote_count = 1000;

        let err = InMemoryBallotStore::restore(snapshot, GateConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, BallotError::CorruptSnapshot(_)));
    }

    #[test]
    fn restore_rejects_state_its_journal_does_not_reproduce() {
        let store = seeded();
        store.vote(&addr1(), CandidateId(1)).unwrap();
        let mut snapshot = store.snapshot().unwrap();
        // Moving the vote keeps the totals plausible but contradicts the journal.
        snapshot.candidates[0].vote_count = 0;
        snapshot.candidates[1].vote_count = 1;
        assert!(snapshot.check().is_ok());

        let err = InMemoryBallotStore::restore(snapshot, GateConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, BallotError::CorruptSnapshot(_)));
    }

    #[test]
    fn snapshot_restore_continues_numbering() {
        let store = seeded();
        store.vote(&addr1(), CandidateId(2)).unwrap();
        store.remove_candidate(&owner(), CandidateId(2)).unwrap();

        let restored =
            InMemoryBallotStore::restore(store.snapshot().unwrap(), GateConfig::default())
                .unwrap();
        assert_eq!(restored.owner(), owner());
        assert_eq!(restored.candidates_count().unwrap(), 1);
        assert!(restored.has_voted(&addr1()).unwrap());
        assert_eq!(
            restored.add_candidate(&owner(), "C").unwrap(),
            CandidateId(3)
        );
    }
}
