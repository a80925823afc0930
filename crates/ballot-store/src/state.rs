//! The ballot aggregate and its single mutation path.
//!
//! Both the live store and replay go through [`BallotState::apply`], so a
//! journal rebuilt from scratch lands on the same state the store holds.

use std::collections::{BTreeMap, BTreeSet};

use ballot_gate::RegistryView;
use ballot_types::{AccountId, Candidate, CandidateId};

use crate::error::{BallotError, Result};
use crate::journal::{BallotEvent, JournalEntry};
use crate::snapshot::{BallotSnapshot, SNAPSHOT_VERSION};

/// Everything the Ballot Store owns.
#[derive(Clone, Debug)]
pub struct BallotState {
    administrator: AccountId,
    /// Last id handed out; 0 before the first add. Never decreases.
    id_counter: u64,
    /// Live candidates, kept alongside the registry rather than derived.
    candidates_count: u64,
    candidates: BTreeMap<CandidateId, Candidate>,
    voters: BTreeSet<AccountId>,
    journal: Vec<JournalEntry>,
}

impl BallotState {
    pub fn new(administrator: AccountId) -> Self {
        Self {
            administrator,
            id_counter: 0,
            candidates_count: 0,
            candidates: BTreeMap::new(),
            voters: BTreeSet::new(),
            journal: Vec::new(),
        }
    }

    pub fn administrator(&self) -> &AccountId {
        &self.administrator
    }

    pub fn id_counter(&self) -> u64 {
        self.id_counter
    }

    /// The id the next add will receive.
    pub fn next_id(&self) -> CandidateId {
        CandidateId(self.id_counter + 1)
    }

    pub fn candidates_count(&self) -> u64 {
        self.candidates_count
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(&id)
    }

    /// Live candidates ordered by id.
    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values()
    }

    pub fn voter_count(&self) -> u64 {
        self.voters.len() as u64
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    /// Apply an event and record it in the journal.
    ///
    /// Callers on the live path have already run the gate. The checks here
    /// guard replayed and restored journals, which never saw the gate.
    pub fn apply(&mut self, event: BallotEvent) -> Result<&JournalEntry> {
        let seq = self.journal.len() as u64 + 1;
        let corrupt = |reason: String| BallotError::CorruptJournal { seq, reason };

        match &event {
            BallotEvent::CandidateAdded { id, name, by } => {
                if by != &self.administrator {
                    return Err(corrupt(format!("candidate added by non-owner {by}")));
                }
                if *id != self.next_id() {
                    return Err(corrupt(format!(
                        "candidate id {id} out of sequence, expected {}",
                        self.next_id()
                    )));
                }
                self.candidates.insert(*id, Candidate::new(*id, name.clone()));
                self.id_counter += 1;
                self.candidates_count += 1;
            }
            BallotEvent::CandidateRemoved {
                id,
                by,
                discarded_votes,
            } => {
                if by != &self.administrator {
                    return Err(corrupt(format!("candidate removed by non-owner {by}")));
                }
                let tally = self
                    .candidates
                    .get(id)
                    .map(|c| c.vote_count)
                    .ok_or_else(|| corrupt(format!("removal of absent candidate {id}")))?;
                if tally != *discarded_votes {
                    return Err(corrupt(format!(
                        "removal of {id} discards {discarded_votes} votes, tally is {tally}"
                    )));
                }
                self.candidates.remove(id);
                self.candidates_count -= 1;
            }
            BallotEvent::VoteCast { voter, candidate } => {
                if self.voters.contains(voter) {
                    return Err(corrupt(format!("second vote by {voter}")));
                }
                let entry = self
                    .candidates
                    .get_mut(candidate)
                    .ok_or_else(|| corrupt(format!("vote for absent candidate {candidate}")))?;
                entry.vote_count += 1;
                self.voters.insert(voter.clone());
            }
        }

        self.journal.push(JournalEntry { seq, event });
        Ok(&self.journal[self.journal.len() - 1])
    }

    /// Capture the full state.
    pub fn to_snapshot(&self) -> BallotSnapshot {
        BallotSnapshot {
            version: SNAPSHOT_VERSION,
            administrator: self.administrator.clone(),
            id_counter: self.id_counter,
            candidates_count: self.candidates_count,
            candidates: self.candidates.values().cloned().collect(),
            voters: self.voters.clone(),
            journal: self.journal.clone(),
        }
    }

    /// Rebuild state from a snapshot, checking its invariants.
    pub fn from_snapshot(snapshot: BallotSnapshot) -> Result<Self> {
        snapshot.check()?;

        let candidates = snapshot
            .candidates
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(Self {
            administrator: snapshot.administrator,
            id_counter: snapshot.id_counter,
            candidates_count: snapshot.candidates_count,
            candidates,
            voters: snapshot.voters,
            journal: snapshot.journal,
        })
    }
}

impl RegistryView for BallotState {
    fn administrator(&self) -> &AccountId {
        &self.administrator
    }

    fn contains_candidate(&self, id: CandidateId) -> bool {
        self.candidates.contains_key(&id)
    }

    fn has_voted(&self, voter: &AccountId) -> bool {
        self.voters.contains(voter)
    }
}
