//! Serialized ballot state and its on-disk form.
//!
//! On-disk format is pretty-printed JSON:
//! ```text
//! {
//!   "version": 1,
//!   "administrator": ...,
//!   "id_counter": 2,
//!   "candidates_count": 1,
//!   "candidates": [ { "id": 2, "name": "B", "vote_count": 1 } ],
//!   "voters": [ ... ],
//!   "journal": [ { "seq": 1, "event": "candidate_added", ... } ]
//! }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use ballot_types::{AccountId, Candidate};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{BallotError, Result};
use crate::journal::JournalEntry;

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Full state of a Ballot Store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSnapshot {
    pub version: u32,
    pub administrator: AccountId,
    pub id_counter: u64,
    pub candidates_count: u64,
    /// Ordered by id.
    pub candidates: Vec<Candidate>,
    pub voters: BTreeSet<AccountId>,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
}

impl BallotSnapshot {
    /// Check the registry invariants a restored store relies on.
    pub fn check(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(BallotError::CorruptSnapshot(format!(
                "unsupported version {}, expected {SNAPSHOT_VERSION}",
                self.version
            )));
        }

        if self.candidates_count != self.candidates.len() as u64 {
            return Err(BallotError::CorruptSnapshot(format!(
                "candidates_count is {} but {} candidates are listed",
                self.candidates_count,
                self.candidates.len()
            )));
        }

        let mut previous = 0u64;
        for candidate in &self.candidates {
            let id = candidate.id.get();
            if id == 0 || id > self.id_counter {
                return Err(BallotError::CorruptSnapshot(format!(
                    "candidate id {} outside 1..={}",
                    candidate.id, self.id_counter
                )));
            }
            if id <= previous {
                return Err(BallotError::CorruptSnapshot(format!(
                    "candidate ids not strictly increasing at {}",
                    candidate.id
                )));
            }
            previous = id;
        }

        // Each voter adds at most one vote, and removals only discard votes.
        let tallied = self
            .candidates
            .iter()
            .try_fold(0u64, |sum, c| sum.checked_add(c.vote_count));
        match tallied {
            Some(total) if total <= self.voters.len() as u64 => {}
            _ => {
                return Err(BallotError::CorruptSnapshot(format!(
                    "tallies exceed the {} recorded voters",
                    self.voters.len()
                )))
            }
        }

        Ok(())
    }
}

/// Write a snapshot to `path`, replacing any previous file.
///
/// The data goes to a uniquely named temporary file in the same directory,
/// is synced to disk, and is then renamed into place, so readers never see
/// a half-written snapshot and concurrent writers never share a temp file.
pub fn save_snapshot(path: &Path, snapshot: &BallotSnapshot) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let encoded = serde_json::to_vec_pretty(snapshot)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&encoded)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!(
        path = %path.display(),
        candidates = snapshot.candidates_count,
        journal = snapshot.journal.len(),
        "ballot snapshot saved"
    );
    Ok(())
}

/// Read a snapshot written by [`save_snapshot`]. The snapshot is not checked
/// here; restoring it into a store does that.
pub fn load_snapshot(path: &Path) -> Result<BallotSnapshot> {
    let data = fs::read(path)?;
    let snapshot = serde_json::from_slice(&data)?;
    Ok(snapshot)
}
