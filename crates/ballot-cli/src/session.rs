use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use ballot_gate::GateConfig;
use ballot_store::{load_snapshot, save_snapshot, BallotReader, InMemoryBallotStore};
use ballot_types::{AccountId, CandidateId};

/// How long a writer waits for another writer's lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY: Duration = Duration::from_millis(5);

/// A ballot persisted as a JSON snapshot on disk.
///
/// Every command opens the file and works on an in-memory store. Mutating
/// commands hold `<state>.lock` from load to save, and write the snapshot
/// back only after the operation succeeded.
pub struct Session {
    path: PathBuf,
    gate: GateConfig,
    lock_timeout: Duration,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>, gate: GateConfig) -> Self {
        Self {
            path: path.into(),
            gate,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty ballot file. Refuses to clobber an existing ballot
    /// unless `force` is set.
    pub fn init(&self, administrator: AccountId, force: bool) -> anyhow::Result<InMemoryBallotStore> {
        let _lock = StateLock::acquire(&self.path, self.lock_timeout)?;
        if self.path.exists() && !force {
            bail!(
                "ballot already exists at {} (use --force to overwrite)",
                self.path.display()
            );
        }
        let store = InMemoryBallotStore::with_config(administrator, self.gate.clone());
        self.save(&store)?;
        Ok(store)
    }

    pub fn open(&self) -> anyhow::Result<InMemoryBallotStore> {
        if !self.path.exists() {
            bail!(
                "no ballot at {} (run `ballot init` first)",
                self.path.display()
            );
        }
        let snapshot = load_snapshot(&self.path)
            .with_context(|| format!("loading {}", self.path.display()))?;
        Ok(InMemoryBallotStore::restore(snapshot, self.gate.clone())?)
    }

    pub fn save(&self, store: &InMemoryBallotStore) -> anyhow::Result<()> {
        save_snapshot(&self.path, &store.snapshot()?)
            .with_context(|| format!("saving {}", self.path.display()))?;
        Ok(())
    }

    /// Open, run `op`, and persist only if `op` succeeded, all under the
    /// state lock.
    pub fn mutate<T>(
        &self,
        op: impl FnOnce(&InMemoryBallotStore) -> ballot_store::Result<T>,
    ) -> anyhow::Result<T> {
        let _lock = StateLock::acquire(&self.path, self.lock_timeout)?;
        let store = self.open()?;
        let out = op(&store)?;
        self.save(&store)?;
        Ok(out)
    }
}

/// Exclusive hold on a ballot file, taken by creating `<state>.lock` and
/// released on drop.
struct StateLock {
    path: PathBuf,
}

impl StateLock {
    fn acquire(state: &Path, timeout: Duration) -> anyhow::Result<Self> {
        let mut raw = state.as_os_str().to_owned();
        raw.push(".lock");
        let path = PathBuf::from(raw);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let deadline = Instant::now() + timeout;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    tracing::debug!(lock = %path.display(), "ballot lock acquired");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        bail!(
                            "ballot is locked ({} exists; remove it if no other ballot command is running)",
                            path.display()
                        );
                    }
                    thread::sleep(LOCK_RETRY);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("creating {}", path.display()));
                }
            }
        }
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release ballot lock");
        }
    }
}

/// Accept a 64-char hex id (optionally `acct:`-prefixed); anything else is
/// treated as a label and derived.
pub fn parse_identity(raw: &str) -> AccountId {
    AccountId::from_hex(raw).unwrap_or_else(|_| AccountId::from_label(raw))
}

pub fn parse_candidate(raw: &str) -> anyhow::Result<CandidateId> {
    raw.parse::<CandidateId>()
        .with_context(|| format!("invalid candidate id `{raw}`"))
}

#[cfg(test)]
mod tests {
    use ballot_store::{BallotError, BallotWriter, ReplayEngine};

    use super::*;

    fn session(dir: &tempfile::TempDir) -> Session {
        Session::new(dir.path().join("ballot.json"), GateConfig::default())
    }

    fn owner() -> AccountId {
        parse_identity("owner")
    }

    #[test]
    fn identities_from_hex_or_label() {
        let id = AccountId::from_label("alice");
        assert_eq!(parse_identity(&id.to_hex()), id);
        assert_eq!(parse_identity(&format!("acct:{}", id.to_hex())), id);
        assert_eq!(parse_identity("alice"), id);
        // Short hex is still just a label.
        assert_eq!(parse_identity("abcd"), AccountId::from_label("abcd"));
    }

    #[test]
    fn candidate_ids_parse() {
        assert_eq!(parse_candidate("3").unwrap(), CandidateId(3));
        assert_eq!(parse_candidate("#3").unwrap(), CandidateId(3));
        assert!(parse_candidate("three").is_err());
    }

    #[test]
    fn open_without_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(session(&dir).open().is_err());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir);
        s.init(owner(), false).unwrap();
        assert!(s.init(parse_identity("other"), false).is_err());

        s.init(parse_identity("other"), true).unwrap();
        assert_eq!(s.open().unwrap().owner(), parse_identity("other"));
    }

    #[test]
    fn mutations_persist_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir);
        s.init(owner(), false).unwrap();

        let id = s.mutate(|store| store.add_candidate(&owner(), "Candidate A")).unwrap();
        assert_eq!(id, CandidateId(1));
        s.mutate(|store| store.vote(&parse_identity("addr1"), id)).unwrap();

        let reopened = s.open().unwrap();
        assert_eq!(reopened.total_votes(id).unwrap(), 1);
        assert!(reopened.has_voted(&parse_identity("addr1")).unwrap());
        assert!(ReplayEngine::verify_convergence(&reopened).unwrap());
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir);
        s.init(owner(), false).unwrap();
        let before = std::fs::read(s.path()).unwrap();

        let err = s
            .mutate(|store| store.add_candidate(&parse_identity("addr1"), "X"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BallotError>(),
            Some(BallotError::Unauthorized { .. })
        ));
        assert_eq!(std::fs::read(s.path()).unwrap(), before);
    }

    #[test]
    fn concurrent_mutations_are_all_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir);
        s.init(owner(), false).unwrap();
        let id = s.mutate(|store| store.add_candidate(&owner(), "Candidate A")).unwrap();

        let voters = 16;
        thread::scope(|scope| {
            for i in 0..voters {
                let s = &s;
                scope.spawn(move || {
                    let voter = parse_identity(&format!("voter-{i}"));
                    s.mutate(|store| store.vote(&voter, id)).unwrap();
                });
            }
        });

        let reopened = s.open().unwrap();
        assert_eq!(reopened.total_votes(id).unwrap(), voters);
        assert_eq!(reopened.voter_count().unwrap(), voters);
        assert!(ReplayEngine::verify_convergence(&reopened).unwrap());
    }

    #[test]
    fn lock_is_released_after_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir);
        s.init(owner(), false).unwrap();
        let _ = s.mutate(|store| store.add_candidate(&parse_identity("addr1"), "X"));
        s.mutate(|store| store.add_candidate(&owner(), "A")).unwrap();
        assert!(!dir.path().join("ballot.json.lock").exists());
    }

    #[test]
    fn held_lock_blocks_writers() {
        let dir = tempfile::tempdir().unwrap();
        let s = session(&dir).with_lock_timeout(Duration::from_millis(50));
        s.init(owner(), false).unwrap();
        let before = std::fs::read(s.path()).unwrap();

        std::fs::write(dir.path().join("ballot.json.lock"), b"").unwrap();
        assert!(s.mutate(|store| store.add_candidate(&owner(), "A")).is_err());
        assert_eq!(std::fs::read(s.path()).unwrap(), before);
        // Someone else's lock is left alone.
        assert!(dir.path().join("ballot.json.lock").exists());
    }
}
