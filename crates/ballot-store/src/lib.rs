//! The Ballot Store.
//!
//! A single perpetual ballot: an administrator fixed at creation manages the
//! candidate registry, and every identity may cast exactly one vote for an
//! existing candidate. This crate provides:
//! - `BallotWriter` / `BallotReader` trait boundaries
//! - `InMemoryBallotStore`, which puts every mutation through the
//!   [`ballot_gate`] pipeline under a single lock
//! - A journal of successful mutations and deterministic replay
//! - Snapshots of the full state and their JSON on-disk form
//!
//! # Quick Start
//!
//! ```rust
//! use ballot_store::{BallotError, BallotReader, BallotWriter, InMemoryBallotStore};
//! use ballot_types::AccountId;
//!
//! let owner = AccountId::from_label("owner");
//! let voter = AccountId::from_label("voter");
//! let store = InMemoryBallotStore::new(owner.clone());
//!
//! let id = store.add_candidate(&owner, "Candidate A").unwrap();
//! store.vote(&voter, id).unwrap();
//! assert_eq!(store.total_votes(id).unwrap(), 1);
//! assert!(matches!(store.vote(&voter, id), Err(BallotError::AlreadyVoted { .. })));
//! ```

pub mod error;
pub mod journal;
pub mod memory;
pub mod replay;
pub mod snapshot;
pub mod state;
pub mod traits;

pub use error::{BallotError, Result};
pub use journal::{BallotEvent, JournalEntry};
pub use memory::InMemoryBallotStore;
pub use replay::{ReplayEngine, ReplayResult};
pub use snapshot::{load_snapshot, save_snapshot, BallotSnapshot, SNAPSHOT_VERSION};
pub use state::BallotState;
pub use traits::{BallotReader, BallotWriter};
