//! Authorization and validation gate for the Ballot Store.
//!
//! Every mutating request is described as a [`BallotRequest`] and must pass
//! the gate before the store touches its state. The gate runs a fail-fast
//! pipeline of stages against a read-only [`RegistryView`] of the current
//! state and either accepts the request or names the [`Rejection`].
//!
//! # Quick Start
//!
//! ```rust
//! use ballot_gate::{BallotGate, BallotRequest, RegistryView};
//! use ballot_types::{AccountId, CandidateId};
//!
//! struct Empty(AccountId);
//!
//! impl RegistryView for Empty {
//!     fn administrator(&self) -> &AccountId { &self.0 }
//!     fn contains_candidate(&self, _id: CandidateId) -> bool { false }
//!     fn has_voted(&self, _voter: &AccountId) -> bool { false }
//! }
//!
//! let admin = AccountId::from_label("owner");
//! let gate = BallotGate::default();
//! let request = BallotRequest::AddCandidate { caller: admin.clone(), name: "A".into() };
//! assert!(gate.evaluate(&request, &Empty(admin)).unwrap().is_accepted());
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod stage;
pub mod stages;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::{BallotGate, GateDecision, GateResult};
pub use stage::{
    BallotRequest, GateContext, GateStage, RegistryView, Rejection, StageDecision, StageResult,
};
pub use stages::{AdministratorStage, CandidateStage, NameStage, VoterStage};
