//! Foundation types for the Ballot Store.
//!
//! Every other ballot crate depends on `ballot-types`.
//!
//! # Key Types
//!
//! - [`AccountId`]: Caller identity derived from [`IdentityMaterial`]
//! - [`CandidateId`]: Positive, never-reused candidate identifier
//! - [`Candidate`]: Registry entry with its running tally

pub mod candidate;
pub mod error;
pub mod identity;

pub use candidate::{Candidate, CandidateId};
pub use error::TypeError;
pub use identity::{AccountId, IdentityMaterial};
