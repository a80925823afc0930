use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a registry entry.
///
/// Ids start at 1 and are handed out by a monotonic counter. An id is never
/// reassigned, even after its candidate is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl CandidateId {
    /// The id given to the first candidate ever added.
    pub const fn first() -> Self {
        Self(1)
    }

    /// The id following this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for CandidateId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for CandidateId {
    type Err = TypeError;

    /// Accepts `7` or `#7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|e| TypeError::InvalidCandidateId(format!("{s}: {e}")))
    }
}

/// A named registry entry accumulating votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

impl Candidate {
    /// A freshly registered candidate with no votes.
    pub fn new(id: CandidateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            vote_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_advance() {
        assert_eq!(CandidateId::first(), CandidateId(1));
        assert_eq!(CandidateId::first().next(), CandidateId(2));
    }

    #[test]
    fn display_uses_hash_prefix() {
        assert_eq!(CandidateId(12).to_string(), "#12");
    }

    #[test]
    fn parse_accepts_plain_and_prefixed() {
        assert_eq!("3".parse::<CandidateId>().unwrap(), CandidateId(3));
        assert_eq!("#3".parse::<CandidateId>().unwrap(), CandidateId(3));
        assert!("three".parse::<CandidateId>().is_err());
    }

    #[test]
    fn new_candidate_has_no_votes() {
        let candidate = Candidate::new(CandidateId(1), "Candidate A");
        assert_eq!(candidate.vote_count, 0);
        assert_eq!(candidate.name, "Candidate A");
    }

    #[test]
    fn candidate_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&CandidateId(5)).unwrap(), "5");
    }
}
