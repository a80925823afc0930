//! Built-in gate stages.

pub mod administrator;
pub mod candidate;
pub mod name;
pub mod voter;

pub use administrator::AdministratorStage;
pub use candidate::CandidateStage;
pub use name::NameStage;
pub use voter::VoterStage;
