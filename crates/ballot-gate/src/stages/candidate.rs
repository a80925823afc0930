use crate::error::GateError;
use crate::stage::{BallotRequest, GateContext, GateStage, Rejection, StageDecision};

/// Candidate existence check for removals and votes.
pub struct CandidateStage;

impl GateStage for CandidateStage {
    fn name(&self) -> &str {
        "candidate"
    }

    fn evaluate(
        &self,
        request: &BallotRequest,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        let decision = match request {
            BallotRequest::AddCandidate { .. } => StageDecision::Pass,
            BallotRequest::RemoveCandidate { id, .. } => {
                if context.view.contains_candidate(*id) {
                    StageDecision::Pass
                } else {
                    StageDecision::Fail(Rejection::NotFound(*id))
                }
            }
            BallotRequest::Vote { candidate, .. } => {
                if context.view.contains_candidate(*candidate) {
                    StageDecision::Pass
                } else {
                    StageDecision::Fail(Rejection::CandidateNotFound(*candidate))
                }
            }
        };
        Ok(decision)
    }
}
