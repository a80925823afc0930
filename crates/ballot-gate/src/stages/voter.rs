use crate::error::GateError;
use crate::stage::{BallotRequest, GateContext, GateStage, Rejection, StageDecision};

/// One vote per identity.
///
/// Runs ahead of [`super::CandidateStage`] in the default pipeline, so a
/// voter who already voted is told so whatever id they target.
pub struct VoterStage;

impl GateStage for VoterStage {
    fn name(&self) -> &str {
        "voter"
    }

    fn evaluate(
        &self,
        request: &BallotRequest,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        let BallotRequest::Vote { voter, .. } = request else {
            return Ok(StageDecision::Pass);
        };

        if context.view.has_voted(voter) {
            return Ok(StageDecision::Fail(Rejection::AlreadyVoted {
                voter: voter.clone(),
            }));
        }

        Ok(StageDecision::Pass)
    }
}
