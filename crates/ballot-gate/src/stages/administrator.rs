use crate::error::GateError;
use crate::stage::{BallotRequest, GateContext, GateStage, Rejection, StageDecision};

/// Administrator check.
///
/// Restricted requests pass only when the caller is the administrator
/// recorded at store creation. Votes are not restricted.
pub struct AdministratorStage;

impl GateStage for AdministratorStage {
    fn name(&self) -> &str {
        "administrator"
    }

    fn evaluate(
        &self,
        request: &BallotRequest,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        if !request.is_restricted() {
            return Ok(StageDecision::Pass);
        }

        let caller = request.caller();
        if caller != context.view.administrator() {
            return Ok(StageDecision::Fail(Rejection::Unauthorized {
                caller: caller.clone(),
            }));
        }

        Ok(StageDecision::Pass)
    }
}
