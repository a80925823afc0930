use crate::error::GateError;
use crate::stage::{BallotRequest, GateContext, GateStage, Rejection, StageDecision};

/// Candidate name checks, active only when enabled in [`crate::GateConfig`].
pub struct NameStage;

impl GateStage for NameStage {
    fn name(&self) -> &str {
        "name"
    }

    fn evaluate(
        &self,
        request: &BallotRequest,
        context: &GateContext<'_>,
    ) -> Result<StageDecision, GateError> {
        let BallotRequest::AddCandidate { name, .. } = request else {
            return Ok(StageDecision::Pass);
        };

        if context.config.reject_blank_names && name.trim().is_empty() {
            return Ok(StageDecision::Fail(Rejection::InvalidName(
                "name must not be blank".into(),
            )));
        }

        if let Some(max) = context.config.max_name_len {
            let len = name.chars().count();
            if len > max {
                return Ok(StageDecision::Fail(Rejection::InvalidName(format!(
                    "name is {len} characters, maximum is {max}"
                ))));
            }
        }

        Ok(StageDecision::Pass)
    }
}
