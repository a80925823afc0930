use std::time::Instant;

use crate::config::GateConfig;
use crate::error::GateError;
use crate::stage::{
    BallotRequest, GateContext, GateStage, RegistryView, Rejection, StageDecision, StageResult,
};
use crate::stages::{AdministratorStage, CandidateStage, NameStage, VoterStage};

// ---------------------------------------------------------------------------
// GateResult
// ---------------------------------------------------------------------------

/// Final verdict on a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Accepted,
    Rejected(Rejection),
}

/// The outcome of running a request through the full gate pipeline.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub decision: GateDecision,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
}

impl GateResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self.decision, GateDecision::Accepted)
    }

    /// Collapse into the rejection, if any.
    pub fn into_result(self) -> Result<(), Rejection> {
        match self.decision {
            GateDecision::Accepted => Ok(()),
            GateDecision::Rejected(rejection) => Err(rejection),
        }
    }
}

// ---------------------------------------------------------------------------
// BallotGate
// ---------------------------------------------------------------------------

/// The ballot gate: a pipeline of stages every mutating request passes
/// through before the store changes anything.
pub struct BallotGate {
    stages: Vec<Box<dyn GateStage>>,
    config: GateConfig,
}

impl BallotGate {
    /// Create a gate with an empty pipeline.
    pub fn new(config: GateConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the default stage pipeline:
    /// Administrator -> Name -> Voter -> Candidate
    pub fn with_default_stages(config: GateConfig) -> Self {
        let mut gate = Self::new(config);
        gate.add_stage(Box::new(AdministratorStage));
        gate.add_stage(Box::new(NameStage));
        gate.add_stage(Box::new(VoterStage));
        gate.add_stage(Box::new(CandidateStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Evaluate a request against the given state.
    ///
    /// The pipeline is **fail-fast**: the first failing stage stops
    /// evaluation and its rejection becomes the decision.
    pub fn evaluate(
        &self,
        request: &BallotRequest,
        view: &dyn RegistryView,
    ) -> Result<GateResult, GateError> {
        let context = GateContext::new(view, &self.config);
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(request, &context)?;
            let elapsed = stage_start.elapsed();

            let result = StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason: match &decision {
                    StageDecision::Pass => None,
                    StageDecision::Fail(rejection) => Some(rejection.to_string()),
                },
                elapsed,
            };

            stage_results.push(result);

            if let StageDecision::Fail(rejection) = decision {
                tracing::debug!(
                    stage = stage.name(),
                    request = request.kind(),
                    caller = %request.caller(),
                    %rejection,
                    ?elapsed,
                    "ballot request rejected"
                );
                return Ok(GateResult {
                    decision: GateDecision::Rejected(rejection),
                    stage_results,
                });
            }
        }

        Ok(GateResult {
            decision: GateDecision::Accepted,
            stage_results,
        })
    }
}

impl Default for BallotGate {
    fn default() -> Self {
        Self::with_default_stages(GateConfig::default())
    }
}
