use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Configuration for the ballot gate pipeline.
///
/// Names are opaque text by default. The name checks here are opt-in for
/// deployments that want them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Maximum candidate name length in characters, if any.
    pub max_name_len: Option<usize>,
    /// Reject names that are empty or whitespace only.
    pub reject_blank_names: bool,
}

impl GateConfig {
    /// A configuration with both name checks switched on.
    pub fn strict() -> Self {
        Self {
            max_name_len: Some(64),
            reject_blank_names: true,
        }
    }

    /// Whether any name check is active.
    pub fn checks_names(&self) -> bool {
        self.max_name_len.is_some() || self.reject_blank_names
    }

    pub fn validate(&self) -> Result<(), GateError> {
        if self.max_name_len == Some(0) {
            return Err(GateError::Config(
                "max_name_len must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}
