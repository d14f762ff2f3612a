use crate::error::Result;
use crate::grammar::Pcfg;
use crate::model::LossyContextModel;
use crate::policy::DistortionPolicy;
use serde::{Deserialize, Serialize};

/// Construction parameters for a [`LossyContextModel`].
///
/// Deserializes from e.g.
/// `{"policy": {"kind": "uniform_deletion", "deletion_rate": 0.2}, "max_depth": 8}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub policy: DistortionPolicy,
    /// Derivation depth bound; `None` enumerates without limit
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl ModelConfig {
    pub fn new(policy: DistortionPolicy) -> Self {
        Self {
            policy,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Validates the parameters and enumerates the language of `grammar`.
    pub fn build(&self, grammar: &Pcfg) -> Result<LossyContextModel> {
        self.policy.validate()?;
        Ok(LossyContextModel::new(grammar, self.policy, self.max_depth))
    }
}
