//! Learner configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use gradrl_core::{RLError, Result};

use crate::schedule::LearningRate;
use crate::traces::TraceKind;

/// Configuration shared by all gradient-descent TD learners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    /// Step size schedule (alpha)
    pub learning_rate: LearningRate,
    /// Discount factor
    pub gamma: f64,
    /// Trace decay; 0 gives one-step TD
    pub lambda: f64,
    /// Trace update variant
    pub traces: TraceKind,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: LearningRate::default(),
            gamma: 0.9,
            lambda: 0.0,
            traces: TraceKind::default(),
        }
    }
}

impl LearnerConfig {
    /// Set a constant learning rate
    #[must_use]
    pub fn with_learning_rate(mut self, alpha: f64) -> Self {
        self.learning_rate = LearningRate::Constant(alpha);
        self
    }

    /// Set the discount factor
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set trace decay and trace variant
    #[must_use]
    pub fn with_traces(mut self, lambda: f64, traces: TraceKind) -> Self {
        self.lambda = lambda;
        self.traces = traces;
        self
    }

    /// Reject unusable values.
    ///
    /// A discount factor outside [0, 1] is only logged: it is the caller's
    /// mistake but nothing here breaks because of it.
    pub fn validate(&self) -> Result<()> {
        self.learning_rate.validate()?;
        if !self.gamma.is_finite() {
            return Err(RLError::InvalidConfig(format!("gamma must be finite, got {}", self.gamma)));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            tracing::warn!(gamma = self.gamma, "discount factor outside [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Err(RLError::InvalidConfig(format!(
                "lambda must lie in [0, 1], got {}",
                self.lambda
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}
