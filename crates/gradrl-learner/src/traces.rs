//! Eligibility traces for TD(lambda)

use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

use gradrl_core::{RLError, Result};

/// How a new gradient enters the trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    /// `e = decay * e + gradient`
    #[default]
    Accumulating,
    /// `e_i = gradient_i` wherever the gradient is non-zero, decayed elsewhere
    Replacing,
}

/// Per-weight eligibility, decayed by `gamma * lambda` each step
#[derive(Debug, Clone)]
pub struct EligibilityTraces {
    values: Array1<f64>,
    kind: TraceKind,
}

impl EligibilityTraces {
    /// Zero traces for `dim` weights
    #[must_use]
    pub fn new(dim: usize, kind: TraceKind) -> Self {
        Self {
            values: Array1::zeros(dim),
            kind,
        }
    }

    /// Decay the traces and fold in `gradient`
    pub fn update(&mut self, decay: f64, gradient: &Array1<f64>) -> Result<()> {
        RLError::check_dim(self.values.len(), gradient.len())?;
        match self.kind {
            TraceKind::Accumulating => {
                if decay == 0.0 {
                    self.values.assign(gradient);
                } else {
                    self.values *= decay;
                    self.values += gradient;
                }
            }
            TraceKind::Replacing => {
                Zip::from(&mut self.values).and(gradient).for_each(|e, &g| {
                    if g == 0.0 {
                        *e *= decay;
                    } else {
                        *e = g;
                    }
                });
            }
        }
        Ok(())
    }

    /// Clear all traces, e.g. at the end of an episode
    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }

    /// Current trace values
    #[must_use]
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Trace update variant
    #[must_use]
    pub fn kind(&self) -> TraceKind {
        self.kind
    }
}
