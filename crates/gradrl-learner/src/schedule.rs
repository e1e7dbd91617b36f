//! Learning-rate schedules

use serde::{Deserialize, Serialize};

use gradrl_core::{RLError, Result};

/// Trait for schedules (e.g., for step-size decay)
pub trait Schedule: Send + Sync {
    /// Get value at step t
    fn value(&self, t: usize) -> f64;
}

/// Step size as a function of the number of updates already applied.
///
/// Serialized untagged: a bare number is a constant rate, an object with
/// `start`/`end`/`steps` a linear decay and one with
/// `start`/`min_value`/`decay_rate` an exponential decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LearningRate {
    /// Same rate at every step
    Constant(f64),
    /// Linear decay from `start` to `end` over `steps` updates, then `end`
    Linear {
        /// Starting value
        start: f64,
        /// Ending value
        end: f64,
        /// Number of steps for decay
        steps: usize,
    },
    /// `start * decay_rate^t`, never below `min_value`
    Exponential {
        /// Starting value
        start: f64,
        /// Minimum value
        min_value: f64,
        /// Decay rate
        decay_rate: f64,
    },
}

impl LearningRate {
    /// Check that every parameter is finite and the rate stays positive
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(RLError::InvalidConfig(format!("learning rate: {msg}")));
        match *self {
            Self::Constant(value) => {
                if !(value.is_finite() && value > 0.0) {
                    return invalid("must be finite and positive");
                }
            }
            Self::Linear { start, end, .. } => {
                if !(start.is_finite() && end.is_finite() && start > 0.0 && end >= 0.0) {
                    return invalid("linear decay needs start > 0 and end >= 0");
                }
            }
            Self::Exponential {
                start,
                min_value,
                decay_rate,
            } => {
                if !(start.is_finite() && start > 0.0 && min_value.is_finite() && min_value >= 0.0) {
                    return invalid("exponential decay needs start > 0 and min_value >= 0");
                }
                if !(decay_rate > 0.0 && decay_rate <= 1.0) {
                    return invalid("decay_rate must lie in (0, 1]");
                }
            }
        }
        Ok(())
    }
}

impl Default for LearningRate {
    fn default() -> Self {
        Self::Constant(0.1)
    }
}

impl Schedule for LearningRate {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn value(&self, t: usize) -> f64 {
        match *self {
            Self::Constant(value) => value,
            Self::Linear { start, end, steps } => {
                if t >= steps {
                    end
                } else {
                    let progress = t as f64 / steps as f64;
                    start + (end - start) * progress
                }
            }
            Self::Exponential {
                start,
                min_value,
                decay_rate,
            } => {
                let value = start * decay_rate.powf(t as f64);
                value.max(min_value)
            }
        }
    }
}
