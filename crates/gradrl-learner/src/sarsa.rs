//! On-policy gradient-descent SARSA

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use gradrl_core::{DifferentiableQFunction, RLError, Result, Transition};

use crate::rule::TdRule;

/// SARSA TD rule: the successor value is `Q(s', a')` for the action `a'`
/// actually chosen next. Non-terminal transitions must carry that action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sarsa {
    gamma: f64,
}

impl Sarsa {
    /// Create the rule with discount factor `gamma`
    #[must_use]
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }
}

impl<Q: DifferentiableQFunction + ?Sized> TdRule<Q> for Sarsa {
    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn td_error(&self, transition: &Transition, q: &Q) -> Result<f64> {
        let current = q.q_value(&transition.state, &transition.action)?;
        let successor = if transition.terminal {
            0.0
        } else {
            let next_action = transition.next_action.as_ref().ok_or_else(|| {
                RLError::InvalidAction("SARSA needs the next action of a non-terminal step".to_string())
            })?;
            q.q_value(&transition.next_state, next_action)?
        };
        Ok(transition.reward.value() + self.gamma * successor - current)
    }

    fn gradient(&self, transition: &Transition, q: &Q) -> Result<Array1<f64>> {
        q.gradient(&transition.state, &transition.action)
    }
}
