//! Gradient-descent TD for state value functions

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use gradrl_core::{DifferentiableValueFunction, Result, Transition};

use crate::rule::TdRule;

/// TD rule for V(s): `reward + gamma * V(s') - V(s)`, gradient `∇V(s)`.
///
/// Actions in the transition are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateValueTd {
    gamma: f64,
}

impl StateValueTd {
    /// Create the rule with discount factor `gamma`
    #[must_use]
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }
}

impl<V: DifferentiableValueFunction + ?Sized> TdRule<V> for StateValueTd {
    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn td_error(&self, transition: &Transition, v: &V) -> Result<f64> {
        let current = v.value(&transition.state)?;
        let successor = if transition.terminal {
            0.0
        } else {
            v.value(&transition.next_state)?
        };
        Ok(transition.reward.value() + self.gamma * successor - current)
    }

    fn gradient(&self, transition: &Transition, v: &V) -> Result<Array1<f64>> {
        v.gradient(&transition.state)
    }
}
