//! Value-function capabilities
//!
//! A value function predicts V(s); an action-value function predicts
//! Q(s, a) and can maximize over its [`ActionSet`]. The differentiable
//! variants additionally own a weight vector and expose the gradient of
//! their prediction with respect to it, which is all a gradient-descent
//! TD learner needs.

use ndarray::Array1;

use crate::{Action, ActionSet, RLError, Result, State};

/// State value function V(s)
pub trait ValueFunction: Send + Sync {
    /// Estimate the value of a state
    fn value(&self, state: &State) -> Result<f64>;

    /// Batch value estimation
    fn batch_value(&self, states: &[State]) -> Result<Vec<f64>> {
        states.iter().map(|s| self.value(s)).collect()
    }
}

/// Action value function Q(s, a)
pub trait ActionValueFunction: Send + Sync {
    /// Estimate the value of taking an action in a given state
    fn q_value(&self, state: &State, action: &Action) -> Result<f64>;

    /// The actions this function maximizes over
    fn actions(&self) -> &ActionSet;

    /// Q-values for every action, in action-set order
    fn all_q_values(&self, state: &State) -> Result<Vec<f64>> {
        self.actions()
            .iter()
            .map(|a| self.q_value(state, a))
            .collect()
    }

    /// The best action and its value.
    ///
    /// Ties go to the earliest action in the set. A NaN Q-value wins and
    /// is returned as is.
    fn best_action(&self, state: &State) -> Result<(Action, f64)> {
        let mut best: Option<(&Action, f64)> = None;
        for action in self.actions() {
            let q = self.q_value(state, action)?;
            match best {
                Some((_, b)) if b.is_nan() || !(q > b || q.is_nan()) => {}
                _ => best = Some((action, q)),
            }
        }
        best.map(|(a, q)| (a.clone(), q))
            .ok_or_else(|| RLError::InvalidAction("no actions to maximize over".to_string()))
    }

    /// max over actions of Q(state, a)
    fn max_q_value(&self, state: &State) -> Result<f64> {
        self.best_action(state).map(|(_, q)| q)
    }
}

/// Something that owns a learnable weight vector
pub trait Parameterized {
    /// Current weights
    fn weights(&self) -> &Array1<f64>;

    /// Mutable access to the weights
    fn weights_mut(&mut self) -> &mut Array1<f64>;

    /// Number of weights
    fn num_weights(&self) -> usize {
        self.weights().len()
    }

    /// `weights += scale * direction`, elementwise
    fn add_scaled(&mut self, scale: f64, direction: &Array1<f64>) -> Result<()> {
        RLError::check_dim(self.num_weights(), direction.len())?;
        self.weights_mut().scaled_add(scale, direction);
        Ok(())
    }

    /// Replace all weights, keeping the dimensionality
    fn set_weights(&mut self, weights: Array1<f64>) -> Result<()> {
        RLError::check_dim(self.num_weights(), weights.len())?;
        *self.weights_mut() = weights;
        Ok(())
    }
}

/// V(s) with a gradient with respect to its weights
pub trait DifferentiableValueFunction: ValueFunction + Parameterized {
    /// d V(state) / d weights, same length as the weights
    fn gradient(&self, state: &State) -> Result<Array1<f64>>;
}

/// Q(s, a) with a gradient with respect to its weights
pub trait DifferentiableQFunction: ActionValueFunction + Parameterized {
    /// d Q(state, action) / d weights, same length as the weights
    fn gradient(&self, state: &State, action: &Action) -> Result<Array1<f64>>;
}
