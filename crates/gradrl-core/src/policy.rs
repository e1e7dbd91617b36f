//! Action selection over an action-value function
//!
//! Policies turn the Q-values of a state into a distribution over the
//! function's [`ActionSet`](crate::ActionSet) and sample from it.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Action, ActionValueFunction, RLError, Result, State};

/// Core policy trait for selecting actions
pub trait Policy: Send + Sync {
    /// Probability of every action, in action-set order
    fn probabilities<Q>(&self, q: &Q, state: &State) -> Result<Vec<f64>>
    where
        Q: ActionValueFunction + ?Sized;

    /// Sample an action
    fn select<Q, R>(&self, q: &Q, state: &State, rng: &mut R) -> Result<Action>
    where
        Q: ActionValueFunction + ?Sized,
        R: Rng + ?Sized,
    {
        let probs = self.probabilities(q, state)?;
        let dist = WeightedIndex::new(&probs)
            .map_err(|e| RLError::Computation(format!("cannot sample from {probs:?}: {e}")))?;
        let index = dist.sample(rng);
        q.actions()
            .get(index)
            .cloned()
            .ok_or_else(|| RLError::InvalidAction(format!("no action at index {index}")))
    }

    /// Natural log of the probability of choosing `action` in `state`
    fn log_prob<Q>(&self, q: &Q, state: &State, action: &Action) -> Result<f64>
    where
        Q: ActionValueFunction + ?Sized,
    {
        let index = q
            .actions()
            .index_of(action)
            .ok_or_else(|| RLError::InvalidAction(format!("{action} is not in the action set")))?;
        let probs = self.probabilities(q, state)?;
        Ok(probs[index].ln())
    }
}

fn greedy_index<Q: ActionValueFunction + ?Sized>(q: &Q, state: &State) -> Result<usize> {
    let (best, _) = q.best_action(state)?;
    q.actions()
        .index_of(&best)
        .ok_or_else(|| RLError::InvalidAction(format!("{best} is not in the action set")))
}

/// Greedy with probability `1 - epsilon`, uniform otherwise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a new epsilon-greedy policy, `epsilon` in [0, 1]
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(RLError::InvalidConfig(format!(
                "epsilon must lie in [0, 1], got {epsilon}"
            )));
        }
        Ok(Self { epsilon })
    }

    /// Exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set the exploration rate
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }
}

impl Policy for EpsilonGreedy {
    #[allow(clippy::cast_precision_loss)]
    fn probabilities<Q>(&self, q: &Q, state: &State) -> Result<Vec<f64>>
    where
        Q: ActionValueFunction + ?Sized,
    {
        let n = q.actions().len();
        let greedy = greedy_index(q, state)?;
        let mut probs = vec![self.epsilon / n as f64; n];
        probs[greedy] += 1.0 - self.epsilon;
        Ok(probs)
    }

    fn select<Q, R>(&self, q: &Q, state: &State, rng: &mut R) -> Result<Action>
    where
        Q: ActionValueFunction + ?Sized,
        R: Rng + ?Sized,
    {
        if rng.gen::<f64>() < self.epsilon {
            // Explore: random action
            Ok(q.actions().sample(rng).clone())
        } else {
            // Exploit: best known action
            q.best_action(state).map(|(a, _)| a)
        }
    }
}

/// Boltzmann exploration: `p(a) ∝ exp((Q(s, a) - max Q(s, ·)) / tau)`.
///
/// Low temperatures approach greedy selection, high ones uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Softmax {
    tau: f64,
}

impl Softmax {
    /// Create a softmax policy with temperature `tau > 0`
    pub fn new(tau: f64) -> Result<Self> {
        if !(tau.is_finite() && tau > 0.0) {
            return Err(RLError::InvalidConfig(format!(
                "temperature must be finite and positive, got {tau}"
            )));
        }
        Ok(Self { tau })
    }

    /// Temperature
    #[must_use]
    pub fn tau(&self) -> f64 {
        self.tau
    }
}

impl Policy for Softmax {
    fn probabilities<Q>(&self, q: &Q, state: &State) -> Result<Vec<f64>>
    where
        Q: ActionValueFunction + ?Sized,
    {
        let values = q.all_q_values(state)?;
        // shifting by the max keeps exp() from overflowing
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = values
            .iter()
            .map(|v| ((v - max) / self.tau).exp())
            .collect();
        let total: f64 = weights.iter().sum();
        Ok(weights.into_iter().map(|w| w / total).collect())
    }
}
