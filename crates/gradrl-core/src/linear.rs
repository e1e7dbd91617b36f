//! Linear function approximators
//!
//! Both approximators predict `w · φ`, so their gradient with respect to
//! the weights is the feature vector itself.

use ndarray::Array1;
use rand::Rng;

use crate::feature::{ActionBlockFeatures, StateActionFeatures, StateFeatures};
use crate::{
    Action, ActionSet, ActionValueFunction, DifferentiableQFunction, DifferentiableValueFunction,
    Parameterized, RLError, Result, State, ValueFunction,
};

fn checked_dot(weights: &Array1<f64>, phi: &Array1<f64>) -> Result<f64> {
    RLError::check_dim(weights.len(), phi.len())?;
    Ok(weights.dot(phi))
}

fn uniform_weights<R: Rng + ?Sized>(n: usize, scale: f64, rng: &mut R) -> Array1<f64> {
    if scale > 0.0 {
        (0..n).map(|_| rng.gen_range(-scale..=scale)).collect()
    } else {
        Array1::zeros(n)
    }
}

/// Linear state value function V(s) = w · φ(s)
#[derive(Debug, Clone)]
pub struct LinearValueFunction<F> {
    weights: Array1<f64>,
    features: F,
}

impl<F: StateFeatures> LinearValueFunction<F> {
    /// Create with all weights zero
    pub fn new(features: F) -> Self {
        let weights = Array1::zeros(features.dim());
        Self { weights, features }
    }

    /// Create with the given initial weights
    pub fn with_weights(features: F, weights: Array1<f64>) -> Result<Self> {
        RLError::check_dim(features.dim(), weights.len())?;
        Ok(Self { weights, features })
    }

    /// Create with weights drawn uniformly from `[-scale, scale]`
    pub fn with_random_weights<R: Rng + ?Sized>(features: F, scale: f64, rng: &mut R) -> Self {
        let weights = uniform_weights(features.dim(), scale, rng);
        Self { weights, features }
    }

    /// The feature function
    pub fn features(&self) -> &F {
        &self.features
    }
}

impl<F: StateFeatures> ValueFunction for LinearValueFunction<F> {
    fn value(&self, state: &State) -> Result<f64> {
        checked_dot(&self.weights, &self.features.features(state)?)
    }
}

impl<F> Parameterized for LinearValueFunction<F> {
    fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    fn weights_mut(&mut self) -> &mut Array1<f64> {
        &mut self.weights
    }
}

impl<F: StateFeatures> DifferentiableValueFunction for LinearValueFunction<F> {
    fn gradient(&self, state: &State) -> Result<Array1<f64>> {
        let phi = self.features.features(state)?;
        RLError::check_dim(self.weights.len(), phi.len())?;
        Ok(phi)
    }
}

/// Linear action value function Q(s, a) = w · φ(s, a) over a finite action set
#[derive(Debug, Clone)]
pub struct LinearQFunction<F> {
    weights: Array1<f64>,
    features: F,
    actions: ActionSet,
}

impl<F: StateActionFeatures> LinearQFunction<F> {
    /// Create with all weights zero
    pub fn new(features: F, actions: ActionSet) -> Self {
        let weights = Array1::zeros(features.dim());
        tracing::debug!(weights = weights.len(), actions = actions.len(), "new linear Q-function");
        Self {
            weights,
            features,
            actions,
        }
    }

    /// Create with the given initial weights
    pub fn with_weights(features: F, actions: ActionSet, weights: Array1<f64>) -> Result<Self> {
        RLError::check_dim(features.dim(), weights.len())?;
        Ok(Self {
            weights,
            features,
            actions,
        })
    }

    /// Create with weights drawn uniformly from `[-scale, scale]`
    pub fn with_random_weights<R: Rng + ?Sized>(
        features: F,
        actions: ActionSet,
        scale: f64,
        rng: &mut R,
    ) -> Self {
        let weights = uniform_weights(features.dim(), scale, rng);
        Self {
            weights,
            features,
            actions,
        }
    }

    /// The feature function
    pub fn features(&self) -> &F {
        &self.features
    }
}

impl<S: StateFeatures> LinearQFunction<ActionBlockFeatures<S>> {
    /// One block of state features per action, all weights zero
    pub fn per_action(state_features: S, actions: ActionSet) -> Self {
        let features = ActionBlockFeatures::new(state_features, actions.clone());
        Self::new(features, actions)
    }
}

impl<F: StateActionFeatures> ActionValueFunction for LinearQFunction<F> {
    fn q_value(&self, state: &State, action: &Action) -> Result<f64> {
        checked_dot(&self.weights, &self.features.features(state, action)?)
    }

    fn actions(&self) -> &ActionSet {
        &self.actions
    }
}

impl<F> Parameterized for LinearQFunction<F> {
    fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    fn weights_mut(&mut self) -> &mut Array1<f64> {
        &mut self.weights
    }
}

impl<F: StateActionFeatures> DifferentiableQFunction for LinearQFunction<F> {
    fn gradient(&self, state: &State, action: &Action) -> Result<Array1<f64>> {
        let phi = self.features.features(state, action)?;
        RLError::check_dim(self.weights.len(), phi.len())?;
        Ok(phi)
    }
}
