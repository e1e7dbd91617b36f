//! Feature functions for linear function approximation

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{Action, ActionSet, RLError, Result, State};

/// Maps a state to a fixed-length feature vector φ(s)
pub trait StateFeatures: Send + Sync {
    /// Length of every feature vector this function produces
    fn dim(&self) -> usize;

    /// Compute φ(state)
    fn features(&self, state: &State) -> Result<Array1<f64>>;
}

/// Maps a state-action pair to a fixed-length feature vector φ(s, a)
pub trait StateActionFeatures: Send + Sync {
    /// Length of every feature vector this function produces
    fn dim(&self) -> usize;

    /// Compute φ(state, action)
    fn features(&self, state: &State, action: &Action) -> Result<Array1<f64>>;
}

/// The state components themselves, optionally followed by a constant 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFeatures {
    /// Expected state dimensionality
    pub state_dim: usize,
    /// Append a bias feature
    pub bias: bool,
}

impl RawFeatures {
    /// Create raw features for states of `state_dim` components
    #[must_use]
    pub fn new(state_dim: usize, bias: bool) -> Self {
        Self { state_dim, bias }
    }
}

impl StateFeatures for RawFeatures {
    fn dim(&self) -> usize {
        self.state_dim + usize::from(self.bias)
    }

    fn features(&self, state: &State) -> Result<Array1<f64>> {
        RLError::check_dim(self.state_dim, state.len())?;
        let mut phi = Array1::ones(self.dim());
        for (i, x) in state.as_slice().iter().enumerate() {
            phi[i] = *x;
        }
        Ok(phi)
    }
}

/// One-hot encoding of a state whose first component is an integer index.
///
/// This is the tabular case: with these features a linear function keeps
/// one independent weight per state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFeatures {
    /// Number of distinct states
    pub num_states: usize,
}

impl IndexFeatures {
    /// Create a one-hot encoding over `num_states` states
    #[must_use]
    pub fn new(num_states: usize) -> Self {
        Self { num_states }
    }
}

impl StateFeatures for IndexFeatures {
    fn dim(&self) -> usize {
        self.num_states
    }

    fn features(&self, state: &State) -> Result<Array1<f64>> {
        let raw = state
            .get(0)
            .ok_or_else(|| RLError::InvalidState("state has no components".to_string()))?;
        if raw < 0.0 || raw.fract() != 0.0 || raw >= self.num_states as f64 {
            return Err(RLError::InvalidState(format!(
                "{state} is not an index below {}",
                self.num_states
            )));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = raw as usize;
        let mut phi = Array1::zeros(self.num_states);
        phi[index] = 1.0;
        Ok(phi)
    }
}

/// Gaussian radial basis functions over a continuous state space.
///
/// φ_i(s) = exp(-½ Σ_d ((s_d - c_id) / σ_d)²), optionally normalized so
/// the activations sum to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbfFeatures {
    centers: Vec<Vec<f64>>,
    sigma: Vec<f64>,
    normalized: bool,
}

impl RbfFeatures {
    /// Create RBF features from explicit centers and per-dimension widths
    pub fn new(centers: Vec<Vec<f64>>, sigma: Vec<f64>, normalized: bool) -> Result<Self> {
        if centers.is_empty() {
            return Err(RLError::InvalidConfig("RBF network needs at least one center".to_string()));
        }
        for center in &centers {
            RLError::check_dim(sigma.len(), center.len())?;
        }
        if sigma.iter().any(|s| !(*s > 0.0)) {
            return Err(RLError::InvalidConfig("RBF widths must be positive".to_string()));
        }
        tracing::debug!(centers = centers.len(), dims = sigma.len(), "built RBF features");
        Ok(Self {
            centers,
            sigma,
            normalized,
        })
    }

    /// Centers on a regular grid with `per_dim` points per dimension.
    ///
    /// Widths default to the grid spacing of each dimension.
    pub fn grid(low: &[f64], high: &[f64], per_dim: usize, normalized: bool) -> Result<Self> {
        RLError::check_dim(low.len(), high.len())?;
        if per_dim == 0 || low.is_empty() {
            return Err(RLError::InvalidConfig("RBF grid must not be empty".to_string()));
        }

        let axes: Vec<Vec<f64>> = low
            .iter()
            .zip(high)
            .map(|(l, h)| {
                if per_dim == 1 {
                    vec![(l + h) / 2.0]
                } else {
                    let step = (h - l) / (per_dim - 1) as f64;
                    (0..per_dim).map(|i| l + step * i as f64).collect()
                }
            })
            .collect();

        let sigma = low
            .iter()
            .zip(high)
            .map(|(l, h)| {
                if per_dim == 1 {
                    h - l
                } else {
                    (h - l) / (per_dim - 1) as f64
                }
            })
            .collect();

        let mut centers: Vec<Vec<f64>> = vec![Vec::new()];
        for axis in &axes {
            centers = centers
                .into_iter()
                .flat_map(|prefix| {
                    axis.iter().map(move |x| {
                        let mut c = prefix.clone();
                        c.push(*x);
                        c
                    })
                })
                .collect();
        }

        Self::new(centers, sigma, normalized)
    }

    /// The RBF centers
    #[must_use]
    pub fn centers(&self) -> &[Vec<f64>] {
        &self.centers
    }
}

impl StateFeatures for RbfFeatures {
    fn dim(&self) -> usize {
        self.centers.len()
    }

    fn features(&self, state: &State) -> Result<Array1<f64>> {
        RLError::check_dim(self.sigma.len(), state.len())?;
        let mut phi: Array1<f64> = self
            .centers
            .iter()
            .map(|c| {
                let d2: f64 = c
                    .iter()
                    .zip(state.as_slice())
                    .zip(&self.sigma)
                    .map(|((c, s), w)| ((s - c) / w).powi(2))
                    .sum();
                (-0.5 * d2).exp()
            })
            .collect();

        if self.normalized {
            let total = phi.sum();
            if total > 0.0 {
                phi /= total;
            }
        }
        Ok(phi)
    }
}

/// State features copied into the block belonging to the chosen action.
///
/// With k actions and d state features the result has k·d entries, zero
/// everywhere except block `index_of(action)`.
#[derive(Debug, Clone)]
pub struct ActionBlockFeatures<F> {
    inner: F,
    actions: ActionSet,
}

impl<F: StateFeatures> ActionBlockFeatures<F> {
    /// Stack `inner` once per action in `actions`
    pub fn new(inner: F, actions: ActionSet) -> Self {
        Self { inner, actions }
    }

    /// The underlying state features
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: StateFeatures> StateActionFeatures for ActionBlockFeatures<F> {
    fn dim(&self) -> usize {
        self.inner.dim() * self.actions.len()
    }

    fn features(&self, state: &State, action: &Action) -> Result<Array1<f64>> {
        let index = self
            .actions
            .index_of(action)
            .ok_or_else(|| RLError::InvalidAction(format!("{action} is not in the action set")))?;
        let block = self.inner.features(state)?;
        let d = self.inner.dim();
        RLError::check_dim(d, block.len())?;

        let mut phi = Array1::zeros(self.dim());
        phi.slice_mut(ndarray::s![index * d..(index + 1) * d])
            .assign(&block);
        Ok(phi)
    }
}
