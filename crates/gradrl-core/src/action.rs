//! Action representation and finite action sets

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{RLError, Result};

/// A control input, stored as a vector of real components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Vec<f64>);

impl Action {
    /// Create a new action from its components
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self(data)
    }

    /// A one-component action, the usual encoding of a discrete choice
    #[must_use]
    pub fn discrete(index: usize) -> Self {
        Self(vec![index as f64])
    }

    /// Number of components
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the action has no components
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Component at `index`, if present
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Components as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Action {
    fn from(data: Vec<f64>) -> Self {
        Self(data)
    }
}

impl<const N: usize> From<[f64; N]> for Action {
    fn from(data: [f64; N]) -> Self {
        Self(data.to_vec())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, "]")
    }
}

/// The finite, ordered set of actions an action-value function maximizes over.
///
/// Never empty. Order matters: ties in [`crate::ActionValueFunction::best_action`]
/// resolve to the action that comes first here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    /// Create an action set, rejecting an empty list
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(RLError::InvalidAction(
                "action set must contain at least one action".to_string(),
            ));
        }
        Ok(Self { actions })
    }

    /// Actions `[0]`, `[1]`, ..., `[n - 1]`
    pub fn discrete(n: usize) -> Result<Self> {
        Self::new((0..n).map(Action::discrete).collect())
    }

    /// Number of actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    /// Position of `action` in the set
    #[must_use]
    pub fn index_of(&self, action: &Action) -> Option<usize> {
        self.actions.iter().position(|a| a == action)
    }

    /// Check if an action belongs to the set
    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        self.index_of(action).is_some()
    }

    /// Iterate the actions in set order
    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    /// Pick an action uniformly at random
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &Action {
        // the set is never empty
        self.actions
            .choose(rng)
            .unwrap_or(&self.actions[0])
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
