//! State representation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// An environment configuration at one time step.
///
/// A state is a fixed-dimension vector of real components. It has no
/// mutable accessors: once produced it is only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Vec<f64>);

impl State {
    /// Create a new state from its components
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self(data)
    }

    /// Number of components
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the state has no components
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

impl From<Vec<f64>> for State {
    fn from(data: Vec<f64>) -> Self {
        Self(data)
    }
}

impl<const N: usize> From<[f64; N]> for State {
    fn from(data: [f64; N]) -> Self {
        Self(data.to_vec())
    }
}

impl Index<usize> for State {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for State {
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
