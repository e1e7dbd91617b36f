//! Core value-function traits and types for gradient-descent TD learning
//!
//! This crate provides the data model (states, actions, transitions) and
//! the value-function capabilities that TD learners update: plain and
//! action-value functions, their differentiable variants, feature
//! functions, linear approximators built from them and the policies that
//! select actions from Q-values.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod error;
pub mod feature;
pub mod linear;
pub mod policy;
pub mod reward;
pub mod state;
pub mod trajectory;
pub mod value;

// Re-export core traits and types
pub use action::{Action, ActionSet};
pub use error::{RLError, Result};
pub use feature::{
    ActionBlockFeatures, IndexFeatures, RawFeatures, RbfFeatures, StateActionFeatures,
    StateFeatures,
};
pub use linear::{LinearQFunction, LinearValueFunction};
pub use policy::{EpsilonGreedy, Policy, Softmax};
pub use reward::Reward;
pub use state::State;
pub use trajectory::{Trajectory, Transition};
pub use value::{
    ActionValueFunction, DifferentiableQFunction, DifferentiableValueFunction, Parameterized,
    ValueFunction,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSet, ActionValueFunction, DifferentiableQFunction,
        DifferentiableValueFunction, EpsilonGreedy, Parameterized, Policy, Result, Reward,
        Softmax, State, Transition, ValueFunction,
    };
}
