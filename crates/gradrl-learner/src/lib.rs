//! Gradient-descent temporal-difference learners for gradrl
//!
//! This crate provides:
//! - TD update rules: Q-learning, SARSA and state-value TD
//! - Eligibility traces for TD(lambda)
//! - Learning-rate schedules
//! - A learner that applies the rules to a differentiable function
//! - JSON checkpoints

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod checkpoint;
pub mod config;
pub mod learner;
pub mod q_learning;
pub mod rule;
pub mod sarsa;
pub mod schedule;
pub mod stats;
pub mod td_zero;
pub mod traces;

// Re-export rules and learners
pub use learner::{GradientDescentTdLearner, QLearner, SarsaLearner, ValueLearner};
pub use q_learning::QLearning;
pub use rule::TdRule;
pub use sarsa::Sarsa;
pub use td_zero::StateValueTd;

// Re-export supporting types
pub use checkpoint::{Checkpoint, Persist};
pub use config::LearnerConfig;
pub use schedule::{LearningRate, Schedule};
pub use stats::LearnerStats;
pub use traces::{EligibilityTraces, TraceKind};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        GradientDescentTdLearner, LearnerConfig, Persist, QLearner, QLearning, Sarsa,
        SarsaLearner, StateValueTd, TdRule, ValueLearner,
    };
    pub use gradrl_core::prelude::*;
}
