//! Transitions and episode trajectories

use serde::{Deserialize, Serialize};

use crate::{Action, Reward, State};

/// One step of interaction with an environment.
///
/// `terminal` asserts the episode ends at `next_state`, so learners treat
/// the successor's value as zero whatever a value function would predict
/// there. `next_action` is the action actually chosen at `next_state`;
/// off-policy rules never read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Current state
    pub state: State,
    /// Action taken in `state`
    pub action: Action,
    /// Reward received
    pub reward: Reward,
    /// Resulting state
    pub next_state: State,
    /// Action chosen in `next_state`, if any
    pub next_action: Option<Action>,
    /// Whether the episode ended at `next_state`
    pub terminal: bool,
}

impl Transition {
    /// Create a non-terminal transition without a next action
    pub fn new(
        state: impl Into<State>,
        action: impl Into<Action>,
        reward: impl Into<Reward>,
        next_state: impl Into<State>,
    ) -> Self {
        Self {
            state: state.into(),
            action: action.into(),
            reward: reward.into(),
            next_state: next_state.into(),
            next_action: None,
            terminal: false,
        }
    }

    /// Set the action chosen in the next state
    #[must_use]
    pub fn with_next_action(mut self, next_action: impl Into<Action>) -> Self {
        self.next_action = Some(next_action.into());
        self
    }

    /// Set the terminal flag
    #[must_use]
    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }
}

/// Transitions of one episode in the order they happened
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    /// Sequence of transitions
    pub transitions: Vec<Transition>,
    /// Total undiscounted reward
    pub total_reward: f64,
}

impl Trajectory {
    /// Create a new empty trajectory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transition to the trajectory
    pub fn push(&mut self, transition: Transition) {
        self.total_reward += transition.reward.0;
        self.transitions.push(transition);
    }

    /// Get the length of the trajectory
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Check if trajectory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Discounted return from every step to the end of its episode
    #[must_use]
    pub fn returns(&self, gamma: f64) -> Vec<f64> {
        let mut returns = vec![0.0; self.len()];
        let mut running_return = 0.0;

        for i in (0..self.len()).rev() {
            if self.transitions[i].terminal {
                running_return = 0.0;
            }
            running_return = self.transitions[i].reward.0 + gamma * running_return;
            returns[i] = running_return;
        }

        returns
    }
}
