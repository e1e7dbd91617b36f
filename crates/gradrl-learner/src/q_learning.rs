//! Off-policy gradient-descent Q-learning

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use gradrl_core::{DifferentiableQFunction, Result, Transition};

use crate::rule::TdRule;

/// Q-learning TD rule.
///
/// The successor value is `max_a Q(s', a)` rather than the value of the
/// action actually chosen next, and zero when the transition is terminal
/// (in which case `Q(s', ·)` is never evaluated).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QLearning {
    gamma: f64,
}

impl QLearning {
    /// Create the rule with discount factor `gamma`
    #[must_use]
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }
}

impl<Q: DifferentiableQFunction + ?Sized> TdRule<Q> for QLearning {
    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn td_error(&self, transition: &Transition, q: &Q) -> Result<f64> {
        let current = q.q_value(&transition.state, &transition.action)?;
        let successor = if transition.terminal {
            0.0
        } else {
            q.max_q_value(&transition.next_state)?
        };
        Ok(transition.reward.value() + self.gamma * successor - current)
    }

    fn gradient(&self, transition: &Transition, q: &Q) -> Result<Array1<f64>> {
        q.gradient(&transition.state, &transition.action)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use gradrl_core::{Action, ActionSet, ActionValueFunction, Parameterized, RLError, State};
    use ndarray::arr1;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Q-function with canned answers that counts how often it is asked
    pub(crate) struct StubQ {
        pub weights: Array1<f64>,
        pub actions: ActionSet,
        pub prediction: f64,
        pub next_prediction: f64,
        pub max_prediction: f64,
        pub grad: Array1<f64>,
        pub max_calls: AtomicUsize,
        pub fail: bool,
    }

    impl StubQ {
        pub(crate) fn new(n: usize) -> Self {
            Self {
                weights: Array1::zeros(n),
                actions: ActionSet::discrete(2).unwrap(),
                prediction: 2.0,
                next_prediction: -4.0,
                max_prediction: 3.0,
                grad: Array1::from_iter((0..n).map(|i| i as f64 + 1.0)),
                max_calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    impl ActionValueFunction for StubQ {
        fn q_value(&self, state: &State, _action: &Action) -> Result<f64> {
            if self.fail {
                return Err(RLError::Computation("stub failure".to_string()));
            }
            if state.get(0) == Some(1.0) {
                Ok(self.next_prediction)
            } else {
                Ok(self.prediction)
            }
        }

        fn actions(&self) -> &ActionSet {
            &self.actions
        }

        fn max_q_value(&self, _state: &State) -> Result<f64> {
            self.max_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.max_prediction)
        }
    }

    impl Parameterized for StubQ {
        fn weights(&self) -> &Array1<f64> {
            &self.weights
        }

        fn weights_mut(&mut self) -> &mut Array1<f64> {
            &mut self.weights
        }
    }

    impl DifferentiableQFunction for StubQ {
        fn gradient(&self, _state: &State, _action: &Action) -> Result<Array1<f64>> {
            Ok(self.grad.clone())
        }
    }

    pub(crate) fn step(reward: f64, terminal: bool) -> Transition {
        Transition::new([0.0], [0.0], reward, [1.0])
            .with_next_action([1.0])
            .with_terminal(terminal)
    }

    #[test]
    fn test_non_terminal_uses_max_successor() {
        let q = StubQ::new(3);
        let delta = QLearning::new(0.9).td_error(&step(1.0, false), &q).unwrap();
        assert_relative_eq!(delta, 1.7);
        assert_eq!(q.max_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_terminal_ignores_successor() {
        let q = StubQ::new(3);
        for gamma in [0.0, 0.5, 0.9, 1.0] {
            let delta = QLearning::new(gamma).td_error(&step(1.0, true), &q).unwrap();
            assert_relative_eq!(delta, -1.0);
        }
        assert_eq!(q.max_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_broadcast_td_errors() {
        let q = StubQ::new(4);
        let rule = QLearning::new(0.9);
        let errors = rule.td_errors(&step(1.0, false), &q).unwrap();
        assert_eq!(errors.len(), 4);
        for e in &errors {
            assert_relative_eq!(*e, 1.7);
        }

        let errors = rule.td_errors(&step(1.0, true), &q).unwrap();
        assert!(errors.iter().all(|e| (*e + 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_gradient_is_pass_through() {
        let q = StubQ::new(3);
        let grad = QLearning::new(0.9).gradient(&step(0.0, false), &q).unwrap();
        assert_eq!(grad, arr1(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_value_function_errors_propagate() {
        let mut q = StubQ::new(1);
        q.fail = true;
        let result = QLearning::new(0.9).td_error(&step(0.0, false), &q);
        assert!(matches!(result, Err(RLError::Computation(_))));
    }

    #[test]
    fn test_nan_reward_propagates() {
        let q = StubQ::new(1);
        let delta = QLearning::new(0.9).td_error(&step(f64::NAN, false), &q).unwrap();
        assert!(delta.is_nan());
    }

    proptest! {
        #[test]
        fn prop_broadcast_length_matches_weights(n in 1usize..64, reward in -10.0f64..10.0, terminal in any::<bool>()) {
            let q = StubQ::new(n);
            let rule = QLearning::new(0.9);
            let t = step(reward, terminal);
            let scalar = rule.td_error(&t, &q).unwrap();
            let errors = rule.td_errors(&t, &q).unwrap();
            prop_assert_eq!(errors.len(), n);
            prop_assert!(errors.iter().all(|e| *e == scalar));
        }

        #[test]
        fn prop_td_error_matches_target(
            reward in -10.0f64..10.0,
            gamma in 0.0f64..=1.0,
            prediction in -50.0f64..50.0,
            max_prediction in -50.0f64..50.0,
        ) {
            let mut q = StubQ::new(2);
            q.prediction = prediction;
            q.max_prediction = max_prediction;
            let rule = QLearning::new(gamma);

            let delta = rule.td_error(&step(reward, false), &q).unwrap();
            prop_assert!((delta - (reward + gamma * max_prediction - prediction)).abs() < 1e-9);

            let delta = rule.td_error(&step(reward, true), &q).unwrap();
            prop_assert!((delta - (reward - prediction)).abs() < 1e-9);
            prop_assert_eq!(q.max_calls.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn prop_td_error_is_idempotent(reward in -10.0f64..10.0, gamma in 0.0f64..=1.0, terminal in any::<bool>()) {
            let q = StubQ::new(2);
            let rule = QLearning::new(gamma);
            let t = step(reward, terminal);
            let first = rule.td_error(&t, &q).unwrap();
            let second = rule.td_error(&t, &q).unwrap();
            prop_assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}
