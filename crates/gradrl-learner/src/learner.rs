//! Gradient-descent TD(lambda) learner

use gradrl_core::{
    DifferentiableQFunction, DifferentiableValueFunction, Parameterized, RLError, Result,
    Transition,
};
use tracing::{debug, trace, warn};

use crate::config::LearnerConfig;
use crate::q_learning::QLearning;
use crate::rule::TdRule;
use crate::sarsa::Sarsa;
use crate::schedule::Schedule;
use crate::stats::LearnerStats;
use crate::td_zero::StateValueTd;
use crate::traces::EligibilityTraces;

/// Owns a differentiable function and applies one TD rule to it.
///
/// Each [`update`](Self::update) moves the weights by
/// `alpha_t * td_error * e`, where `e` are the eligibility traces (just the
/// gradient when `lambda` is zero) and `alpha_t` comes from the learning
/// rate schedule at the current update count.
#[derive(Debug)]
pub struct GradientDescentTdLearner<F, R> {
    function: F,
    rule: R,
    config: LearnerConfig,
    traces: EligibilityTraces,
    stats: LearnerStats,
}

/// Off-policy Q-learning over a differentiable Q-function
pub type QLearner<Q> = GradientDescentTdLearner<Q, QLearning>;

/// On-policy SARSA over a differentiable Q-function
pub type SarsaLearner<Q> = GradientDescentTdLearner<Q, Sarsa>;

/// TD(lambda) over a differentiable state value function
pub type ValueLearner<V> = GradientDescentTdLearner<V, StateValueTd>;

impl<F, R> GradientDescentTdLearner<F, R>
where
    F: Parameterized,
    R: TdRule<F>,
{
    /// Create a learner. The rule's discount factor must match `config.gamma`.
    pub fn new(function: F, rule: R, config: LearnerConfig) -> Result<Self> {
        config.validate()?;
        if rule.gamma().to_bits() != config.gamma.to_bits() {
            return Err(RLError::InvalidConfig(format!(
                "rule discounts with {} but config says {}",
                rule.gamma(),
                config.gamma
            )));
        }
        let traces = EligibilityTraces::new(function.num_weights(), config.traces);
        Ok(Self {
            function,
            rule,
            config,
            traces,
            stats: LearnerStats::default(),
        })
    }

    /// Learn from one transition and return its TD error
    pub fn update(&mut self, transition: &Transition) -> Result<f64> {
        let td_error = self.rule.td_error(transition, &self.function)?;
        let gradient = self.rule.gradient(transition, &self.function)?;
        RLError::check_dim(self.function.num_weights(), gradient.len())?;

        if !td_error.is_finite() {
            warn!(td_error, "non-finite TD error");
        }

        let alpha = self.config.learning_rate.value(self.stats.updates);
        self.traces
            .update(self.rule.gamma() * self.config.lambda, &gradient)?;
        self.function
            .add_scaled(alpha * td_error, self.traces.values())?;
        self.stats.record(td_error, transition.terminal);

        debug!(
            td_error,
            alpha,
            terminal = transition.terminal,
            updates = self.stats.updates,
            "td update"
        );

        if transition.terminal {
            self.traces.reset();
            trace!(episodes = self.stats.episodes, "episode finished, traces cleared");
        }
        Ok(td_error)
    }

    /// Learn from a sequence of transitions, returning every TD error
    pub fn update_all<'a, I>(&mut self, transitions: I) -> Result<Vec<f64>>
    where
        I: IntoIterator<Item = &'a Transition>,
    {
        transitions.into_iter().map(|t| self.update(t)).collect()
    }

    /// Forget traces from a previous, unfinished episode
    pub fn new_episode(&mut self) {
        self.traces.reset();
        trace!("traces cleared for new episode");
    }

    /// The learned function
    pub fn function(&self) -> &F {
        &self.function
    }

    /// Give back the learned function
    pub fn into_function(self) -> F {
        self.function
    }

    /// The TD rule in use
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Current configuration
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Update counters
    pub fn stats(&self) -> &LearnerStats {
        &self.stats
    }

    /// Current eligibility traces
    pub fn traces(&self) -> &EligibilityTraces {
        &self.traces
    }

    pub(crate) fn restore(&mut self, config: LearnerConfig, stats: LearnerStats) {
        self.traces = EligibilityTraces::new(self.function.num_weights(), config.traces);
        self.config = config;
        self.stats = stats;
    }

    pub(crate) fn function_mut(&mut self) -> &mut F {
        &mut self.function
    }
}

impl<Q: DifferentiableQFunction> QLearner<Q> {
    /// Q-learning with the discount factor taken from `config`
    pub fn q_learning(q: Q, config: LearnerConfig) -> Result<Self> {
        let rule = QLearning::new(config.gamma);
        Self::new(q, rule, config)
    }
}

impl<Q: DifferentiableQFunction> SarsaLearner<Q> {
    /// SARSA with the discount factor taken from `config`
    pub fn sarsa(q: Q, config: LearnerConfig) -> Result<Self> {
        let rule = Sarsa::new(config.gamma);
        Self::new(q, rule, config)
    }
}

impl<V: DifferentiableValueFunction> ValueLearner<V> {
    /// State-value TD with the discount factor taken from `config`
    pub fn state_value(v: V, config: LearnerConfig) -> Result<Self> {
        let rule = StateValueTd::new(config.gamma);
        Self::new(v, rule, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::tests::{step, StubQ};
    use crate::traces::TraceKind;
    use approx::assert_relative_eq;
    use gradrl_core::{
        Action, ActionSet, ActionValueFunction, IndexFeatures, LinearQFunction,
        LinearValueFunction, State, Trajectory, ValueFunction,
    };
    use ndarray::{arr1, Array1};

    #[test]
    fn test_one_step_update_is_alpha_td_gradient() {
        let q = StubQ::new(3);
        let config = LearnerConfig::default().with_learning_rate(0.5).with_gamma(0.9);
        let mut learner = QLearner::q_learning(q, config).unwrap();

        let delta = learner.update(&step(1.0, false)).unwrap();
        assert_relative_eq!(delta, 1.7);
        // 0.5 * 1.7 * [1, 2, 3]
        let w = learner.function().weights();
        assert_relative_eq!(w[0], 0.85, epsilon = 1e-12);
        assert_relative_eq!(w[1], 1.7, epsilon = 1e-12);
        assert_relative_eq!(w[2], 2.55, epsilon = 1e-12);
        assert_eq!(learner.stats().updates, 1);
    }

    #[test]
    fn test_gamma_mismatch_rejected() {
        let result = GradientDescentTdLearner::new(
            StubQ::new(1),
            QLearning::new(0.5),
            LearnerConfig::default().with_gamma(0.9),
        );
        assert!(matches!(result, Err(RLError::InvalidConfig(_))));
    }

    #[test]
    fn test_wrong_gradient_length_leaves_weights_alone() {
        let mut q = StubQ::new(3);
        q.grad = arr1(&[1.0]);
        let mut learner = QLearner::q_learning(q, LearnerConfig::default()).unwrap();

        let result = learner.update(&step(1.0, false));
        assert!(matches!(
            result,
            Err(RLError::DimensionMismatch { expected: 3, actual: 1 })
        ));
        assert_eq!(learner.function().weights(), &Array1::<f64>::zeros(3));
        assert_eq!(learner.stats().updates, 0);
    }

    fn chain() -> (Vec<Transition>, Trajectory) {
        // states 0 -> 1 -> 2 (terminal); action 0 moves right, action 1 stays put
        let right = Action::discrete(0);
        let stay = Action::discrete(1);
        let sweep = vec![
            Transition::new([0.0], stay.clone(), 0.0, [0.0]),
            Transition::new([0.0], right.clone(), 0.0, [1.0]),
            Transition::new([1.0], stay, 0.0, [1.0]),
            Transition::new([1.0], right.clone(), 1.0, [2.0]).with_terminal(true),
        ];

        let mut path = Trajectory::new();
        path.push(Transition::new([0.0], right.clone(), 0.0, [1.0]));
        path.push(Transition::new([1.0], right, 1.0, [2.0]).with_terminal(true));
        (sweep, path)
    }

    #[test]
    fn test_tabular_q_learning_converges_on_chain() {
        let (sweep, path) = chain();
        let q = LinearQFunction::per_action(IndexFeatures::new(3), ActionSet::discrete(2).unwrap());
        let config = LearnerConfig::default().with_learning_rate(0.5).with_gamma(0.9);
        let mut learner = QLearner::q_learning(q, config).unwrap();

        for _ in 0..500 {
            learner.update_all(&sweep).unwrap();
        }

        let q = learner.into_function();
        let returns = path.returns(0.9);
        let right = Action::discrete(0);
        let stay = Action::discrete(1);
        assert_relative_eq!(q.q_value(&State::from([0.0]), &right).unwrap(), returns[0], epsilon = 1e-6);
        assert_relative_eq!(q.q_value(&State::from([1.0]), &right).unwrap(), returns[1], epsilon = 1e-6);
        assert_relative_eq!(q.q_value(&State::from([1.0]), &stay).unwrap(), 0.9, epsilon = 1e-6);
        assert_relative_eq!(q.q_value(&State::from([0.0]), &stay).unwrap(), 0.81, epsilon = 1e-6);
        assert_eq!(q.best_action(&State::from([0.0])).unwrap().0, Action::discrete(0));
    }

    #[test]
    fn test_sarsa_learner_follows_chosen_actions() {
        let q = LinearQFunction::per_action(IndexFeatures::new(3), ActionSet::discrete(2).unwrap());
        let config = LearnerConfig::default().with_learning_rate(0.5).with_gamma(0.9);
        let mut learner = SarsaLearner::sarsa(q, config).unwrap();

        let episode = [
            Transition::new([0.0], [0.0], 0.0, [1.0]).with_next_action([0.0]),
            Transition::new([1.0], [0.0], 1.0, [2.0]).with_terminal(true),
        ];
        for _ in 0..200 {
            learner.update_all(&episode).unwrap();
        }
        let q = learner.function();
        assert_relative_eq!(q.q_value(&State::from([0.0]), &Action::discrete(0)).unwrap(), 0.9, epsilon = 1e-6);
        // never tried
        assert_eq!(q.q_value(&State::from([0.0]), &Action::discrete(1)).unwrap(), 0.0);
        assert_eq!(learner.stats().episodes, 200);
    }

    #[test]
    fn test_lambda_spreads_credit_backwards() {
        let episode = [
            Transition::new([0.0], [0.0], 0.0, [1.0]),
            Transition::new([1.0], [0.0], 1.0, [0.0]).with_terminal(true),
        ];

        let one_step = LearnerConfig::default().with_learning_rate(1.0).with_gamma(1.0);
        let mut learner =
            ValueLearner::state_value(LinearValueFunction::new(IndexFeatures::new(2)), one_step.clone()).unwrap();
        learner.update_all(&episode).unwrap();
        assert_eq!(learner.function().weights(), &arr1(&[0.0, 1.0]));

        let lambda_one = one_step.with_traces(1.0, TraceKind::Accumulating);
        let mut learner =
            ValueLearner::state_value(LinearValueFunction::new(IndexFeatures::new(2)), lambda_one).unwrap();
        learner.update_all(&episode).unwrap();
        assert_eq!(learner.function().weights(), &arr1(&[1.0, 1.0]));
        assert_relative_eq!(learner.function().value(&State::from([0.0])).unwrap(), 1.0);

        // terminal step wiped the traces
        assert!(learner.traces().values().iter().all(|e| *e == 0.0));
    }

    #[test]
    fn test_new_episode_clears_traces() {
        let config = LearnerConfig::default()
            .with_gamma(1.0)
            .with_traces(0.5, TraceKind::Replacing);
        let mut learner =
            ValueLearner::state_value(LinearValueFunction::new(IndexFeatures::new(2)), config).unwrap();
        learner
            .update(&Transition::new([0.0], [0.0], 0.0, [1.0]))
            .unwrap();
        assert_eq!(learner.traces().values(), &arr1(&[1.0, 0.0]));
        learner.new_episode();
        assert_eq!(learner.traces().values(), &arr1(&[0.0, 0.0]));
    }

    #[test]
    fn test_schedule_drives_step_size() {
        let mut config = LearnerConfig::default().with_gamma(1.0);
        config.learning_rate = crate::schedule::LearningRate::Linear {
            start: 1.0,
            end: 0.0,
            steps: 2,
        };
        let mut learner =
            ValueLearner::state_value(LinearValueFunction::new(IndexFeatures::new(1)), config).unwrap();
        let t = Transition::new([0.0], [0.0], 1.0, [0.0]).with_terminal(true);

        learner.update(&t).unwrap(); // alpha 1.0, delta 1.0
        assert_relative_eq!(learner.function().weights()[0], 1.0);
        learner.update(&t).unwrap(); // alpha 0.5, delta 0.0
        assert_relative_eq!(learner.function().weights()[0], 1.0);
        learner.update(&t).unwrap(); // alpha 0.0
        assert_relative_eq!(learner.function().weights()[0], 1.0);
    }
}
