//! Saving and restoring learner state

use async_trait::async_trait;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

use gradrl_core::{Parameterized, RLError, Result};

use crate::config::LearnerConfig;
use crate::learner::GradientDescentTdLearner;
use crate::rule::TdRule;
use crate::stats::LearnerStats;

/// Everything needed to resume learning: configuration, weights, counters.
///
/// Eligibility traces are not saved; a restored learner starts a fresh episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Learner configuration
    pub config: LearnerConfig,
    /// Weights of the learned function
    pub weights: Array1<f64>,
    /// Update counters
    pub stats: LearnerStats,
}

impl Checkpoint {
    /// Reject snapshots holding NaN or infinite values, which JSON cannot represent
    pub fn ensure_finite(&self) -> Result<()> {
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(RLError::Computation(format!(
                "weight {i} is {}, refusing to checkpoint",
                self.weights[i]
            )));
        }
        let td = self.stats.last_td_error.unwrap_or(0.0);
        if !(td.is_finite() && self.stats.mean_abs_td_error.is_finite()) {
            return Err(RLError::Computation(
                "TD error statistics are not finite, refusing to checkpoint".into(),
            ));
        }
        Ok(())
    }
}

/// Persistence for learners
#[async_trait]
pub trait Persist {
    /// Write the current state to `path` as JSON
    async fn save(&self, path: &Path) -> Result<()>;

    /// Replace the current state with the one stored at `path`
    async fn load(&mut self, path: &Path) -> Result<()>;
}

impl<F, R> GradientDescentTdLearner<F, R>
where
    F: Parameterized,
    R: TdRule<F>,
{
    /// Snapshot the learner
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            config: self.config().clone(),
            weights: self.function().weights().clone(),
            stats: self.stats().clone(),
        }
    }

    /// Restore from a snapshot taken of a learner with the same shape and discount
    pub fn restore_checkpoint(&mut self, checkpoint: Checkpoint) -> Result<()> {
        checkpoint.config.validate()?;
        RLError::check_dim(self.function().num_weights(), checkpoint.weights.len())?;
        if checkpoint.config.gamma.to_bits() != self.rule().gamma().to_bits() {
            return Err(RLError::InvalidConfig(format!(
                "checkpoint discounts with {} but the rule uses {}",
                checkpoint.config.gamma,
                self.rule().gamma()
            )));
        }
        self.function_mut().set_weights(checkpoint.weights)?;
        self.restore(checkpoint.config, checkpoint.stats);
        Ok(())
    }
}

#[async_trait]
impl<F, R> Persist for GradientDescentTdLearner<F, R>
where
    F: Parameterized + Send + Sync,
    R: TdRule<F>,
{
    async fn save(&self, path: &Path) -> Result<()> {
        let checkpoint = self.checkpoint();
        checkpoint.ensure_finite()?;
        let json = serde_json::to_string_pretty(&checkpoint)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), updates = self.stats().updates, "saved learner checkpoint");
        Ok(())
    }

    async fn load(&mut self, path: &Path) -> Result<()> {
        let json = tokio::fs::read_to_string(path).await?;
        let checkpoint: Checkpoint = serde_json::from_str(&json)?;
        self.restore_checkpoint(checkpoint)?;
        tracing::info!(path = %path.display(), updates = self.stats().updates, "loaded learner checkpoint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learner::QLearner;
    use crate::traces::TraceKind;
    use gradrl_core::{
        ActionBlockFeatures, ActionSet, ActionValueFunction, IndexFeatures, LinearQFunction, State,
        Transition,
    };

    fn learner(states: usize) -> QLearner<LinearQFunction<ActionBlockFeatures<IndexFeatures>>> {
        let q = LinearQFunction::per_action(IndexFeatures::new(states), ActionSet::discrete(2).unwrap());
        let config = LearnerConfig::default()
            .with_learning_rate(0.5)
            .with_traces(0.3, TraceKind::Replacing);
        QLearner::q_learning(q, config).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("q.json");

        let mut trained = learner(3);
        trained
            .update(&Transition::new([1.0], [0.0], 1.0, [2.0]).with_terminal(true))
            .unwrap();
        trained.save(&path).await.unwrap();

        let mut fresh = learner(3);
        fresh.load(&path).await.unwrap();
        assert_eq!(fresh.checkpoint(), trained.checkpoint());
        assert_eq!(
            fresh
                .function()
                .q_value(&State::from([1.0]), &gradrl_core::Action::discrete(0))
                .unwrap(),
            0.5
        );
        assert_eq!(fresh.stats().episodes, 1);
    }

    #[tokio::test]
    async fn test_load_rejects_other_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");
        learner(3).save(&path).await.unwrap();

        let mut other = learner(4);
        let result = other.load(&path).await;
        assert!(matches!(
            result,
            Err(RLError::DimensionMismatch { expected: 8, actual: 6 })
        ));
    }

    #[test]
    fn test_restore_rejects_other_discount() {
        let mut q = learner(2);
        let mut snapshot = q.checkpoint();
        snapshot.config.gamma = 0.5;
        assert!(matches!(
            q.restore_checkpoint(snapshot),
            Err(RLError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_save_refuses_diverged_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");

        let mut q = learner(2);
        q.update(&Transition::new([0.0], [1.0], f64::NAN, [1.0]))
            .unwrap();
        let result = q.save(&path).await;
        assert!(matches!(result, Err(RLError::Computation(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_ensure_finite_checks_stats() {
        let mut snapshot = learner(2).checkpoint();
        assert!(snapshot.ensure_finite().is_ok());
        snapshot.stats.mean_abs_td_error = f64::INFINITY;
        assert!(snapshot.ensure_finite().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let mut q = learner(2);
        let result = tokio_test::block_on(q.load(Path::new("/nonexistent/gradrl/q.json")));
        assert!(matches!(result, Err(RLError::Io(_))));
    }
}
