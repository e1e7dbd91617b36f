//! Learner statistics

use serde::{Deserialize, Serialize};

/// Running counters kept by a learner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerStats {
    /// Updates applied so far
    pub updates: usize,
    /// Terminal transitions seen
    pub episodes: usize,
    /// TD error of the latest update
    pub last_td_error: Option<f64>,
    /// Mean absolute TD error over all updates
    pub mean_abs_td_error: f64,
}

impl LearnerStats {
    /// Fold one update into the counters
    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, td_error: f64, terminal: bool) {
        self.updates += 1;
        self.mean_abs_td_error += (td_error.abs() - self.mean_abs_td_error) / self.updates as f64;
        self.last_td_error = Some(td_error);
        if terminal {
            self.episodes += 1;
        }
    }
}
