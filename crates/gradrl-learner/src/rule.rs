//! TD update rules
//!
//! A rule turns one [`Transition`] into a TD error and the gradient that
//! error should be applied along. Rules are pure: they read the value
//! function, never write it, and pass its errors through untouched.
//! Applying `weights += alpha * td_error * gradient` is the caller's job
//! (see [`crate::GradientDescentTdLearner`]).

use ndarray::Array1;

use gradrl_core::{Parameterized, Result, Transition};

/// Computes the TD error and gradient of one transition for a function `F`
pub trait TdRule<F: Parameterized + ?Sized>: Send + Sync {
    /// Discount factor applied to the successor value
    fn gamma(&self) -> f64;

    /// Scalar TD error `reward + gamma * successor - prediction`
    fn td_error(&self, transition: &Transition, function: &F) -> Result<f64>;

    /// Gradient of the prediction with respect to the function's weights
    fn gradient(&self, transition: &Transition, function: &F) -> Result<Array1<f64>>;

    /// The TD error broadcast to every weight dimension.
    ///
    /// Every entry holds the same scalar; the vector has the function's
    /// weight dimensionality so it can be multiplied elementwise with
    /// [`TdRule::gradient`].
    fn td_errors(&self, transition: &Transition, function: &F) -> Result<Array1<f64>> {
        let delta = self.td_error(transition, function)?;
        Ok(Array1::from_elem(function.num_weights(), delta))
    }
}
