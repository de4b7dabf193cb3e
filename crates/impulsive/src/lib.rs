//! Impulsive two-body building blocks shared by the transfer planner.
//!
//! The modules are layered: `stumpff` and `kepler` provide the universal
//! propagation primitives, `lambert` the boundary-value solver built on top
//! of them, and `transfers` the closed-form circular estimators.

use thiserror::Error;

mod battin;
pub mod kepler;
pub mod lambert;
pub mod stumpff;
pub mod transfers;

/// An iteration failed to converge within its cap.
///
/// This is a bug signal rather than a normal outcome: callers surface it
/// unchanged instead of retrying.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("numerical non-convergence in {context} after {iterations} iterations")]
pub struct NumericalNonConvergence {
    /// Which solver gave up.
    pub context: &'static str,
    /// Iterations spent before giving up.
    pub iterations: u32,
}

impl NumericalNonConvergence {
    pub(crate) fn new(context: &'static str, iterations: u32) -> Self {
        Self {
            context,
            iterations,
        }
    }
}
