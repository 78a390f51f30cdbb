//! # Boltzmann Policy Construction and Evaluation
//!
//! Outcomes are costs to minimize, not rewards: the policy puts the most
//! probability mass on the arm with the smallest predicted outcome. `epsilon`
//! is an inverse temperature: zero flattens every row to uniform, large
//! values concentrate mass on the per-row minimizer. Each row is stabilized
//! against its own minimum before exponentiation, which leaves the resulting
//! distribution unchanged but keeps every exponent in `[-inf, 0]`.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("epsilon must be a finite non-negative number, got {0}")]
    InvalidEpsilon(f64),
    #[error("predicted-outcome matrix has no arm columns")]
    NoArms,
    #[error(
        "policy matrix is {policy_rows}x{policy_cols} but the outcome matrix is {outcome_rows}x{outcome_cols}"
    )]
    ShapeMismatch {
        policy_rows: usize,
        policy_cols: usize,
        outcome_rows: usize,
        outcome_cols: usize,
    },
}

/// Converts per-arm predicted outcomes into a per-subject probability
/// distribution over arms.
///
/// Every output row is non-negative and sums to 1: the stabilized best arm
/// always contributes `exp(0) = 1` to the row sum.
pub fn boltzmann_policy(
    y_pred: ArrayView2<f64>,
    epsilon: f64,
) -> Result<Array2<f64>, PolicyError> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(PolicyError::InvalidEpsilon(epsilon));
    }
    if y_pred.ncols() == 0 {
        return Err(PolicyError::NoArms);
    }

    let mut policy = Array2::zeros(y_pred.raw_dim());
    for (mut weights, outcomes) in policy.outer_iter_mut().zip(y_pred.outer_iter()) {
        let row_min = outcomes.fold(f64::INFINITY, |acc, &v| acc.min(v));
        let mut sum = 0.0;
        for (w, &v) in weights.iter_mut().zip(outcomes.iter()) {
            *w = (-epsilon * (v - row_min)).exp();
            sum += *w;
        }
        weights.mapv_inplace(|w| w / sum);
    }
    Ok(policy)
}

/// Expected outcome per subject under a randomized policy: the
/// probability-weighted sum of the (possibly imputed) per-arm outcomes.
///
/// The caller is responsible for row alignment between the two matrices; only
/// their shapes are checked here.
pub fn evaluate_policy(
    policy: ArrayView2<f64>,
    outcome: ArrayView2<f64>,
) -> Result<Array1<f64>, PolicyError> {
    if policy.dim() != outcome.dim() {
        return Err(PolicyError::ShapeMismatch {
            policy_rows: policy.nrows(),
            policy_cols: policy.ncols(),
            outcome_rows: outcome.nrows(),
            outcome_cols: outcome.ncols(),
        });
    }
    Ok((&policy * &outcome).sum_axis(Axis(1)))
}
