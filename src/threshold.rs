//! # Change-of-Treatment Decision Rule
//!
//! A conservative rule: recommend changing a subject's treatment only when
//! the best point-estimate arm beats their current value by a gap that
//! survives a batch-size-dependent confidence correction. The correction
//! multiplier is shared by every subject in the batch and grows slowly (as
//! `sqrt(ln M)`) with its size, in the manner of a simultaneous-confidence
//! adjustment over `M` comparisons.

use itertools::izip;
use ndarray::{Array1, ArrayView1, ArrayView2};
use thiserror::Error;

/// Simultaneous-confidence level for the whole batch; the critical multiplier
/// is `sqrt(-2 * ln(SWITCH_ALPHA / M))`.
const SWITCH_ALPHA: f64 = 0.1;

#[derive(Error, Debug)]
pub enum ThresholdError {
    #[error("mean matrix is {mean_rows}x{mean_cols} but std matrix is {std_rows}x{std_cols}")]
    MeanStdShapeMismatch {
        mean_rows: usize,
        mean_cols: usize,
        std_rows: usize,
        std_cols: usize,
    },
    #[error("prior vector has {prior_len} entries for a {rows}-row batch")]
    PriorLengthMismatch { prior_len: usize, rows: usize },
    #[error("prediction matrices have no arm columns")]
    NoArms,
}

/// Per-subject verdict on whether to change treatment.
///
/// For each subject: the upper confidence bound of every arm is
/// `mean + c * std`; the gap is `max(prior - min_arm(bound), 0)`; the verdict
/// is true iff `min_arm(mean) < prior - gap`. A subject already below every
/// arm's bound has zero gap and is decided on the point estimates alone.
pub fn prescription_change_decisions(
    mean: ArrayView2<f64>,
    std: ArrayView2<f64>,
    prior: ArrayView1<f64>,
) -> Result<Array1<bool>, ThresholdError> {
    if mean.dim() != std.dim() {
        return Err(ThresholdError::MeanStdShapeMismatch {
            mean_rows: mean.nrows(),
            mean_cols: mean.ncols(),
            std_rows: std.nrows(),
            std_cols: std.ncols(),
        });
    }
    if prior.len() != mean.nrows() {
        return Err(ThresholdError::PriorLengthMismatch {
            prior_len: prior.len(),
            rows: mean.nrows(),
        });
    }
    if mean.ncols() == 0 {
        return Err(ThresholdError::NoArms);
    }

    let batch = mean.nrows();
    if batch == 0 {
        return Ok(Array1::from_vec(Vec::new()));
    }
    let critical = (-2.0 * (SWITCH_ALPHA / batch as f64).ln()).sqrt();
    log::debug!("batch of {batch}: critical multiplier {critical:.4}");

    let mut decisions = Vec::with_capacity(batch);
    for (means, stds, &current) in izip!(mean.outer_iter(), std.outer_iter(), prior.iter()) {
        let bound = means
            .iter()
            .zip(stds.iter())
            .map(|(&m, &s)| m + critical * s)
            .fold(f64::INFINITY, f64::min);
        let gap = (current - bound).max(0.0);
        let best = means.fold(f64::INFINITY, |acc, &m| acc.min(m));
        decisions.push(best < current - gap);
    }
    Ok(Array1::from_vec(decisions))
}
