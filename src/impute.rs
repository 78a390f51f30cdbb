//! # Cross-Arm Outcome Imputation
//!
//! Only the outcome under a subject's true arm is ever observed. For every
//! other arm the outcome must be imputed: per arm, a nearest-neighbor
//! regressor is fitted on that arm's observed records (in transformed feature
//! space) and then asked what every subject in the pooled population would
//! have experienced under that arm. The column for a subject's true arm is
//! overwritten with the observed value as the final step, so the model never
//! displaces ground truth.
//!
//! The neighbor count for arm `j` is `trunc(pho * floor(sqrt(n_j)))`. A
//! misconfigured `pho` or a too-small arm makes that count invalid; the
//! failure is surfaced, never clamped.

use crate::data::{self, ArmData};
use crate::knn::{KnnError, KnnRegressor};
use crate::model::{FeatureTransform, Predictor};
use ndarray::{Array1, Array2, ArrayView2};
use rayon::prelude::*;
use thiserror::Error;

/// Imputation configuration: the neighbor-count scale and one pre-fit
/// transform per arm.
pub struct ImputeContext<'a> {
    /// Neighbor-count scale factor; arm `j` uses
    /// `trunc(pho * floor(sqrt(n_j)))` neighbors.
    pub pho: f64,
    /// Pre-fit feature transforms, indexed by arm. Each arm's transform is
    /// applied both to its own records at fit time and to the pooled
    /// population at prediction time.
    pub transformers: &'a [Box<dyn FeatureTransform>],
}

/// The pooled population and its `[N, K]` outcome matrix.
#[derive(Debug, Clone)]
pub struct ImputedOutcome {
    /// Pooled feature matrix, all arms concatenated in arm order (untransformed).
    pub x: Array2<f64>,
    /// `outcome[i, j]` is the outcome subject `i` would experience under arm
    /// `j`: observed if `j` is the subject's true arm, imputed otherwise.
    pub outcome: Array2<f64>,
}

#[derive(Error, Debug)]
pub enum ImputeError {
    #[error(transparent)]
    Data(#[from] data::DataError),
    #[error("{transformers} transformers were supplied for {arms} arms")]
    TransformerCountMismatch { transformers: usize, arms: usize },
    #[error("arm {arm} has no records; nearest-neighbor imputation needs at least one")]
    EmptyArm { arm: usize },
    #[error(
        "arm {arm}: pho = {pho} with {len} records yields {computed} neighbors; the count must lie in 1..={len}"
    )]
    InvalidNeighborCount {
        arm: usize,
        pho: f64,
        len: usize,
        computed: i64,
    },
    #[error(
        "arm {arm}: transformer produced {fit_width} feature columns at fit time but {predict_width} for the pooled population"
    )]
    TransformWidthMismatch {
        arm: usize,
        fit_width: usize,
        predict_width: usize,
    },
    #[error("arm {arm}: nearest-neighbor fit failed: {source}")]
    Knn { arm: usize, source: KnnError },
}

/// Builds the pooled `[N, K]` outcome matrix for `arms`.
///
/// Per-arm columns are computed in parallel and assembled in arm order, so the
/// result is identical to a sequential per-arm evaluation. The true-arm
/// overwrite runs last, after all columns are in place.
pub fn impute_outcomes(
    arms: &[ArmData],
    ctx: &ImputeContext<'_>,
) -> Result<ImputedOutcome, ImputeError> {
    data::validate_arms(arms)?;
    if ctx.transformers.len() != arms.len() {
        return Err(ImputeError::TransformerCountMismatch {
            transformers: ctx.transformers.len(),
            arms: arms.len(),
        });
    }
    for (arm, records) in arms.iter().enumerate() {
        if records.is_empty() {
            return Err(ImputeError::EmptyArm { arm });
        }
    }

    let pooled = data::pool_arms(arms)?;
    let total = pooled.y.len();
    let num_arms = arms.len();

    let columns: Vec<Array1<f64>> = (0..num_arms)
        .into_par_iter()
        .map(|arm| impute_arm_column(arm, &arms[arm], ctx, pooled.x.view()))
        .collect::<Result<_, _>>()?;

    let mut outcome = Array2::zeros((total, num_arms));
    for (arm, column) in columns.into_iter().enumerate() {
        outcome.column_mut(arm).assign(&column);
    }

    // The observed value always wins over the model at the true arm.
    for (row, (&arm, &observed)) in pooled.z.iter().zip(pooled.y.iter()).enumerate() {
        outcome[[row, arm]] = observed;
    }

    log::info!("imputed a {total} x {num_arms} outcome matrix");
    Ok(ImputedOutcome {
        x: pooled.x,
        outcome,
    })
}

/// Predicted outcome under `arm` for every pooled subject.
fn impute_arm_column(
    arm: usize,
    records: &ArmData,
    ctx: &ImputeContext<'_>,
    pooled_x: ArrayView2<f64>,
) -> Result<Array1<f64>, ImputeError> {
    let len = records.len();
    let computed = (ctx.pho * (len as f64).sqrt().floor()) as i64;
    if computed < 1 || computed as usize > len {
        return Err(ImputeError::InvalidNeighborCount {
            arm,
            pho: ctx.pho,
            len,
            computed,
        });
    }
    let n_neighbors = computed as usize;
    log::debug!("arm {arm}: fitting {n_neighbors}-NN on {len} records");

    let transformer = &ctx.transformers[arm];
    let local_x = transformer.transform(records.x.view());
    let fit_width = local_x.ncols();
    let model = KnnRegressor::fit(local_x, records.y.clone(), n_neighbors)
        .map_err(|source| ImputeError::Knn { arm, source })?;

    let pooled_transformed = transformer.transform(pooled_x);
    if pooled_transformed.ncols() != fit_width {
        return Err(ImputeError::TransformWidthMismatch {
            arm,
            fit_width,
            predict_width: pooled_transformed.ncols(),
        });
    }
    Ok(model.predict(pooled_transformed.view()))
}
