//! # Per-Arm Data Containers
//!
//! Every collection in this crate is indexed by prescription arm. Arms have
//! independent population sizes, so per-arm data lives in an indexed
//! collection of [`ArmData`] values rather than a padded tensor. This module
//! owns the containers, the row-alignment validation every downstream
//! component relies on, and the pooling step that concatenates all arms'
//! records into a single population in arm order.

use ndarray::{Array1, Array2, s};
use thiserror::Error;

/// One arm's observed records. The three arrays are parallel by row: row `i`
/// of `x` is the feature vector of the subject whose observed outcome is
/// `y[i]` and whose prior/baseline value is `u[i]`.
#[derive(Debug, Clone)]
pub struct ArmData {
    /// Feature matrix, shape `[n, d]`.
    pub x: Array2<f64>,
    /// Observed outcome under this arm, length `n`.
    pub y: Array1<f64>,
    /// Prior/baseline value at collection time, length `n`.
    pub u: Array1<f64>,
}

impl ArmData {
    /// Number of records in this arm.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Alignment failures across the per-arm arrays.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("no arms were provided")]
    NoArms,
    #[error(
        "arm {arm} has {x_rows} feature rows, {y_len} outcomes and {u_len} prior values; the three must agree"
    )]
    LengthMismatch {
        arm: usize,
        x_rows: usize,
        y_len: usize,
        u_len: usize,
    },
    #[error(
        "arm {arm} has {found} feature columns but arm 0 has {expected}; all arms must share one feature space"
    )]
    FeatureWidthMismatch {
        arm: usize,
        expected: usize,
        found: usize,
    },
}

/// Checks that every arm's arrays are row-aligned and that all arms share a
/// single feature width. Every public operation that consumes `&[ArmData]`
/// calls this before touching the data.
pub fn validate_arms(arms: &[ArmData]) -> Result<(), DataError> {
    if arms.is_empty() {
        return Err(DataError::NoArms);
    }
    let expected = arms[0].x.ncols();
    for (arm, data) in arms.iter().enumerate() {
        if data.x.nrows() != data.y.len() || data.y.len() != data.u.len() {
            return Err(DataError::LengthMismatch {
                arm,
                x_rows: data.x.nrows(),
                y_len: data.y.len(),
                u_len: data.u.len(),
            });
        }
        if data.x.ncols() != expected {
            return Err(DataError::FeatureWidthMismatch {
                arm,
                expected,
                found: data.x.ncols(),
            });
        }
    }
    Ok(())
}

/// All arms' records concatenated in arm order. Row `i` belongs to the arm
/// `z[i]` under which it was actually observed.
#[derive(Debug, Clone)]
pub struct PooledArms {
    /// Pooled feature matrix, shape `[N, d]`.
    pub x: Array2<f64>,
    /// Pooled observed outcomes, length `N`.
    pub y: Array1<f64>,
    /// True arm index of each pooled row, length `N`.
    pub z: Vec<usize>,
}

/// Concatenates all arms' features and outcomes in arm order, recording each
/// row's true arm.
pub fn pool_arms(arms: &[ArmData]) -> Result<PooledArms, DataError> {
    validate_arms(arms)?;
    let width = arms[0].x.ncols();
    let total: usize = arms.iter().map(ArmData::len).sum();

    let mut x = Array2::zeros((total, width));
    let mut y = Vec::with_capacity(total);
    let mut z = Vec::with_capacity(total);
    let mut offset = 0;
    for (arm, data) in arms.iter().enumerate() {
        let n = data.len();
        x.slice_mut(s![offset..offset + n, ..]).assign(&data.x);
        y.extend(data.y.iter().copied());
        z.extend(std::iter::repeat(arm).take(n));
        offset += n;
    }

    Ok(PooledArms {
        x,
        y: Array1::from_vec(y),
        z,
    })
}
