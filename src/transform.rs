//! Bundled feature transforms.
//!
//! The imputer accepts any pre-fit [`FeatureTransform`]; these are the two
//! implementations shipped with the crate. Fitting happens once, on a
//! reference batch the caller chooses, and `transform` is read-only
//! thereafter.

use crate::model::FeatureTransform;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("cannot fit a scaler on an empty batch")]
    EmptyBatch,
}

/// Passes features through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransform;

impl FeatureTransform for IdentityTransform {
    fn transform(&self, input: ArrayView2<f64>) -> Array2<f64> {
        input.to_owned()
    }
}

/// Per-column centering and scaling, fitted once on a reference batch.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fits column means and population standard deviations. Zero-variance
    /// columns keep a unit scale, so constant features pass through centered
    /// instead of dividing by zero.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self, TransformError> {
        if x.nrows() == 0 {
            return Err(TransformError::EmptyBatch);
        }
        let mean = x.mean_axis(Axis(0)).ok_or(TransformError::EmptyBatch)?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        Ok(Self { mean, scale })
    }
}

impl FeatureTransform for StandardScaler {
    fn transform(&self, input: ArrayView2<f64>) -> Array2<f64> {
        (&input - &self.mean) / &self.scale
    }
}
