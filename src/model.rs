//! Capability contracts for caller-supplied fitted models.
//!
//! The crate never fits or selects the base regression family; it consumes
//! already-fitted predictors and pre-fit feature transforms through the two
//! small contracts below. Any concrete regressor or scaler satisfying the
//! contract is interchangeable.

use ndarray::{Array1, Array2, ArrayView2};

/// A fitted regressor: maps a batch of feature rows to one outcome per row.
///
/// Implementations must be read-only during prediction; batches may be
/// evaluated from worker threads.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: ArrayView2<f64>) -> Array1<f64>;
}

/// A pre-fit feature transform applied before any distance computation or
/// prediction.
pub trait FeatureTransform: Send + Sync {
    fn transform(&self, input: ArrayView2<f64>) -> Array2<f64>;
}

/// One arm's model collection: the core model supplies the point prediction,
/// the sub-models (e.g. bootstrap refits) are used only for dispersion.
pub struct ArmModels {
    pub core: Box<dyn Predictor>,
    pub subs: Vec<Box<dyn Predictor>>,
}
