//! # Nearest-Neighbor Regression
//!
//! The bundled [`Predictor`] implementation and the engine behind cross-arm
//! imputation: an exact k-nearest-neighbor regressor that predicts the
//! uniform-weighted mean outcome of the `k` nearest training records under
//! Euclidean distance. Neighbor search is a linear scan per query row, which
//! is exact and fully deterministic; ties in distance resolve toward the
//! lower training-row index. Batch prediction fans out across rows with
//! rayon, and the parallel collect preserves row order, so results are
//! identical to a sequential per-row evaluation.

use crate::model::Predictor;
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnnError {
    #[error("n_neighbors must be at least 1")]
    ZeroNeighbors,
    #[error("n_neighbors ({requested}) exceeds the {available} available training rows")]
    NotEnoughRows { requested: usize, available: usize },
    #[error("feature matrix has {x_rows} rows but {y_len} outcomes")]
    LengthMismatch { x_rows: usize, y_len: usize },
}

/// An exact k-nearest-neighbor regressor over a fixed training set.
#[derive(Debug, Clone)]
pub struct KnnRegressor {
    n_neighbors: usize,
    train_x: Array2<f64>,
    train_y: Array1<f64>,
}

impl KnnRegressor {
    /// Stores the training set for later lookup. The training arrays must be
    /// row-aligned and large enough to supply `n_neighbors` neighbors.
    pub fn fit(
        train_x: Array2<f64>,
        train_y: Array1<f64>,
        n_neighbors: usize,
    ) -> Result<Self, KnnError> {
        if train_x.nrows() != train_y.len() {
            return Err(KnnError::LengthMismatch {
                x_rows: train_x.nrows(),
                y_len: train_y.len(),
            });
        }
        if n_neighbors == 0 {
            return Err(KnnError::ZeroNeighbors);
        }
        if n_neighbors > train_y.len() {
            return Err(KnnError::NotEnoughRows {
                requested: n_neighbors,
                available: train_y.len(),
            });
        }
        Ok(Self {
            n_neighbors,
            train_x,
            train_y,
        })
    }

    pub fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Mean outcome of the `n_neighbors` nearest training rows.
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut distances: Vec<(f64, usize)> = self
            .train_x
            .outer_iter()
            .enumerate()
            .map(|(i, train_row)| {
                let d = row
                    .iter()
                    .zip(train_row.iter())
                    .map(|(a, b)| {
                        let diff = a - b;
                        diff * diff
                    })
                    .sum::<f64>();
                (d, i)
            })
            .collect();

        // Total order on (distance, index) keeps boundary ties deterministic.
        distances.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let sum: f64 = distances[..self.n_neighbors]
            .iter()
            .map(|&(_, i)| self.train_y[i])
            .sum();
        sum / self.n_neighbors as f64
    }
}

impl Predictor for KnnRegressor {
    fn predict(&self, input: ArrayView2<f64>) -> Array1<f64> {
        let predictions: Vec<f64> = input
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| self.predict_row(row))
            .collect();
        Array1::from_vec(predictions)
    }
}
