//! # Ensemble Prediction with Dispersion
//!
//! Per arm, the core model supplies the point prediction and the sub-models
//! (bootstrap refits or similar) supply a dispersion estimate: the population
//! standard deviation of their outputs, computed independently for every
//! input row.

use crate::model::ArmModels;
use ndarray::{Array2, ArrayView2, Axis};
use thiserror::Error;

/// Aligned `[M, K]` mean and std matrices for one input batch.
#[derive(Debug, Clone)]
pub struct PredictionBundle {
    /// Point predictions from each arm's core model.
    pub mean: Array2<f64>,
    /// Population standard deviation (ddof = 0) across each arm's sub-models.
    pub std: Array2<f64>,
}

#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("no arm model collections were provided")]
    NoArms,
    #[error("arm {arm} has no sub-models, so its dispersion is undefined")]
    NoSubModels { arm: usize },
    #[error("arm {arm}: a model returned {found} predictions for a {expected}-row batch")]
    PredictionLengthMismatch {
        arm: usize,
        expected: usize,
        found: usize,
    },
}

/// Evaluates every arm's models over `input`.
///
/// The std for an arm with exactly one sub-model is exactly zero (a
/// single-point population has no dispersion); that output is preserved
/// rather than replaced with a heuristic. An arm with zero sub-models is a
/// configuration error, not a zero.
pub fn predict_with_std(
    models: &[ArmModels],
    input: ArrayView2<f64>,
) -> Result<PredictionBundle, EnsembleError> {
    if models.is_empty() {
        return Err(EnsembleError::NoArms);
    }
    let rows = input.nrows();
    let mut mean = Array2::zeros((rows, models.len()));
    let mut std = Array2::zeros((rows, models.len()));

    for (arm, collection) in models.iter().enumerate() {
        if collection.subs.is_empty() {
            return Err(EnsembleError::NoSubModels { arm });
        }

        let core = collection.core.predict(input);
        if core.len() != rows {
            return Err(EnsembleError::PredictionLengthMismatch {
                arm,
                expected: rows,
                found: core.len(),
            });
        }
        mean.column_mut(arm).assign(&core);

        let mut sub_outputs = Array2::zeros((collection.subs.len(), rows));
        for (s, sub) in collection.subs.iter().enumerate() {
            let output = sub.predict(input);
            if output.len() != rows {
                return Err(EnsembleError::PredictionLengthMismatch {
                    arm,
                    expected: rows,
                    found: output.len(),
                });
            }
            sub_outputs.row_mut(s).assign(&output);
        }
        std.column_mut(arm)
            .assign(&sub_outputs.std_axis(Axis(0), 0.0));
    }

    log::debug!(
        "ensemble prediction over {rows} rows and {} arms",
        models.len()
    );
    Ok(PredictionBundle { mean, std })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Predictor;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2};

    /// Predicts a fixed constant for every input row.
    struct Constant(f64);

    impl Predictor for Constant {
        fn predict(&self, input: ArrayView2<f64>) -> Array1<f64> {
            Array1::from_elem(input.nrows(), self.0)
        }
    }

    /// Misbehaving model that ignores the batch size.
    struct WrongLength;

    impl Predictor for WrongLength {
        fn predict(&self, _input: ArrayView2<f64>) -> Array1<f64> {
            Array1::zeros(1)
        }
    }

    fn batch(rows: usize) -> Array2<f64> {
        Array2::zeros((rows, 3))
    }

    #[test]
    fn mean_comes_from_the_core_and_std_from_the_subs() {
        let models = vec![
            ArmModels {
                core: Box::new(Constant(5.0)),
                subs: vec![Box::new(Constant(4.0)), Box::new(Constant(6.0))],
            },
            ArmModels {
                core: Box::new(Constant(-1.0)),
                subs: vec![
                    Box::new(Constant(0.0)),
                    Box::new(Constant(0.0)),
                    Box::new(Constant(3.0)),
                ],
            },
        ];
        let input = batch(4);
        let bundle = predict_with_std(&models, input.view()).unwrap();

        assert_eq!(bundle.mean.shape(), &[4, 2]);
        assert_eq!(bundle.std.shape(), &[4, 2]);
        for row in 0..4 {
            assert_abs_diff_eq!(bundle.mean[[row, 0]], 5.0);
            assert_abs_diff_eq!(bundle.mean[[row, 1]], -1.0);
            // Population std of {4, 6} is 1; of {0, 0, 3} is sqrt(2).
            assert_abs_diff_eq!(bundle.std[[row, 0]], 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(bundle.std[[row, 1]], 2.0f64.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn a_single_sub_model_yields_exact_zero_dispersion() {
        let models = vec![ArmModels {
            core: Box::new(Constant(2.0)),
            subs: vec![Box::new(Constant(7.0))],
        }];
        let input = batch(3);
        let bundle = predict_with_std(&models, input.view()).unwrap();
        for row in 0..3 {
            assert_eq!(bundle.std[[row, 0]], 0.0);
        }
    }

    #[test]
    fn zero_sub_models_is_a_configuration_error() {
        let models = vec![ArmModels {
            core: Box::new(Constant(2.0)),
            subs: vec![],
        }];
        let input = batch(3);
        assert!(matches!(
            predict_with_std(&models, input.view()),
            Err(EnsembleError::NoSubModels { arm: 0 })
        ));
    }

    #[test]
    fn wrong_length_predictions_are_rejected() {
        let models = vec![ArmModels {
            core: Box::new(WrongLength),
            subs: vec![Box::new(Constant(0.0))],
        }];
        let input = batch(3);
        assert!(matches!(
            predict_with_std(&models, input.view()),
            Err(EnsembleError::PredictionLengthMismatch {
                arm: 0,
                expected: 3,
                found: 1
            })
        ));
    }

    #[test]
    fn empty_model_list_is_rejected() {
        let input = batch(3);
        assert!(matches!(
            predict_with_std(&[], input.view()),
            Err(EnsembleError::NoArms)
        ));
    }
}
