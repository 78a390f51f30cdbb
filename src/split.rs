//! # Held-Out Validation Split
//!
//! Partitions each arm's records into a training fold and a held-out fold.
//! The split is driven entirely by an explicit seed: the same seed and the
//! same arm size always reproduce the same partition, and one permutation per
//! arm is applied to features, outcomes and prior values alike so a subject's
//! triple stays paired. Arms never interact.

use crate::data::{self, ArmData};
use ndarray::Axis;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

/// Fraction of each arm held out for validation. The held-out fold size is
/// `ceil(VALID_FRACTION * n)`, so every splittable arm keeps a non-empty fold
/// on both sides.
const VALID_FRACTION: f64 = 0.20;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("arm {arm} has only {len} records; at least 2 are required to split")]
    ArmTooSmall { arm: usize, len: usize },
    #[error(transparent)]
    Data(#[from] data::DataError),
}

/// Per-arm training and held-out folds, indexed by arm.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub train: Vec<ArmData>,
    pub valid: Vec<ArmData>,
}

/// Splits every arm independently into an 80% training fold and a 20%
/// held-out fold.
///
/// A fresh `StdRng` is seeded with `seed` for each arm, so an arm's partition
/// depends only on the seed and its own size, not on how many arms precede it.
pub fn build_validation_set(arms: &[ArmData], seed: u64) -> Result<SplitData, SplitError> {
    data::validate_arms(arms)?;

    let mut train = Vec::with_capacity(arms.len());
    let mut valid = Vec::with_capacity(arms.len());
    for (arm, records) in arms.iter().enumerate() {
        let n = records.len();
        if n < 2 {
            return Err(SplitError::ArmTooSmall { arm, len: n });
        }

        let n_valid = (VALID_FRACTION * n as f64).ceil() as usize;
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        let (valid_idx, train_idx) = indices.split_at(n_valid);

        log::debug!(
            "arm {arm}: {} training rows, {} held out",
            train_idx.len(),
            valid_idx.len()
        );
        train.push(take_rows(records, train_idx));
        valid.push(take_rows(records, valid_idx));
    }

    log::info!("split {} arms with seed {seed}", arms.len());
    Ok(SplitData { train, valid })
}

/// Applies one row-index selection to all three parallel arrays.
fn take_rows(records: &ArmData, rows: &[usize]) -> ArmData {
    ArmData {
        x: records.x.select(Axis(0), rows),
        y: records.y.select(Axis(0), rows),
        u: records.u.select(Axis(0), rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use std::collections::HashSet;

    /// Arm where row `i` carries `i` in every field, so pairing and coverage
    /// can be read straight off the split output.
    fn indexed_arm(n: usize) -> ArmData {
        ArmData {
            x: Array2::from_shape_fn((n, 2), |(i, _)| i as f64),
            y: Array1::from_shape_fn(n, |i| i as f64),
            u: Array1::from_shape_fn(n, |i| 1000.0 + i as f64),
        }
    }

    #[test]
    fn folds_reconstruct_the_arm_without_overlap() {
        let arms = vec![indexed_arm(25), indexed_arm(10)];
        let split = build_validation_set(&arms, 0).unwrap();

        for arm in 0..arms.len() {
            let n = arms[arm].len();
            let mut seen: HashSet<usize> = HashSet::new();
            for y in split.train[arm].y.iter().chain(split.valid[arm].y.iter()) {
                assert!(seen.insert(*y as usize), "row {y} appeared twice");
            }
            assert_eq!(seen.len(), n);
        }
    }

    #[test]
    fn held_out_fraction_is_twenty_percent() {
        let arms = vec![indexed_arm(25), indexed_arm(10), indexed_arm(7)];
        let split = build_validation_set(&arms, 7).unwrap();
        assert_eq!(split.valid[0].len(), 5);
        assert_eq!(split.valid[1].len(), 2);
        // ceil(0.2 * 7) = 2
        assert_eq!(split.valid[2].len(), 2);
        assert_eq!(split.train[2].len(), 5);
    }

    #[test]
    fn same_seed_reproduces_the_partition() {
        let arms = vec![indexed_arm(40)];
        let first = build_validation_set(&arms, 42).unwrap();
        let second = build_validation_set(&arms, 42).unwrap();
        assert_eq!(first.valid[0].y, second.valid[0].y);
        assert_eq!(first.train[0].y, second.train[0].y);

        let other = build_validation_set(&arms, 43).unwrap();
        assert_ne!(first.valid[0].y, other.valid[0].y);
    }

    #[test]
    fn permutation_keeps_subject_triples_paired() {
        let arms = vec![indexed_arm(30)];
        let split = build_validation_set(&arms, 3).unwrap();
        for fold in [&split.train[0], &split.valid[0]] {
            for (row, (&y, &u)) in fold.y.iter().zip(fold.u.iter()).enumerate() {
                assert_eq!(u, 1000.0 + y);
                assert_eq!(fold.x[[row, 0]], y);
            }
        }
    }

    #[test]
    fn single_record_arm_is_rejected() {
        let arms = vec![indexed_arm(5), indexed_arm(1)];
        match build_validation_set(&arms, 0) {
            Err(SplitError::ArmTooSmall { arm, len }) => assert_eq!((arm, len), (1, 1)),
            other => panic!("expected ArmTooSmall, got {other:?}"),
        }
    }
}
