use rand::SeedableRng;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::PredictError;

/// Train/test partition of draw indices.
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl DataSplit {
    /// Every draw is used both for fitting and for scoring.
    pub fn full(n: usize) -> Self {
        DataSplit {
            train: (0..n).collect(),
            test: (0..n).collect(),
        }
    }

    /// Seeded shuffle, then the first ceil(n * test_fraction) indices are held out.
    pub fn holdout(n: usize, test_fraction: f64, seed: u64) -> Result<Self, PredictError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(PredictError::Config(format!(
                "holdout_fraction must be in (0, 1), got {test_fraction}"
            )));
        }
        let test_len = (n as f64 * test_fraction).ceil() as usize;
        if n < 2 || test_len >= n {
            return Err(PredictError::InsufficientData { needed: 2, got: n });
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let train = indices.split_off(test_len);
        Ok(DataSplit { train, test: indices })
    }
}
