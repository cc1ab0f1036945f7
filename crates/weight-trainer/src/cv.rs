use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::gradient::train_weights;
use crate::samples::{mape, TrainingSample};

/// Five-fold cross-validation result: the mean and population std-dev of the per-fold MAPE,
/// computed by training on four folds and scoring on the fifth.
pub struct CvResult {
    pub mean_mape: f64,
    pub std_mape: f64,
}

impl CvResult {
    pub fn exceeds_threshold(&self) -> bool {
        self.std_mape > 0.2 * self.mean_mape
    }
}

/// Seeded 5-fold CV, grounded in `backtest-engine::monte_carlo`'s shuffle idiom but switched
/// from `rand::thread_rng()` to `StdRng::seed_from_u64(seed)` so repeated runs on the same
/// input state produce the same folds (Testable Property 1, Testable Property 5).
pub fn five_fold_cv(samples: &[TrainingSample], seed: u64) -> CvResult {
    const FOLDS: usize = 5;
    if samples.len() < FOLDS {
        return CvResult { mean_mape: 0.0, std_mape: 0.0 };
    }

    let mut indices: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fold_size = indices.len() / FOLDS;
    let mut fold_mapes = Vec::with_capacity(FOLDS);

    for fold in 0..FOLDS {
        let start = fold * fold_size;
        let end = if fold == FOLDS - 1 { indices.len() } else { start + fold_size };
        let validation_idx: Vec<usize> = indices[start..end].to_vec();
        let train: Vec<TrainingSample> = indices
            .iter()
            .filter(|i| !validation_idx.contains(i))
            .map(|&i| samples[i].clone())
            .collect();
        let validation: Vec<TrainingSample> =
            validation_idx.iter().map(|&i| samples[i].clone()).collect();

        let weights = train_weights(&train);
        fold_mapes.push(mape(&validation, &weights));
    }

    let mean = fold_mapes.iter().sum::<f64>() / fold_mapes.len() as f64;
    let variance =
        fold_mapes.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / fold_mapes.len() as f64;

    CvResult { mean_mape: mean, std_mape: variance.sqrt() }
}
