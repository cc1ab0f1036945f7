use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use statrs::statistics::Statistics;
use valuation_core::{ml_confidence, Dimension};

/// One (dimension_scores, forward_return) training row. `dimension_scores` is indexed in
/// `Dimension::ALL` order (valuation, profitability, growth, health, risk).
#[derive(Debug, Clone, Copy)]
pub struct ScoreTrainingSample {
    pub dimension_scores: [f64; 5],
    pub forward_return: f64,
}

pub const MIN_TRAINING_SAMPLES: usize = 100;
const RIDGE_LAMBDA: f64 = 1.0;

pub struct OptimizerResult {
    pub dimension_weights: HashMap<Dimension, f64>,
    pub r_squared: f64,
    pub cv_std: f64,
    pub ml_confidence: f64,
}

struct Standardized {
    x: DMatrix<f64>,
    y: DVector<f64>,
    means: [f64; 5],
    stds: [f64; 5],
    y_mean: f64,
}

/// Z-scores each of the five dimension-score columns and centres the target, grounded in
/// `quant-analysis`'s use of `statrs::statistics::Statistics` for mean/std-dev.
fn standardize(samples: &[ScoreTrainingSample]) -> Standardized {
    let n = samples.len();
    let mut means = [0.0; 5];
    let mut stds = [0.0; 5];
    for j in 0..5 {
        let column: Vec<f64> = samples.iter().map(|s| s.dimension_scores[j]).collect();
        means[j] = column.clone().mean();
        let std_dev = column.std_dev();
        stds[j] = if std_dev > 1e-9 { std_dev } else { 1.0 };
    }
    let y_mean = samples.iter().map(|s| s.forward_return).sum::<f64>() / n as f64;

    let mut x = DMatrix::<f64>::zeros(n, 5);
    let mut y = DVector::<f64>::zeros(n);
    for (i, sample) in samples.iter().enumerate() {
        for j in 0..5 {
            x[(i, j)] = (sample.dimension_scores[j] - means[j]) / stds[j];
        }
        y[i] = sample.forward_return - y_mean;
    }
    Standardized { x, y, means, stds, y_mean }
}

/// Closed-form ridge regression: `(X^T X + lambda I)^-1 X^T y`, the in-stack substitute for the
/// Random-Forest regressor the distilled spec names (no tree-ensemble crate in this workspace).
fn fit_coefficients(x: &DMatrix<f64>, y: &DVector<f64>) -> DVector<f64> {
    let xt = x.transpose();
    let xtx = &xt * x;
    let regularized = xtx + DMatrix::<f64>::identity(x.ncols(), x.ncols()) * RIDGE_LAMBDA;
    let xty = &xt * y;
    regularized.try_inverse().map(|inv| inv * xty).unwrap_or_else(|| DVector::zeros(x.ncols()))
}

fn predict(coefficients: &DVector<f64>, standardized: &Standardized, row: &[f64; 5]) -> f64 {
    let mut prediction = standardized.y_mean;
    for j in 0..5 {
        let z = (row[j] - standardized.means[j]) / standardized.stds[j];
        prediction += coefficients[j] * z;
    }
    prediction
}

fn r_squared(samples: &[ScoreTrainingSample], coefficients: &DVector<f64>, standardized: &Standardized) -> f64 {
    let ss_tot: f64 =
        samples.iter().map(|s| (s.forward_return - standardized.y_mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return 0.0;
    }
    let ss_res: f64 = samples
        .iter()
        .map(|s| {
            let predicted = predict(coefficients, standardized, &s.dimension_scores);
            (s.forward_return - predicted).powi(2)
        })
        .sum();
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

/// Five-fold CV of the ridge fit's mean-absolute-error, grounded in `weight-trainer::cv`'s
/// seeded-shuffle idiom (switched from `mape` of a price prediction to absolute error of a
/// forward-return prediction).
fn five_fold_cv(samples: &[ScoreTrainingSample], seed: u64) -> f64 {
    const FOLDS: usize = 5;
    if samples.len() < FOLDS {
        return 0.0;
    }

    let mut indices: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fold_size = indices.len() / FOLDS;
    let mut fold_errors = Vec::with_capacity(FOLDS);

    for fold in 0..FOLDS {
        let start = fold * fold_size;
        let end = if fold == FOLDS - 1 { indices.len() } else { start + fold_size };
        let validation_idx: Vec<usize> = indices[start..end].to_vec();
        let train: Vec<ScoreTrainingSample> = indices
            .iter()
            .filter(|i| !validation_idx.contains(i))
            .map(|&i| samples[i])
            .collect();
        let validation: Vec<ScoreTrainingSample> = validation_idx.iter().map(|&i| samples[i]).collect();

        let standardized = standardize(&train);
        let coefficients = fit_coefficients(&standardized.x, &standardized.y);
        let errors: Vec<f64> = validation
            .iter()
            .map(|s| (predict(&coefficients, &standardized, &s.dimension_scores) - s.forward_return).abs())
            .collect();
        fold_errors.push(errors.iter().sum::<f64>() / errors.len() as f64);
    }

    let mean = fold_errors.iter().sum::<f64>() / fold_errors.len() as f64;
    let variance = fold_errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / fold_errors.len() as f64;
    variance.sqrt()
}

fn importances(coefficients: &DVector<f64>) -> HashMap<Dimension, f64> {
    let magnitudes: Vec<f64> = (0..5).map(|j| coefficients[j].abs()).collect();
    let total: f64 = magnitudes.iter().sum();
    if total <= 1e-12 {
        return Dimension::ALL.iter().map(|d| (*d, 0.2)).collect();
    }
    Dimension::ALL.iter().enumerate().map(|(j, d)| (*d, magnitudes[j] / total)).collect()
}

/// §4.J ML dimension-weight optimiser. Below `MIN_TRAINING_SAMPLES`, callers should fall back to
/// `composite::default_weights()` -- this returns `None` rather than a degenerate fit.
pub fn train(samples: &[ScoreTrainingSample], seed: u64) -> Option<OptimizerResult> {
    if samples.len() < MIN_TRAINING_SAMPLES {
        return None;
    }
    let standardized = standardize(samples);
    let coefficients = fit_coefficients(&standardized.x, &standardized.y);
    let r2 = r_squared(samples, &coefficients, &standardized);
    let cv_std = five_fold_cv(samples, seed);
    let confidence = ml_confidence(r2, cv_std, samples.len(), MIN_TRAINING_SAMPLES);

    Some(OptimizerResult {
        dimension_weights: importances(&coefficients),
        r_squared: r2,
        cv_std,
        ml_confidence: confidence,
    })
}
