use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_DIM;

/// A fully-connected layer: `y = W*x + b`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weight: DMatrix<f64>,
    pub bias: DVector<f64>,
}

impl DenseLayer {
    pub fn zeros(out_dim: usize, in_dim: usize) -> Self {
        Self {
            weight: DMatrix::zeros(out_dim, in_dim),
            bias: DVector::zeros(out_dim),
        }
    }

    fn forward(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.weight * x + &self.bias
    }
}

/// Batch normalization in eval mode: normalizes against the stored running statistics rather
/// than a minibatch, then applies the learned affine transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchNorm {
    pub gamma: DVector<f64>,
    pub beta: DVector<f64>,
    pub running_mean: DVector<f64>,
    pub running_var: DVector<f64>,
}

impl BatchNorm {
    pub fn identity(dim: usize) -> Self {
        Self {
            gamma: DVector::from_element(dim, 1.0),
            beta: DVector::zeros(dim),
            running_mean: DVector::zeros(dim),
            running_var: DVector::from_element(dim, 1.0),
        }
    }

    fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        const EPS: f64 = 1e-5;
        DVector::from_iterator(
            x.len(),
            (0..x.len()).map(|i| {
                let normalized = (x[i] - self.running_mean[i]) / (self.running_var[i] + EPS).sqrt();
                normalized * self.gamma[i] + self.beta[i]
            }),
        )
    }
}

fn relu(x: &DVector<f64>) -> DVector<f64> {
    x.map(|v| v.max(0.0))
}

fn softmax(x: &DVector<f64>) -> DVector<f64> {
    let max = x.iter().cloned().fold(f64::MIN, f64::max);
    let exps: DVector<f64> = x.map(|v| (v - max).exp());
    let sum: f64 = exps.iter().sum();
    if sum <= 0.0 {
        DVector::from_element(x.len(), 1.0 / x.len() as f64)
    } else {
        exps.map(|v| v / sum)
    }
}

/// Parameters for `input[F] -> Dense(64)+BN+ReLU -> Dense(32)+BN+ReLU -> Dense(8)+Softmax`.
/// Dropout is a training-time-only regularizer and has no effect in the eval-mode forward pass
/// implemented here (§4.E: "inference is deterministic, dropout/BN in eval mode").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleNetWeights {
    pub layer1: DenseLayer,
    pub bn1: BatchNorm,
    pub layer2: DenseLayer,
    pub bn2: BatchNorm,
    pub layer3: DenseLayer,
}

impl EnsembleNetWeights {
    /// All-zero parameters, useful as a placeholder before a trained set is loaded. A zeroed
    /// final layer plus softmax produces a uniform distribution over the 8 models.
    pub fn zeroed(input_dim: usize) -> Self {
        Self {
            layer1: DenseLayer::zeros(64, input_dim),
            bn1: BatchNorm::identity(64),
            layer2: DenseLayer::zeros(32, 64),
            bn2: BatchNorm::identity(32),
            layer3: DenseLayer::zeros(8, 32),
        }
    }
}

/// Runs the forward pass, returning softmax weights over the eight models. `features` must have
/// length `FEATURE_DIM` (or the net's configured input_dim, which should match).
pub fn infer(weights: &EnsembleNetWeights, features: &[f64]) -> [f64; 8] {
    debug_assert_eq!(features.len(), weights.layer1.weight.ncols());
    let x = DVector::from_row_slice(features);

    let h1 = relu(&weights.bn1.apply(&weights.layer1.forward(&x)));
    let h2 = relu(&weights.bn2.apply(&weights.layer2.forward(&h1)));
    let logits = weights.layer3.forward(&h2);
    let probabilities = softmax(&logits);

    let mut out = [0.0; 8];
    out.copy_from_slice(probabilities.as_slice());
    out
}

/// The input dimension EnsembleEngine's standard (non-meta) feature vector uses.
pub fn standard_input_dim() -> usize {
    FEATURE_DIM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_weights_produce_a_uniform_distribution() {
        let weights = EnsembleNetWeights::zeroed(FEATURE_DIM);
        let features = vec![0.3; FEATURE_DIM];
        let out = infer(&weights, &features);
        let expected = 1.0 / 8.0;
        for w in out {
            assert!((w - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn output_is_a_probability_simplex() {
        let mut weights = EnsembleNetWeights::zeroed(FEATURE_DIM);
        weights.layer3.bias[2] = 5.0;
        let features = vec![0.1; FEATURE_DIM];
        let out = infer(&weights, &features);
        let sum: f64 = out.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(out.iter().all(|w| *w >= 0.0));
        assert!(out[2] > out[0]);
    }
}
