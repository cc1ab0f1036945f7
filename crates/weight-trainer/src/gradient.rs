use valuation_core::ModelId;

use crate::samples::TrainingSample;

/// Softmax of eight logits into a weight simplex, same convention `ensemble-net` uses for the
/// network's final layer.
fn softmax(logits: &[f64; 8]) -> [f64; 8] {
    let max = logits.iter().cloned().fold(f64::MIN, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    let mut out = [0.0; 8];
    if sum <= 0.0 {
        out.fill(1.0 / 8.0);
    } else {
        for (i, e) in exps.iter().enumerate() {
            out[i] = e / sum;
        }
    }
    out
}

/// Trains an 8-logit softmax regression against realised price error by manual gradient
/// descent (fixed iteration count, fixed learning rate, no external optimisation crate),
/// adapted from `confidence-calibrator::fit_platt`'s 2-parameter sigmoid fit to an 8-parameter
/// pre-softmax logit regression minimising MAPE of the weighted blend (§4.G step 3).
pub fn train_weights(samples: &[TrainingSample]) -> [f64; 8] {
    const ITERATIONS: usize = 1000;
    const LEARNING_RATE: f64 = 0.05;

    let mut logits = [0.0; 8];
    if samples.is_empty() {
        return softmax(&logits);
    }

    for _ in 0..ITERATIONS {
        let weights = softmax(&logits);
        let mut grad_w = [0.0; 8];

        for sample in samples {
            if sample.actual_price.abs() < 1e-9 {
                continue;
            }
            let predicted = sample.predicted(&weights);
            let sign = (predicted - sample.actual_price).signum();
            let scale = sign / sample.actual_price.abs();
            for model_id in ModelId::ALL {
                grad_w[model_id.index()] += scale * sample.model_values[model_id.index()];
            }
        }

        let n = samples.len() as f64;
        for g in grad_w.iter_mut() {
            *g /= n;
        }

        // Chain rule through the softmax: dL/dz_k = sum_m dL/dw_m * w_m * (delta(m,k) - w_k).
        let mut grad_z = [0.0; 8];
        for k in 0..8 {
            let mut acc = 0.0;
            for m in 0..8 {
                let delta = if m == k { 1.0 } else { 0.0 };
                acc += grad_w[m] * weights[m] * (delta - weights[k]);
            }
            grad_z[k] = acc;
        }

        for k in 0..8 {
            logits[k] -= LEARNING_RATE * grad_z[k];
        }
    }

    softmax(&logits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(model_values: [f64; 8], actual: f64) -> TrainingSample {
        TrainingSample { features: vec![], model_values, actual_price: actual }
    }

    #[test]
    fn converges_toward_the_model_that_matches_actuals() {
        let samples: Vec<TrainingSample> = (0..20)
            .map(|i| {
                let mut values = [100.0; 8];
                values[3] = 150.0 + i as f64; // model index 3 tracks the actual closely
                sample(values, 150.0 + i as f64)
            })
            .collect();
        let weights = train_weights(&samples);
        let sum: f64 = weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(weights[3] > weights[0]);
    }

    #[test]
    fn empty_samples_yield_a_uniform_simplex() {
        let weights = train_weights(&[]);
        for w in weights {
            assert!((w - 0.125).abs() < 1e-9);
        }
    }
}
