use std::collections::HashMap;

use valuation_core::{ModelId, Outcome, Prediction};

/// One realised Prediction/Outcome pair, flattened into the shape gradient descent consumes.
/// `model_values` is each model's raw (pre-weight) blended fair value at issuance -- exactly
/// the `Outcome::model_contributions` field, which the data model defines for this purpose.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    pub features: Vec<f64>,
    pub model_values: [f64; 8],
    pub actual_price: f64,
}

impl TrainingSample {
    pub fn predicted(&self, weights: &[f64; 8]) -> f64 {
        ModelId::ALL
            .iter()
            .map(|m| weights[m.index()] * self.model_values[m.index()])
            .sum()
    }

    pub fn abs_pct_error(&self, weights: &[f64; 8]) -> f64 {
        if self.actual_price.abs() < 1e-9 {
            return 0.0;
        }
        ((self.predicted(weights) - self.actual_price) / self.actual_price).abs()
    }
}

pub fn mape(samples: &[TrainingSample], weights: &[f64; 8]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s.abs_pct_error(weights)).sum::<f64>() / samples.len() as f64
}

/// R^2 of the weighted blend's predictions against realised prices, used in the harmonised
/// `ml_confidence` formula.
pub fn r_squared(samples: &[TrainingSample], weights: &[f64; 8]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_actual = samples.iter().map(|s| s.actual_price).sum::<f64>() / samples.len() as f64;
    let ss_tot: f64 = samples.iter().map(|s| (s.actual_price - mean_actual).powi(2)).sum();
    if ss_tot <= 0.0 {
        return 0.0;
    }
    let ss_res: f64 = samples
        .iter()
        .map(|s| (s.actual_price - s.predicted(weights)).powi(2))
        .sum();
    (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
}

/// Builds the samples §4.G step 1-2 describes ("collect Prediction-Outcome pairs ... extract
/// features and per-model errors") from a `PredictionStore::window` result. Pending predictions
/// (no `Outcome` yet) are skipped; `features_by_prediction` supplies the feature vector captured
/// at issuance, keyed by `Prediction::id`, for callers (e.g. the industry meta-learner) that
/// need it -- direct gradient-descent training only consumes `model_values`/`actual_price`.
pub fn from_window(
    pairs: &[(Prediction, Option<Outcome>)],
    features_by_prediction: &HashMap<String, Vec<f64>>,
) -> Vec<TrainingSample> {
    pairs
        .iter()
        .filter_map(|(prediction, outcome)| {
            let outcome = outcome.as_ref()?;
            let mut model_values = [0.0; 8];
            for model_id in ModelId::ALL {
                model_values[model_id.index()] =
                    outcome.model_contributions.get(&model_id).copied().unwrap_or(0.0);
            }
            Some(TrainingSample {
                features: features_by_prediction.get(&prediction.id).cloned().unwrap_or_default(),
                model_values,
                actual_price: outcome.actual_price,
            })
        })
        .collect()
}
