use std::collections::HashMap;

use valuation_core::{ModelId, Scenario, ValuationResult};

/// Number of inputs the feed-forward net expects: 8 per-model coherence scores, 3 dispersion
/// statistics over the 24 scenario-blended values, 1 mean confidence_base, 8 recent per-model
/// accuracy scores (§4.E).
pub const FEATURE_DIM: usize = 8 + 3 + 1 + 8;

/// Builds the feature vector the net (or the meta-learner, which appends one more input) reads.
/// `coherence` and `recent_accuracy` are indexed by `ModelId::index()`; a missing coherence
/// score (too few finite scenario values) contributes 0.0 rather than skewing the mean.
pub fn assemble(
    results: &[ValuationResult],
    coherence: &HashMap<ModelId, Option<f64>>,
    recent_accuracy: &[f64; 8],
) -> Vec<f64> {
    let mut features = Vec::with_capacity(FEATURE_DIM);

    for model_id in ModelId::ALL {
        features.push(coherence.get(&model_id).copied().flatten().unwrap_or(0.0));
    }

    let values: Vec<f64> = results.iter().filter_map(|r| r.fair_value).collect();
    let (std_over_mean, range_over_mean, median_minus_mean) = dispersion(&values);
    features.push(std_over_mean);
    features.push(range_over_mean);
    features.push(median_minus_mean);

    let mean_confidence_base = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.confidence_base).sum::<f64>() / results.len() as f64
    };
    features.push(mean_confidence_base);

    features.extend_from_slice(recent_accuracy);

    debug_assert_eq!(features.len(), FEATURE_DIM);
    features
}

fn dispersion(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean.abs() < 1e-9 {
        return (0.0, 0.0, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std = variance.sqrt();
    let max = values.iter().cloned().fold(f64::MIN, f64::max);
    let min = values.iter().cloned().fold(f64::MAX, f64::min);

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    };

    (std / mean, (max - min) / mean, median - mean)
}

/// Filters a result set down to one scenario's worth, used when a caller wants dispersion of
/// only the base-case values rather than all 24.
pub fn values_for_scenario(results: &[ValuationResult], scenario: Scenario) -> Vec<f64> {
    results
        .iter()
        .filter(|r| r.scenario == scenario)
        .filter_map(|r| r.fair_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results_yield_a_zeroed_dispersion() {
        assert_eq!(dispersion(&[]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn assembles_the_expected_dimension() {
        let coherence: HashMap<ModelId, Option<f64>> =
            ModelId::ALL.iter().map(|m| (*m, Some(0.9))).collect();
        let features = assemble(&[], &coherence, &[0.5; 8]);
        assert_eq!(features.len(), FEATURE_DIM);
    }
}
