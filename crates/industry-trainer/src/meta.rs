use std::collections::HashMap;

use chrono::Utc;
use ensemble_net::{infer, EnsembleNetWeights};
use valuation_core::{
    DeployState, ModelId, OwnerKind, WeightSource, WeightTrainingMetrics, WeightVector,
};

/// §4.H: "a single global network ... emits weights conditioned on an industry-descriptor
/// input" -- the standard `ensemble-net` feature vector plus one appended scalar.
pub const META_INPUT_DIM: usize = ensemble_net::features::FEATURE_DIM + 1;

/// §4.H: "its output is used with source=meta and ml_confidence ×= 0.7".
pub const META_CONFIDENCE_MULTIPLIER: f64 = 0.7;

/// Baseline confidence assigned before the ×0.7 meta discount, since a meta-sourced vector has
/// no per-industry train/backtest MAPE of its own to derive one from.
pub const META_BASE_CONFIDENCE: f64 = 0.5;

/// Untrained meta-learner parameters: a zeroed net over `META_INPUT_DIM` inputs, which (per
/// `ensemble-net::net::infer`) produces a uniform weight distribution until a trained parameter
/// set is loaded.
pub fn untrained() -> EnsembleNetWeights {
    EnsembleNetWeights::zeroed(META_INPUT_DIM)
}

/// Runs the meta-learner forward pass for one industry: its centroid feature vector (padded or
/// truncated to the standard feature dimension) with `industry_descriptor` appended.
pub fn infer_weights(
    weights: &EnsembleNetWeights,
    centroid: &[f64],
    industry_descriptor: f64,
) -> HashMap<ModelId, f64> {
    let mut features = vec![0.0; ensemble_net::features::FEATURE_DIM];
    for (i, v) in centroid.iter().take(features.len()).enumerate() {
        features[i] = *v;
    }
    features.push(industry_descriptor);

    let raw = infer(weights, &features);
    ModelId::ALL.iter().zip(raw.iter()).map(|(m, w)| (*m, *w)).collect()
}

pub fn to_weight_vector(
    tenant_id: &str,
    industry: &str,
    weights_map: &HashMap<ModelId, f64>,
) -> WeightVector {
    let mut model_weights = [0.0; 8];
    for m in ModelId::ALL {
        model_weights[m.index()] = weights_map.get(&m).copied().unwrap_or(0.0);
    }
    let now = Utc::now();
    WeightVector {
        id: format!("industry:{industry}-meta-{}", now.timestamp_nanos_opt().unwrap_or(0)),
        tenant_id: tenant_id.to_string(),
        owner_kind: OwnerKind::Industry,
        owner_id: industry.to_string(),
        effective_from: now,
        effective_to: None,
        model_weights,
        source: WeightSource::Meta,
        metrics: WeightTrainingMetrics::default(),
        ml_confidence: META_BASE_CONFIDENCE * META_CONFIDENCE_MULTIPLIER,
        deployed: DeployState::Active,
        rejected_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrained_meta_learner_produces_a_uniform_distribution() {
        let weights = untrained();
        let map = infer_weights(&weights, &vec![0.2; ensemble_net::features::FEATURE_DIM], 0.5);
        let expected = 1.0 / 8.0;
        for w in map.values() {
            assert!((w - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn confidence_matches_the_0_7_discount() {
        let vector = to_weight_vector("t1", "software", &HashMap::new());
        assert!((vector.ml_confidence - 0.35).abs() < 1e-9);
        assert_eq!(vector.source, WeightSource::Meta);
    }
}
