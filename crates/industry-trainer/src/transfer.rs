use chrono::Utc;
use valuation_core::{DeployState, IndustryProfile, OwnerKind, WeightSource, WeightVector};

use crate::similarity::cosine_similarity;

/// §4.H: "find the most similar industry by cosine similarity ... threshold 0.70".
pub const SIMILARITY_THRESHOLD: f64 = 0.70;

/// §4.H: "transfer its active vector verbatim ... ml_confidence ×= 0.8".
pub const TRANSFER_CONFIDENCE_MULTIPLIER: f64 = 0.8;

/// Finds the candidate whose centroid is most similar to `target`, among `candidates`, skipping
/// `exclude_industry` (never transfer from oneself) and any candidate below the threshold.
/// Ties are broken by industry name so the choice is deterministic.
pub fn most_similar<'a>(
    target: &[f64],
    candidates: &'a [IndustryProfile],
    exclude_industry: &str,
) -> Option<(&'a IndustryProfile, f64)> {
    candidates
        .iter()
        .filter(|p| p.industry != exclude_industry)
        .map(|p| (p, cosine_similarity(target, &p.centroid_feature_vector)))
        .filter(|(_, similarity)| *similarity >= SIMILARITY_THRESHOLD)
        .max_by(|(a, sa), (b, sb)| {
            sa.partial_cmp(sb).unwrap().then_with(|| b.industry.cmp(&a.industry))
        })
}

/// Clones the donor's active `WeightVector` verbatim onto `industry`, marking it transferred
/// and scaling confidence down per §4.H.
pub fn apply(donor_active: &WeightVector, tenant_id: &str, industry: &str, similarity: f64) -> WeightVector {
    let now = Utc::now();
    let _ = similarity; // recorded via `source`/confidence only; no numeric field carries it today.
    WeightVector {
        id: format!("industry:{industry}-transferred-{}", now.timestamp_nanos_opt().unwrap_or(0)),
        tenant_id: tenant_id.to_string(),
        owner_kind: OwnerKind::Industry,
        owner_id: industry.to_string(),
        effective_from: now,
        effective_to: None,
        model_weights: donor_active.model_weights,
        source: WeightSource::Transferred,
        metrics: donor_active.metrics,
        ml_confidence: (donor_active.ml_confidence * TRANSFER_CONFIDENCE_MULTIPLIER).clamp(0.0, 1.0),
        deployed: DeployState::Active,
        rejected_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuation_core::WeightTrainingMetrics;

    fn profile(industry: &str, centroid: Vec<f64>) -> IndustryProfile {
        IndustryProfile {
            industry: industry.to_string(),
            sample_count: 10,
            centroid_feature_vector: centroid,
            best_models: vec![],
            last_trained: Utc::now(),
        }
    }

    #[test]
    fn picks_the_closest_candidate_above_threshold() {
        let target = vec![1.0, 0.0];
        let candidates = vec![
            profile("semis", vec![0.0, 1.0]),
            profile("software", vec![0.99, 0.05]),
        ];
        let (donor, similarity) = most_similar(&target, &candidates, "hardware").unwrap();
        assert_eq!(donor.industry, "software");
        assert!(similarity > SIMILARITY_THRESHOLD);
    }

    #[test]
    fn returns_none_when_nothing_clears_the_threshold() {
        let target = vec![1.0, 0.0];
        let candidates = vec![profile("semis", vec![0.0, 1.0])];
        assert!(most_similar(&target, &candidates, "hardware").is_none());
    }

    #[test]
    fn never_transfers_from_itself() {
        let target = vec![1.0, 0.0];
        let candidates = vec![profile("software", vec![1.0, 0.0])];
        assert!(most_similar(&target, &candidates, "software").is_none());
    }

    #[test]
    fn transfer_scales_confidence_by_0_8() {
        let donor = WeightVector {
            id: "donor".into(),
            tenant_id: "t1".into(),
            owner_kind: OwnerKind::Industry,
            owner_id: "software".into(),
            effective_from: Utc::now(),
            effective_to: None,
            model_weights: [0.125; 8],
            source: WeightSource::Trained,
            metrics: WeightTrainingMetrics::default(),
            ml_confidence: 0.5,
            deployed: DeployState::Active,
            rejected_reason: None,
        };
        let transferred = apply(&donor, "t1", "hardware", 0.9);
        assert_eq!(transferred.source, WeightSource::Transferred);
        assert!((transferred.ml_confidence - 0.4).abs() < 1e-9);
        assert_eq!(transferred.model_weights, donor.model_weights);
    }
}
