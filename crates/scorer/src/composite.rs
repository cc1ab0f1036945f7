use std::collections::HashMap;

use chrono::{DateTime, Utc};
use valuation_core::{CompositeScore, Dimension, Rating, ScoreSource};

/// Builds the default (non-ML) dimension-weight table (§4.J: 0.25/0.20/0.20/0.20/0.15).
pub fn default_weights() -> HashMap<Dimension, f64> {
    Dimension::ALL.iter().map(|d| (*d, d.default_weight())).collect()
}

/// Folds the five dimension scores into the weighted composite and derives the letter rating.
/// `weights` need not already sum to 1 -- callers pass either `default_weights()` or an
/// ML-trained table, and this renormalises defensively.
pub fn composite_score(
    company_id: &str,
    as_of_date: DateTime<Utc>,
    dimension_scores: &HashMap<Dimension, f64>,
    weights: &HashMap<Dimension, f64>,
    source: ScoreSource,
    ml_confidence: f64,
) -> CompositeScore {
    let total_weight: f64 = Dimension::ALL.iter().map(|d| weights.get(d).copied().unwrap_or(0.0)).sum();
    let total_weight = if total_weight > 0.0 { total_weight } else { 1.0 };

    let composite: f64 = Dimension::ALL
        .iter()
        .map(|d| {
            let weight = weights.get(d).copied().unwrap_or(0.0) / total_weight;
            let score = dimension_scores.get(d).copied().unwrap_or(50.0);
            weight * score
        })
        .sum::<f64>()
        .clamp(0.0, 100.0);

    CompositeScore {
        company_id: company_id.to_string(),
        as_of_date,
        composite,
        rating: Rating::from_composite(composite),
        dimension_weights: weights.clone(),
        dimension_scores: dimension_scores.clone(),
        source,
        ml_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(v: f64) -> HashMap<Dimension, f64> {
        Dimension::ALL.iter().map(|d| (*d, v)).collect()
    }

    #[test]
    fn uniform_ninety_five_dimensions_yields_a_plus() {
        let score = composite_score(
            "c1",
            Utc::now(),
            &scores(95.0),
            &default_weights(),
            ScoreSource::Default,
            0.0,
        );
        assert!((score.composite - 95.0).abs() < 1e-9);
        assert_eq!(score.rating, Rating::APlus);
    }

    #[test]
    fn composite_ninety_boundary_is_a_plus() {
        let score =
            composite_score("c1", Utc::now(), &scores(90.0), &default_weights(), ScoreSource::Default, 0.0);
        assert_eq!(score.rating, Rating::APlus);
    }

    #[test]
    fn missing_dimension_defaults_to_neutral_fifty() {
        let mut partial = scores(100.0);
        partial.remove(&Dimension::Risk);
        let score =
            composite_score("c1", Utc::now(), &partial, &default_weights(), ScoreSource::Default, 0.0);
        assert!(score.composite < 100.0);
    }
}
