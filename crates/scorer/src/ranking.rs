use valuation_core::{CompositeScore, Rating};

/// §4.J `rank`: sorts by descending composite, stable tie-break by ticker so a re-run with
/// unchanged inputs always produces the same ordering.
pub fn rank(
    scores: &[(String, CompositeScore)],
    min_score: Option<f64>,
) -> Vec<(String, f64, Rating)> {
    let mut rows: Vec<(String, f64, Rating)> = scores
        .iter()
        .filter(|(_, score)| min_score.map(|min| score.composite >= min).unwrap_or(true))
        .map(|(ticker, score)| (ticker.clone(), score.composite, score.rating))
        .collect();

    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use valuation_core::ScoreSource;

    fn score(composite: f64) -> CompositeScore {
        CompositeScore {
            company_id: "c".into(),
            as_of_date: Utc::now(),
            composite,
            rating: Rating::from_composite(composite),
            dimension_weights: HashMap::new(),
            dimension_scores: HashMap::new(),
            source: ScoreSource::Default,
            ml_confidence: 0.0,
        }
    }

    #[test]
    fn sorts_descending_by_composite() {
        let rows = vec![
            ("AAA".to_string(), score(60.0)),
            ("BBB".to_string(), score(90.0)),
            ("CCC".to_string(), score(75.0)),
        ];
        let ranked = rank(&rows, None);
        assert_eq!(ranked[0].0, "BBB");
        assert_eq!(ranked[1].0, "CCC");
        assert_eq!(ranked[2].0, "AAA");
    }

    #[test]
    fn ties_break_by_ticker_ascending() {
        let rows = vec![("ZZZ".to_string(), score(80.0)), ("AAA".to_string(), score(80.0))];
        let ranked = rank(&rows, None);
        assert_eq!(ranked[0].0, "AAA");
        assert_eq!(ranked[1].0, "ZZZ");
    }

    #[test]
    fn min_score_filters_out_lower_rows() {
        let rows = vec![("AAA".to_string(), score(40.0)), ("BBB".to_string(), score(80.0))];
        let ranked = rank(&rows, Some(50.0));
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, "BBB");
    }
}
