use std::collections::HashMap;

use valuation_core::{Scenario, TrendDirection};

/// Three named anchors on the trend-direction spectrum; `Improving`/`Declining` interpolate
/// linearly between `Stable` and their respective strong endpoint (§4.F step 4).
fn anchor(scenario: Scenario) -> (f64, f64, f64) {
    // (bull, base, bear) at position -1 (strong declining), 0 (stable), +1 (strong improving)
    match scenario {
        Scenario::Bull => (0.15, 0.25, 0.45),
        Scenario::Base => (0.40, 0.50, 0.40),
        Scenario::Bear => (0.45, 0.25, 0.15),
    }
}

fn position(direction: TrendDirection) -> f64 {
    match direction {
        TrendDirection::StrongImproving => 1.0,
        TrendDirection::Improving => 0.5,
        TrendDirection::Stable => 0.0,
        TrendDirection::Declining => -0.5,
        TrendDirection::StrongDeclining => -1.0,
    }
}

/// Derives Bull/Base/Bear weights from a trend direction, always summing to 1.
pub fn from_trend_direction(direction: TrendDirection) -> HashMap<Scenario, f64> {
    let t = position(direction);
    let mut weights = HashMap::with_capacity(3);
    for scenario in Scenario::ALL {
        let (bear_end, stable, bull_end) = anchor(scenario);
        let value = if t >= 0.0 {
            stable + (bull_end - stable) * t
        } else {
            stable + (stable - bear_end) * t
        };
        weights.insert(scenario, value);
    }
    normalize(&mut weights);
    weights
}

fn normalize(weights: &mut HashMap<Scenario, f64>) {
    let sum: f64 = weights.values().sum();
    if sum > 0.0 {
        for value in weights.values_mut() {
            *value /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(weights: &HashMap<Scenario, f64>, s: Scenario) -> f64 {
        *weights.get(&s).unwrap()
    }

    #[test]
    fn stable_matches_the_spec_literal() {
        let w = from_trend_direction(TrendDirection::Stable);
        assert!((get(&w, Scenario::Bull) - 0.25).abs() < 1e-9);
        assert!((get(&w, Scenario::Base) - 0.50).abs() < 1e-9);
        assert!((get(&w, Scenario::Bear) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn strong_improving_matches_the_spec_literal() {
        let w = from_trend_direction(TrendDirection::StrongImproving);
        assert!((get(&w, Scenario::Bull) - 0.45).abs() < 1e-9);
        assert!((get(&w, Scenario::Base) - 0.40).abs() < 1e-9);
        assert!((get(&w, Scenario::Bear) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn strong_declining_matches_the_spec_literal() {
        let w = from_trend_direction(TrendDirection::StrongDeclining);
        assert!((get(&w, Scenario::Bull) - 0.15).abs() < 1e-9);
        assert!((get(&w, Scenario::Base) - 0.40).abs() < 1e-9);
        assert!((get(&w, Scenario::Bear) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn every_direction_sums_to_one() {
        for direction in [
            TrendDirection::StrongImproving,
            TrendDirection::Improving,
            TrendDirection::Stable,
            TrendDirection::Declining,
            TrendDirection::StrongDeclining,
        ] {
            let w = from_trend_direction(direction);
            let sum: f64 = w.values().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }
}
