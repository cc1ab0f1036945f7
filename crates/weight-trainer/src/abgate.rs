use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::samples::TrainingSample;

/// Result of the A/B gate: whether the candidate's backtest error is significantly lower than
/// the active vector's, via a paired t-test of per-sample absolute-percentage errors (§4.G
/// step 5).
pub struct GateResult {
    pub candidate_mape: f64,
    pub active_mape: f64,
    pub p_value: f64,
    pub candidate_wins: bool,
}

/// Paired t-test on `(candidate_error_i - active_error_i)`, grounded in `trend-analyzer`'s use
/// of `statrs::distribution::StudentsT` for a two-sided p-value, here applied to the mean
/// paired difference instead of an OLS slope.
pub fn ab_gate(
    held_out: &[TrainingSample],
    candidate: &[f64; 8],
    active: &[f64; 8],
) -> GateResult {
    if held_out.is_empty() {
        return GateResult { candidate_mape: 0.0, active_mape: 0.0, p_value: 1.0, candidate_wins: false };
    }

    let diffs: Vec<f64> = held_out
        .iter()
        .map(|s| s.abs_pct_error(candidate) - s.abs_pct_error(active))
        .collect();

    let candidate_mape =
        held_out.iter().map(|s| s.abs_pct_error(candidate)).sum::<f64>() / held_out.len() as f64;
    let active_mape =
        held_out.iter().map(|s| s.abs_pct_error(active)).sum::<f64>() / held_out.len() as f64;

    let n = diffs.len() as f64;
    let mean_diff = diffs.iter().sum::<f64>() / n;
    let variance = if diffs.len() > 1 {
        diffs.iter().map(|d| (d - mean_diff).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };

    let p_value = if n > 1.0 && variance > 0.0 {
        let se = (variance / n).sqrt();
        let t_stat = mean_diff / se;
        let df = n - 1.0;
        let t_dist = StudentsT::new(0.0, 1.0, df).expect("valid degrees of freedom");
        2.0 * (1.0 - t_dist.cdf(t_stat.abs()))
    } else if mean_diff.abs() < 1e-12 {
        1.0
    } else {
        0.0
    };

    let candidate_wins = mean_diff < 0.0 && p_value < 0.05;

    GateResult { candidate_mape, active_mape, p_value, candidate_wins }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(candidate_model_value: f64, active_model_value: f64, actual: f64) -> TrainingSample {
        let mut values = [active_model_value; 8];
        values[0] = candidate_model_value;
        TrainingSample { features: vec![], model_values: values, actual_price: actual }
    }

    #[test]
    fn candidate_wins_when_consistently_closer_to_actual() {
        let held_out: Vec<TrainingSample> =
            (0..30).map(|i| sample(100.0 + i as f64, 200.0, 100.0 + i as f64)).collect();
        let mut candidate = [0.0; 8];
        candidate[0] = 1.0;
        let mut active = [0.0; 8];
        active[0] = 1.0;
        // Give candidate full weight on the accurate model, active full weight on the bad one.
        let result = ab_gate(&held_out, &candidate, &{
            let mut w = [0.0; 8];
            w[0] = 0.0;
            w[1] = 1.0;
            w
        });
        assert!(result.candidate_wins);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn identical_weights_never_win() {
        let held_out: Vec<TrainingSample> =
            (0..20).map(|i| sample(100.0 + i as f64, 100.0 + i as f64, 100.0 + i as f64)).collect();
        let mut w = [0.0; 8];
        w[0] = 1.0;
        let result = ab_gate(&held_out, &w, &w);
        assert!(!result.candidate_wins);
    }
}
