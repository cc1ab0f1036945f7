use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use valuation_core::{ModelId, MonteCarloStats, ValuationInput, ValuationModel};

use crate::distribution::Distribution;
use crate::reval::revalue;
use crate::variable::Variable;

/// §4.I `monte_carlo`: samples each variable independently from its configured distribution,
/// reruns the ensemble, and reports mean/median/std plus the percentiles and empirical
/// confidence intervals the spec names. Reuses the teacher's percentile-closure pattern from
/// `backtest-engine::monte_carlo`, with the RNG swapped for a seeded `StdRng` so results are
/// reproducible given the same seed (Testable Property 1).
pub fn monte_carlo(
    models: &[Box<dyn ValuationModel>],
    base_input: &ValuationInput,
    model_weights: &HashMap<ModelId, f64>,
    distributions: &[(Variable, Distribution)],
    n: usize,
    seed: u64,
) -> MonteCarloStats {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values = Vec::with_capacity(n);

    for _ in 0..n {
        let mut input = base_input.clone();
        for (variable, dist) in distributions {
            let sampled = dist.sample(&mut rng);
            variable.write(&mut input.params, sampled);
        }
        if let Some(fair_value) = revalue(models, &input, model_weights) {
            values.push(fair_value);
        }
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let count = values.len();

    let percentile = |p: f64| -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let idx = ((p / 100.0) * (values.len() - 1) as f64).round() as usize;
        values[idx.min(values.len() - 1)]
    };

    let mean = if count == 0 { 0.0 } else { values.iter().sum::<f64>() / count as f64 };
    let variance = if count == 0 {
        0.0
    } else {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64
    };

    let mut percentiles = HashMap::new();
    for p in [5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0] {
        percentiles.insert(format!("{}", p as i64), percentile(p));
    }

    MonteCarloStats {
        simulations: count,
        seed,
        mean,
        median: percentile(50.0),
        std_dev: variance.sqrt(),
        percentiles,
        ci_80: (percentile(10.0), percentile(90.0)),
        ci_90: (percentile(5.0), percentile(95.0)),
    }
}
