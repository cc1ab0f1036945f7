use std::collections::HashMap;

use valuation_core::{ModelId, TornadoBar, ValuationInput, ValuationModel};

use crate::reval::revalue;
use crate::variable::Variable;

/// §4.I `tornado`: for each variable, reruns at base±pct and records the two fair values plus
/// `impact = |high - low|`. Bars are returned sorted by descending `|impact|`.
pub fn tornado(
    models: &[Box<dyn ValuationModel>],
    base_input: &ValuationInput,
    model_weights: &HashMap<ModelId, f64>,
    variables: &[Variable],
    pct: f64,
) -> Vec<TornadoBar> {
    let mut bars: Vec<TornadoBar> = variables
        .iter()
        .map(|variable| {
            let base_value = variable.read(&base_input.params);

            let mut low_input = base_input.clone();
            variable.write(&mut low_input.params, base_value * (1.0 - pct));
            let low = revalue(models, &low_input, model_weights).unwrap_or(0.0);

            let mut high_input = base_input.clone();
            variable.write(&mut high_input.params, base_value * (1.0 + pct));
            let high = revalue(models, &high_input, model_weights).unwrap_or(0.0);

            TornadoBar { variable: variable.name(), low, high, impact: (high - low).abs() }
        })
        .collect();

    bars.sort_by(|a, b| b.impact.partial_cmp(&a.impact).unwrap());
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reval::tests_support::sample_input;

    #[test]
    fn sorts_bars_by_descending_impact() {
        let models = valuation_models::all_models();
        let weights = ensemble_net::default_weight_table();
        let input = sample_input();
        let bars = tornado(
            &models,
            &input,
            &weights,
            &[Variable::Wacc, Variable::MarginMultiplier, Variable::EffectiveTaxRate],
            0.20,
        );
        assert_eq!(bars.len(), 3);
        for pair in bars.windows(2) {
            assert!(pair[0].impact >= pair[1].impact);
        }
    }

    #[test]
    fn impact_is_nonnegative() {
        let models = valuation_models::all_models();
        let weights = ensemble_net::default_weight_table();
        let input = sample_input();
        let bars = tornado(&models, &input, &weights, &[Variable::Wacc], 0.1);
        assert!(bars[0].impact >= 0.0);
    }
}
