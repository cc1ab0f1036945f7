use std::collections::HashMap;

use valuation_core::{ModelId, OneWayPoint, ValuationInput, ValuationModel};

use crate::reval::revalue;
use crate::variable::Variable;

/// §4.I `one_way`: varies one parameter across `n_points` between `range` endpoints inclusive,
/// rerunning the ensemble at each point.
pub fn one_way(
    models: &[Box<dyn ValuationModel>],
    base_input: &ValuationInput,
    model_weights: &HashMap<ModelId, f64>,
    variable: Variable,
    range: (f64, f64),
    n_points: usize,
) -> Vec<OneWayPoint> {
    if n_points == 0 {
        return Vec::new();
    }
    if n_points == 1 {
        let mut input = base_input.clone();
        variable.write(&mut input.params, range.0);
        let fair_value = revalue(models, &input, model_weights).unwrap_or(0.0);
        return vec![OneWayPoint { value: range.0, fair_value }];
    }

    let (low, high) = range;
    let step = (high - low) / (n_points - 1) as f64;
    (0..n_points)
        .map(|i| {
            let value = low + step * i as f64;
            let mut input = base_input.clone();
            variable.write(&mut input.params, value);
            let fair_value = revalue(models, &input, model_weights).unwrap_or(0.0);
            OneWayPoint { value, fair_value }
        })
        .collect()
}
