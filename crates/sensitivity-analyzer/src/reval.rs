use std::collections::HashMap;

use ensemble_engine::{blend, scenario_weights};
use valuation_core::{ModelId, TrendDirection, ValuationInput, ValuationModel};

/// Reruns the ensemble at fixed model weights (no weight lookup, no prediction recording) --
/// exactly the "rerun valuation" step §4.I's one-way/two-way/tornado/Monte-Carlo operations
/// call for, holding the already-resolved `model_weights` constant while parameters vary.
/// Trend direction is always `Stable` here: sensitivity sweeps hold scenario weighting fixed so
/// the swept parameter is the only thing that moves.
pub fn revalue(
    models: &[Box<dyn ValuationModel>],
    input: &ValuationInput,
    model_weights: &HashMap<ModelId, f64>,
) -> Option<f64> {
    let results = scenario_executor::run(models, input);
    let scenario_weight_map = scenario_weights::from_trend_direction(TrendDirection::Stable);
    let blends = blend::blend_models(&results, &scenario_weight_map);
    let (fair_value, _confidence, _degraded) = blend::aggregate(&blends, model_weights);
    fair_value
}
