use std::collections::HashMap;

use valuation_core::{ModelId, Scenario, ValuationResult};

/// A single model's scenario-blended fair value and confidence (§4.F steps 4-5). `value` is
/// `None` only when every one of the model's three scenario runs returned `None`.
pub struct ModelBlend {
    pub value: Option<f64>,
    pub confidence: f64,
}

/// Scenario-blends each model's three `ValuationResult`s. The spec's `v_m = Σ_s
/// scenario_weight_s · value_{m,s}` assumes every scenario is defined; when a model is
/// undefined in one scenario (e.g. DCF only in the bear leg) we renormalise over the scenarios
/// that did produce a value rather than letting a single missing leg drag the blend toward
/// zero. Confidence sums unconditionally since `confidence_base` is always populated (0.0 for
/// an undefined estimate), matching the formula literally.
pub fn blend_models(
    results: &[ValuationResult],
    scenario_weights: &HashMap<Scenario, f64>,
) -> HashMap<ModelId, ModelBlend> {
    let mut out = HashMap::with_capacity(ModelId::ALL.len());
    for model_id in ModelId::ALL {
        let mut value_sum = 0.0;
        let mut value_weight_sum = 0.0;
        let mut confidence_sum = 0.0;

        for scenario in Scenario::ALL {
            let scenario_weight = *scenario_weights.get(&scenario).unwrap_or(&0.0);
            if let Some(result) = results
                .iter()
                .find(|r| r.model_id == model_id && r.scenario == scenario)
            {
                confidence_sum += scenario_weight * result.confidence_base;
                if let Some(value) = result.fair_value {
                    value_sum += scenario_weight * value;
                    value_weight_sum += scenario_weight;
                }
            }
        }

        let value = if value_weight_sum > 0.0 {
            Some(value_sum / value_weight_sum)
        } else {
            None
        };
        out.insert(model_id, ModelBlend { value, confidence: confidence_sum });
    }
    out
}

/// Final fair value and confidence from the model blends and model weights, renormalising the
/// weights over models whose blend produced a finite value (§7: "ensemble weights are
/// renormalised over the models that produced finite values").
pub fn aggregate(
    blends: &HashMap<ModelId, ModelBlend>,
    model_weights: &HashMap<ModelId, f64>,
) -> (Option<f64>, f64, Vec<String>) {
    let mut degraded_metrics = Vec::new();
    let finite_weight_sum: f64 = ModelId::ALL
        .iter()
        .filter(|m| blends[m].value.is_some())
        .map(|m| model_weights.get(m).copied().unwrap_or(0.0))
        .sum();

    for model_id in ModelId::ALL {
        if blends[&model_id].value.is_none() {
            degraded_metrics.push(metric_name(model_id));
        }
    }

    if finite_weight_sum <= 0.0 {
        return (None, 0.0, degraded_metrics);
    }

    let mut fair_value = 0.0;
    let mut confidence = 0.0;
    for model_id in ModelId::ALL {
        let blend = &blends[&model_id];
        if let Some(value) = blend.value {
            let w = model_weights.get(&model_id).copied().unwrap_or(0.0) / finite_weight_sum;
            fair_value += w * value;
            confidence += w * blend.confidence;
        }
    }

    (Some(fair_value), confidence.clamp(0.0, 1.0), degraded_metrics)
}

fn metric_name(model_id: ModelId) -> String {
    match model_id {
        ModelId::Dcf => "dcf_fair_value".into(),
        ModelId::Rim => "rim_fair_value".into(),
        ModelId::Eva => "eva_fair_value".into(),
        ModelId::Graham => "graham_number".into(),
        ModelId::Lynch => "lynch_fair_value".into(),
        ModelId::Ncav => "ncav_fair_value".into(),
        ModelId::PriceToSales => "price_to_sales_fair_value".into(),
        ModelId::PriceToCashFlow => "price_to_cash_flow_fair_value".into(),
    }
}

/// Weighted 10th/90th percentile of all 24 raw scenario values, weighted by `model_weight *
/// scenario_weight` (§4.F step 7).
pub fn weighted_value_range(
    results: &[ValuationResult],
    model_weights: &HashMap<ModelId, f64>,
    scenario_weights: &HashMap<Scenario, f64>,
) -> Option<(f64, f64)> {
    let mut weighted: Vec<(f64, f64)> = results
        .iter()
        .filter_map(|r| {
            let value = r.fair_value?;
            let w = model_weights.get(&r.model_id).copied().unwrap_or(0.0)
                * scenario_weights.get(&r.scenario).copied().unwrap_or(0.0);
            Some((value, w))
        })
        .filter(|(_, w)| *w > 0.0)
        .collect();

    if weighted.is_empty() {
        return None;
    }
    weighted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    let percentile = |p: f64| -> f64 {
        let target = p * total;
        let mut cumulative = 0.0;
        for (value, w) in &weighted {
            cumulative += w;
            if cumulative >= target {
                return *value;
            }
        }
        weighted.last().unwrap().0
    };

    Some((percentile(0.10), percentile(0.90)))
}

/// Recommendation from `(final / current_price) - 1` and confidence (§4.F step 8).
pub fn recommendation(final_fair_value: f64, current_price: f64, confidence: f64) -> &'static str {
    if current_price <= 0.0 {
        return "Hold";
    }
    let upside = final_fair_value / current_price - 1.0;
    if upside > 0.20 && confidence > 0.6 {
        "Strong Buy"
    } else if upside > 0.10 {
        "Buy"
    } else if upside > -0.10 {
        "Hold"
    } else if upside > -0.20 {
        "Sell"
    } else {
        "Strong Sell"
    }
}
