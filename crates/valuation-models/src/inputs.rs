use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use valuation_core::ValuationInput;

/// Converts one statement field from `Decimal` to `f64` at the model boundary -- money stays
/// fixed-point end-to-end up to here, the valuation outputs themselves are double precision
/// per the data model contract.
pub fn f(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

pub fn shares(input: &ValuationInput) -> f64 {
    input.company.shares_outstanding.to_f64().unwrap_or(0.0)
}

/// Fraction of `present` flags that are true, the per-model completeness multiplier applied
/// to `ModelId::default_confidence_base()` (§4.C).
pub fn completeness(present: &[bool]) -> f64 {
    if present.is_empty() {
        1.0
    } else {
        present.iter().filter(|p| **p).count() as f64 / present.len() as f64
    }
}

/// Growth schedule to project over, defaulting to a flat 3% for 5 years when the caller
/// supplies none.
pub fn growth_schedule(input: &ValuationInput) -> Vec<f64> {
    if input.params.growth_schedule.is_empty() {
        vec![0.03; 5]
    } else {
        input.params.growth_schedule.clone()
    }
}

pub fn net_debt(input: &ValuationInput) -> Option<f64> {
    let total_debt = f(input.latest_balance.total_debt)?;
    let cash = f(input.latest_balance.cash_and_equivalents).unwrap_or(0.0);
    Some(total_debt - cash)
}
