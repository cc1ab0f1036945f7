use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, shares};

/// Peter Lynch fair-PE heuristic: fair PE = growth_rate% (the "PEG = 1" rule of thumb); fair
/// value = fair_PE * EPS. The (growth% + dividend_yield%) / PE ratio is retained only as a
/// diagnostic -- the spec's fair-value formula uses the growth rate directly.
pub struct LynchModel;

impl ValuationModel for LynchModel {
    fn model_id(&self) -> ModelId {
        ModelId::Lynch
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let eps = f(input.latest_income.eps);
        let price = input.current_price;
        let growth_rate_pct = input.params.growth_schedule.first().map(|g| g * 100.0);
        let present = [eps.is_some(), growth_rate_pct.is_some()];

        let shares_out = shares(input);
        let dividends_per_share = f(input.latest_cash_flow.dividends_paid)
            .map(|d| d.abs())
            .filter(|_| shares_out > 0.0)
            .map(|d| d / shares_out)
            .unwrap_or(0.0);
        let dividend_yield_pct = if price > 0.0 {
            dividends_per_share / price * 100.0
        } else {
            0.0
        };

        let pe = eps.filter(|e| *e > 0.0).filter(|_| price > 0.0).map(|e| price / e);

        let fair_value = match (eps, growth_rate_pct) {
            (Some(eps), Some(growth_rate_pct)) if eps > 0.0 && growth_rate_pct > 0.0 => {
                Some(growth_rate_pct * eps)
            }
            _ => None,
        };

        let peyg = pe.filter(|p| *p > 0.0).map(|pe| (growth_rate_pct.unwrap_or(0.0) + dividend_yield_pct) / pe);

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::Lynch.default_confidence_base() * completeness(&present),
            diagnostics: json!({
                "growth_rate_pct": growth_rate_pct,
                "dividend_yield_pct": dividend_yield_pct,
                "pe": pe,
                "peyg_ratio": peyg,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{healthy_company, negative_eps_company};

    #[test]
    fn produces_a_fair_value_for_positive_growth_and_eps() {
        let input = healthy_company(0.09, 0.025);
        let estimate = LynchModel.estimate(&input);
        assert!(estimate.fair_value.unwrap() > 0.0);
    }

    #[test]
    fn null_for_negative_eps() {
        let input = negative_eps_company();
        let estimate = LynchModel.estimate(&input);
        assert!(estimate.fair_value.is_none());
    }
}
