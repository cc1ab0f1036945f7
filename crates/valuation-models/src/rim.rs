use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, growth_schedule, shares};

/// Ohlson residual-income model: equity value = book value + discounted residual income,
/// where residual income_t = earnings_t - cost_of_equity * book_{t-1}, and book evolves under
/// the clean-surplus relation (full earnings retention, no dividend line modelled separately).
pub struct RimModel;

impl ValuationModel for RimModel {
    fn model_id(&self) -> ModelId {
        ModelId::Rim
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let net_income = f(input.latest_income.net_income);
        let equity = f(input.latest_balance.shareholders_equity);
        let present = [net_income.is_some(), equity.is_some()];
        let shares_out = shares(input);
        let r = input.params.cost_of_equity;
        let schedule = growth_schedule(input);

        let fair_value = match (net_income, equity) {
            (Some(mut earnings), Some(book0)) if shares_out > 0.0 && book0 > 0.0 => {
                let mut book = book0;
                let mut pv_sum = 0.0;
                for (i, g) in schedule.iter().enumerate() {
                    earnings *= 1.0 + g;
                    let residual_income = earnings - r * book;
                    pv_sum += residual_income / (1.0 + r).powi((i + 1) as i32);
                    book += earnings;
                }
                let equity_value = book0 + pv_sum;
                Some(equity_value / shares_out)
            }
            _ => None,
        };

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::Rim.default_confidence_base() * completeness(&present),
            diagnostics: json!({
                "cost_of_equity": r,
                "book_value": equity,
                "years": schedule.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::healthy_company;

    #[test]
    fn produces_a_fair_value_above_book_for_growing_earnings() {
        let input = healthy_company(0.09, 0.025);
        let estimate = RimModel.estimate(&input);
        assert!(estimate.fair_value.unwrap() > 0.0);
    }

    #[test]
    fn null_when_equity_is_missing() {
        let mut input = healthy_company(0.09, 0.025);
        input.latest_balance.shareholders_equity = None;
        let estimate = RimModel.estimate(&input);
        assert!(estimate.fair_value.is_none());
    }
}
