use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, growth_schedule, shares};

/// Economic Value Added: NOPAT = EBIT * (1 - tax_rate); economic profit = NOPAT -
/// WACC * invested_capital; enterprise value = invested_capital + discounted EVA + terminal;
/// equity = EV - total_debt.
pub struct EvaModel;

impl ValuationModel for EvaModel {
    fn model_id(&self) -> ModelId {
        ModelId::Eva
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let params = &input.params;
        let ebit = f(input.latest_income.ebit);
        let equity = f(input.latest_balance.shareholders_equity);
        let total_debt = f(input.latest_balance.total_debt);
        let present = [ebit.is_some(), equity.is_some(), total_debt.is_some()];
        let shares_out = shares(input);
        let schedule = growth_schedule(input);

        let fair_value = if params.wacc <= params.terminal_growth {
            None
        } else {
            match (ebit, equity, total_debt) {
                (Some(ebit0), Some(equity), Some(total_debt)) if shares_out > 0.0 => {
                    let invested_capital = equity + total_debt;
                    if invested_capital <= 0.0 {
                        None
                    } else {
                        let mut ebit_t = ebit0;
                        let mut pv_sum = 0.0;
                        let mut last_eva = 0.0;
                        for (i, g) in schedule.iter().enumerate() {
                            ebit_t *= 1.0 + g;
                            let nopat = ebit_t * (1.0 - params.effective_tax_rate);
                            let eva = nopat - params.wacc * invested_capital;
                            pv_sum += eva / (1.0 + params.wacc).powi((i + 1) as i32);
                            last_eva = eva;
                        }
                        let terminal_value = last_eva * (1.0 + params.terminal_growth)
                            / (params.wacc - params.terminal_growth);
                        let terminal_pv =
                            terminal_value / (1.0 + params.wacc).powi(schedule.len() as i32);
                        let enterprise_value = invested_capital + pv_sum + terminal_pv;
                        let equity_value = enterprise_value - total_debt;
                        Some(equity_value / shares_out)
                    }
                }
                _ => None,
            }
        };

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::Eva.default_confidence_base() * completeness(&present),
            diagnostics: json!({
                "wacc": params.wacc,
                "tax_rate": params.effective_tax_rate,
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
    fn produces_a_fair_value_for_positive_spread() {
        let input = healthy_company(0.09, 0.025);
        let estimate = EvaModel.estimate(&input);
        assert!(estimate.fair_value.unwrap() > 0.0);
    }

    #[test]
    fn null_when_wacc_at_or_below_terminal_growth() {
        let input = healthy_company(0.04, 0.05);
        let estimate = EvaModel.estimate(&input);
        assert!(estimate.fair_value.is_none());
    }
}
