use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, growth_schedule, net_debt, shares};

/// Discounted cash flow: project FCF for the growth schedule's length (default 5 years),
/// Gordon-growth terminal value, discount to present, subtract net debt, divide by shares.
/// Grounded on `fundamental-analysis`'s DCF-lite projection, generalised from a fixed 3%
/// growth/0.03 terminal assumption to the caller-supplied growth schedule and terminal rate.
pub struct DcfModel;

impl ValuationModel for DcfModel {
    fn model_id(&self) -> ModelId {
        ModelId::Dcf
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let params = &input.params;
        if params.wacc <= params.terminal_growth {
            return ModelEstimate {
                fair_value: None,
                confidence_base: 0.0,
                diagnostics: json!({
                    "reason": "undefined_formula: WACC <= terminal_growth",
                    "wacc": params.wacc,
                    "terminal_growth": params.terminal_growth,
                }),
            };
        }

        let ocf = f(input.latest_cash_flow.cash_flow_operating);
        let capex = f(input.latest_cash_flow.capital_expenditures);
        let total_debt_present = input.latest_balance.total_debt.is_some();
        let cash_present = input.latest_balance.cash_and_equivalents.is_some();
        let present = [ocf.is_some(), capex.is_some(), total_debt_present, cash_present];

        let shares_out = shares(input);
        let schedule = growth_schedule(input);
        let net_debt_value = net_debt(input);

        let fair_value = match (ocf, capex, net_debt_value) {
            (Some(ocf), Some(capex), Some(net_debt)) if shares_out > 0.0 => {
                let fcf0 = ocf - capex.abs();
                let mut fcf = fcf0;
                let mut pv_sum = 0.0;
                for (i, g) in schedule.iter().enumerate() {
                    fcf *= 1.0 + g;
                    pv_sum += fcf / (1.0 + params.wacc).powi((i + 1) as i32);
                }
                let terminal_value =
                    fcf * (1.0 + params.terminal_growth) / (params.wacc - params.terminal_growth);
                let terminal_pv = terminal_value / (1.0 + params.wacc).powi(schedule.len() as i32);
                let enterprise_value = pv_sum + terminal_pv;
                let equity_value = enterprise_value - net_debt;
                Some(equity_value / shares_out)
            }
            _ => None,
        };

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::Dcf.default_confidence_base() * completeness(&present),
            diagnostics: json!({
                "fcf0": ocf.zip(capex).map(|(o, c)| o - c.abs()),
                "wacc": params.wacc,
                "terminal_growth": params.terminal_growth,
                "years": schedule.len(),
                "net_debt": net_debt_value,
            }),
        }
    }
}
