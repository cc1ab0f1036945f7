use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, shares};

/// Industry-median P/S multiple applied to revenue per share.
pub struct PriceToSalesModel;

impl ValuationModel for PriceToSalesModel {
    fn model_id(&self) -> ModelId {
        ModelId::PriceToSales
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let revenue = f(input.latest_income.revenue);
        let median_ps = input.params.industry_ps_median;
        let shares_out = shares(input);
        let present = [revenue.is_some(), median_ps.is_some()];

        let fair_value = match (revenue, median_ps) {
            (Some(revenue), Some(median_ps)) if shares_out > 0.0 && revenue > 0.0 => {
                Some(median_ps * (revenue / shares_out))
            }
            _ => None,
        };

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::PriceToSales.default_confidence_base() * completeness(&present),
            diagnostics: json!({ "industry_ps_median": median_ps, "revenue_per_share": revenue.filter(|_| shares_out > 0.0).map(|r| r / shares_out) }),
        }
    }
}
