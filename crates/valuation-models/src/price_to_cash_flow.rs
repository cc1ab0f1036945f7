use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, shares};

/// Industry-median P/CF multiple applied to operating cash flow per share.
pub struct PriceToCashFlowModel;

impl ValuationModel for PriceToCashFlowModel {
    fn model_id(&self) -> ModelId {
        ModelId::PriceToCashFlow
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let operating_cf = f(input.latest_cash_flow.cash_flow_operating);
        let median_pcf = input.params.industry_pcf_median;
        let shares_out = shares(input);
        let present = [operating_cf.is_some(), median_pcf.is_some()];

        let fair_value = match (operating_cf, median_pcf) {
            (Some(operating_cf), Some(median_pcf)) if shares_out > 0.0 && operating_cf > 0.0 => {
                Some(median_pcf * (operating_cf / shares_out))
            }
            _ => None,
        };

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::PriceToCashFlow.default_confidence_base() * completeness(&present),
            diagnostics: json!({
                "industry_pcf_median": median_pcf,
                "operating_cf_per_share": operating_cf.filter(|_| shares_out > 0.0).map(|cf| cf / shares_out),
            }),
        }
    }
}
