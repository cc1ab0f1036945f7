use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, shares};

/// Graham net current asset value: (current_assets - total_liabilities) / shares. A negative
/// result is a valid, meaningful signal of distress, not an error.
pub struct NcavModel;

impl ValuationModel for NcavModel {
    fn model_id(&self) -> ModelId {
        ModelId::Ncav
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let current_assets = f(input.latest_balance.current_assets);
        let total_liabilities = f(input.latest_balance.total_liabilities);
        let present = [current_assets.is_some(), total_liabilities.is_some()];
        let shares_out = shares(input);

        let fair_value = match (current_assets, total_liabilities) {
            (Some(ca), Some(tl)) if shares_out > 0.0 => Some((ca - tl) / shares_out),
            _ => None,
        };

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::Ncav.default_confidence_base() * completeness(&present),
            diagnostics: json!({ "current_assets": current_assets, "total_liabilities": total_liabilities }),
        }
    }
}
