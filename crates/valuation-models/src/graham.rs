use serde_json::json;
use valuation_core::{ModelEstimate, ModelId, ValuationInput, ValuationModel};

use crate::inputs::{completeness, f, shares};

/// Graham number: sqrt(22.5 * EPS * BVPS). Requires EPS > 0 and BVPS > 0, else `None` --
/// tested explicitly by spec §8 scenario S2.
pub struct GrahamModel;

impl ValuationModel for GrahamModel {
    fn model_id(&self) -> ModelId {
        ModelId::Graham
    }

    fn estimate(&self, input: &ValuationInput) -> ModelEstimate {
        let eps = f(input.latest_income.eps);
        let equity = f(input.latest_balance.shareholders_equity);
        let shares_out = shares(input);
        let present = [eps.is_some(), equity.is_some()];

        let bvps = equity.filter(|_| shares_out > 0.0).map(|e| e / shares_out);

        let fair_value = match (eps, bvps) {
            (Some(eps), Some(bvps)) if eps > 0.0 && bvps > 0.0 => Some((22.5 * eps * bvps).sqrt()),
            _ => None,
        };

        ModelEstimate {
            fair_value,
            confidence_base: ModelId::Graham.default_confidence_base() * completeness(&present),
            diagnostics: json!({ "eps": eps, "bvps": bvps }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{healthy_company, negative_eps_company};

    #[test]
    fn produces_a_fair_value_for_positive_eps() {
        let input = healthy_company(0.09, 0.025);
        let estimate = GrahamModel.estimate(&input);
        assert!(estimate.fair_value.unwrap() > 0.0);
    }

    #[test]
    fn null_for_negative_eps() {
        let input = negative_eps_company();
        let estimate = GrahamModel.estimate(&input);
        assert!(estimate.fair_value.is_none());
    }
}
