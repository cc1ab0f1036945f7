//! Runs each of the eight valuation models under Bull/Base/Bear parameter perturbations,
//! producing the 24 `ValuationResult`s `EnsembleEngine` blends (§4.D).

use std::collections::HashMap;

use valuation_core::{
    field_digest, ModelId, Scenario, ValuationInput, ValuationModel, ValuationParams,
    ValuationResult,
};

/// Derives a scenario's perturbed parameters and the scenario-level confidence multiplier.
/// Adjustments apply uniformly; models that don't consume a given field (e.g. `margin_multiplier`)
/// run identically across scenarios by construction.
fn perturb(params: &ValuationParams, scenario: Scenario) -> (ValuationParams, f64) {
    let mut perturbed = params.clone();
    let confidence_mult = match scenario {
        Scenario::Bull => {
            perturbed.wacc -= 0.02;
            perturbed.growth_schedule = perturbed.growth_schedule.iter().map(|g| g + 0.03).collect();
            perturbed.margin_multiplier *= 1.05;
            0.70
        }
        Scenario::Base => 0.85,
        Scenario::Bear => {
            perturbed.wacc += 0.03;
            perturbed.growth_schedule = perturbed.growth_schedule.iter().map(|g| g - 0.02).collect();
            perturbed.margin_multiplier *= 0.95;
            0.65
        }
    };
    (perturbed, confidence_mult)
}

/// Runs every model under every scenario, always returning `models.len() * 3` results (8x3 = 24
/// for the full model set).
pub fn run(models: &[Box<dyn ValuationModel>], input: &ValuationInput) -> Vec<ValuationResult> {
    let mut results = Vec::with_capacity(models.len() * Scenario::ALL.len());
    for model in models {
        for scenario in Scenario::ALL {
            let (params, confidence_mult) = perturb(&input.params, scenario);
            let mut scenario_input = input.clone();
            scenario_input.params = params;

            let estimate = model.estimate(&scenario_input);
            let inputs_digest = field_digest(&[
                &input.company.id,
                &input.as_of_date.to_rfc3339(),
                &format!("{:?}", model.model_id()),
                &format!("{:?}", scenario),
            ]);

            results.push(ValuationResult {
                company_id: input.company.id.clone(),
                as_of_date: input.as_of_date,
                model_id: model.model_id(),
                scenario,
                fair_value: estimate.fair_value,
                confidence_base: estimate.confidence_base * confidence_mult,
                inputs_digest,
                diagnostics: estimate.diagnostics,
            });
        }
    }
    results
}

/// Per-model coherence = 1 - std(bull, base, bear) / |mean|, `None` when a scenario is missing
/// or the mean is too close to zero to normalize by.
pub fn coherence(results: &[ValuationResult]) -> HashMap<ModelId, Option<f64>> {
    let mut out = HashMap::with_capacity(ModelId::ALL.len());
    for model_id in ModelId::ALL {
        let values: Vec<f64> = results
            .iter()
            .filter(|r| r.model_id == model_id)
            .filter_map(|r| r.fair_value)
            .collect();

        let score = if values.len() < Scenario::ALL.len() {
            None
        } else {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            if mean.abs() < 1e-9 {
                None
            } else {
                let variance =
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
                Some(1.0 - variance.sqrt() / mean.abs())
            }
        };
        out.insert(model_id, score);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use valuation_core::{BalanceSheet, CashFlowStatement, Company, IncomeStatement, PeriodKind};
    use valuation_models::all_models;

    fn sample_input() -> ValuationInput {
        let period_end = chrono::Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        ValuationInput {
            company: Company {
                id: "c1".into(),
                tenant_id: "t1".into(),
                ticker: "ACME".into(),
                industry: "software".into(),
                sector: "technology".into(),
                shares_outstanding: dec!(1000000000),
                fiscal_year_end: "12-31".into(),
            },
            as_of_date: chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            latest_income: IncomeStatement {
                company_id: "c1".into(),
                period_end,
                period_kind: PeriodKind::Annual,
                revenue: Some(dec!(100000)),
                gross_profit: Some(dec!(60000)),
                operating_income: Some(dec!(20000)),
                ebit: Some(dec!(20000)),
                net_income: Some(dec!(15000)),
                eps: Some(dec!(6.50)),
                interest_expense: Some(dec!(500)),
                tax_expense: Some(dec!(4000)),
                pretax_income: Some(dec!(19000)),
            },
            prior_income: None,
            latest_balance: BalanceSheet {
                company_id: "c1".into(),
                period_end,
                period_kind: PeriodKind::Annual,
                total_assets: Some(dec!(200000)),
                current_assets: Some(dec!(80000)),
                cash_and_equivalents: Some(dec!(20000)),
                inventory: Some(dec!(10000)),
                receivables: Some(dec!(15000)),
                total_liabilities: Some(dec!(90000)),
                current_liabilities: Some(dec!(40000)),
                long_term_debt: Some(dec!(30000)),
                total_debt: Some(dec!(35000)),
                shareholders_equity: Some(dec!(110000)),
                retained_earnings: Some(dec!(50000)),
            },
            latest_cash_flow: CashFlowStatement {
                company_id: "c1".into(),
                period_end,
                period_kind: PeriodKind::Annual,
                cash_flow_operating: Some(dec!(18000)),
                cash_flow_investing: Some(dec!(-5000)),
                cash_flow_financing: Some(dec!(-2000)),
                capital_expenditures: Some(dec!(-4000)),
                dividends_paid: Some(dec!(-1000)),
            },
            current_price: 120.0,
            params: ValuationParams {
                wacc: 0.09,
                cost_of_equity: 0.10,
                terminal_growth: 0.025,
                growth_schedule: vec![0.06, 0.05, 0.04, 0.03, 0.03],
                margin_multiplier: 1.0,
                effective_tax_rate: 0.21,
                industry_ps_median: Some(6.0),
                industry_pcf_median: Some(12.0),
            },
        }
    }

    #[test]
    fn produces_24_results_for_the_full_model_set() {
        let input = sample_input();
        let results = run(&all_models(), &input);
        assert_eq!(results.len(), 24);
    }

    #[test]
    fn dcf_is_monotonic_across_bull_base_bear() {
        let input = sample_input();
        let results = run(&all_models(), &input);
        let by_scenario = |s: Scenario| {
            results
                .iter()
                .find(|r| r.model_id == ModelId::Dcf && r.scenario == s)
                .and_then(|r| r.fair_value)
                .unwrap()
        };
        let bull = by_scenario(Scenario::Bull);
        let base = by_scenario(Scenario::Base);
        let bear = by_scenario(Scenario::Bear);
        assert!(bull >= base);
        assert!(base >= bear);
    }

    #[test]
    fn coherence_is_computed_for_every_model() {
        let input = sample_input();
        let results = run(&all_models(), &input);
        let scores = coherence(&results);
        assert_eq!(scores.len(), ModelId::ALL.len());
        assert!(scores[&ModelId::Dcf].is_some());
    }
}
