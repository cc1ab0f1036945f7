use std::collections::HashMap;
use std::sync::Arc;

use valuation_core::{
    EngineRegistry, ModelId, Prediction, PredictionSink, ResponseStatus, ValuationInput,
    ValuationModel, WeightVectorStore,
};

use crate::blend;
use crate::scenario_weights;
use crate::weights;

/// Component F: fans each model out across Bull/Base/Bear (`scenario-executor`), blends the 24
/// resulting `ValuationResult`s with scenario weights derived from the recent trend and model
/// weights resolved by owner precedence, and emits the final `EnsembleResult` (§4.F).
pub struct EnsembleEngine {
    models: Vec<Box<dyn ValuationModel>>,
    registry: Arc<EngineRegistry>,
    weight_store: Arc<dyn WeightVectorStore>,
    prediction_sink: Option<Arc<dyn PredictionSink>>,
}

impl EnsembleEngine {
    pub fn new(registry: Arc<EngineRegistry>, weight_store: Arc<dyn WeightVectorStore>) -> Self {
        Self {
            models: valuation_models::all_models(),
            registry,
            weight_store,
            prediction_sink: None,
        }
    }

    pub fn with_prediction_sink(mut self, sink: Arc<dyn PredictionSink>) -> Self {
        self.prediction_sink = Some(sink);
        self
    }

    /// Runs steps 1-9 of §4.F for one company as of one date. `trend_direction` is the
    /// direction `TrendAnalyzer` reports for the company's primary growth metric (step 1,
    /// "optionally TrendAnalyzer"); callers that skip it should pass `TrendDirection::Stable`.
    pub async fn value(
        &self,
        input: &ValuationInput,
        trend_direction: valuation_core::TrendDirection,
        horizon_days: i64,
    ) -> valuation_core::EnsembleResult {
        let scenario_results = scenario_executor::run(&self.models, input);
        let scenario_weight_map = scenario_weights::from_trend_direction(trend_direction);

        let resolved = weights::resolve(
            &self.registry.active_weights,
            self.weight_store.as_ref(),
            &input.company.tenant_id,
            &input.company.id,
            &input.company.industry,
        )
        .await;

        let blends = blend::blend_models(&scenario_results, &scenario_weight_map);
        let (final_fair_value, confidence, degraded_metrics) =
            blend::aggregate(&blends, &resolved.weights);
        let value_range = blend::weighted_value_range(
            &scenario_results,
            &resolved.weights,
            &scenario_weight_map,
        );

        let status = if final_fair_value.is_none() {
            ResponseStatus::Failed
        } else if !degraded_metrics.is_empty() {
            ResponseStatus::Degraded
        } else {
            ResponseStatus::Ok
        };

        let final_value = final_fair_value.unwrap_or(0.0);
        let (range_low, range_high) = value_range.unwrap_or((final_value, final_value));
        let recommendation_label =
            blend::recommendation(final_value, input.current_price, confidence).to_string();

        // Raw (pre-weight) per-model blended value, not `w_m * v_m` -- `weight-trainer` replays
        // these against freshly trained weights, which only makes sense against the unweighted
        // figure.
        let model_contributions: HashMap<ModelId, f64> = ModelId::ALL
            .iter()
            .map(|m| (*m, blends[m].value.unwrap_or(0.0)))
            .collect();

        let result = valuation_core::EnsembleResult {
            company_id: input.company.id.clone(),
            as_of: input.as_of_date,
            final_fair_value: final_value,
            confidence,
            value_range: (range_low.min(final_value), range_high.max(final_value)),
            model_weights: resolved.weights.clone(),
            scenario_weights: scenario_weight_map,
            per_model_values: scenario_results,
            recommendation: recommendation_label,
            status,
            degraded_metrics,
        };

        if let Some(sink) = self.prediction_sink.clone() {
            if status != ResponseStatus::Failed {
                let prediction = Prediction {
                    id: format!("{}-{}", input.company.id, input.as_of_date.timestamp()),
                    tenant_id: input.company.tenant_id.clone(),
                    company_id: input.company.id.clone(),
                    issued_at: input.as_of_date,
                    horizon_days,
                    fair_value: result.final_fair_value,
                    confidence: result.confidence,
                    weights_digest: resolved.digest.clone(),
                    model_contributions,
                };
                tokio::spawn(async move {
                    if let Err(err) = sink.record(prediction).await {
                        tracing::warn!(%err, "failed to record prediction");
                    }
                });
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use valuation_core::{
        BalanceSheet, CashFlowStatement, Company, EngineResult, IncomeStatement, OwnerKind,
        PeriodKind, ResponseStatus, TrendDirection, ValuationParams, WeightVector,
    };

    struct EmptyStore;

    #[async_trait]
    impl WeightVectorStore for EmptyStore {
        async fn active_for(
            &self,
            _tenant_id: &str,
            _owner_kind: OwnerKind,
            _owner_id: &str,
        ) -> EngineResult<Option<WeightVector>> {
            Ok(None)
        }
        async fn append(&self, _vector: WeightVector) -> EngineResult<()> {
            Ok(())
        }
        async fn retire(
            &self,
            _id: &str,
            _effective_to: chrono::DateTime<chrono::Utc>,
        ) -> EngineResult<()> {
            Ok(())
        }
    }

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

    #[tokio::test]
    async fn s1_healthy_large_cap_produces_a_consistent_ok_result() {
        let registry = EngineRegistry::init();
        let engine = EnsembleEngine::new(registry, Arc::new(EmptyStore));
        let input = sample_input();
        let result = engine.value(&input, TrendDirection::Stable, 90).await;

        assert_eq!(result.status, ResponseStatus::Ok);
        assert!(result.degraded_metrics.is_empty());
        assert!(result.final_fair_value > 0.0);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
        assert!(result.value_range.0 <= result.final_fair_value);
        assert!(result.final_fair_value <= result.value_range.1);
        assert!(matches!(
            result.recommendation.as_str(),
            "Strong Buy" | "Buy" | "Hold" | "Sell" | "Strong Sell"
        ));
        let weight_sum: f64 = result.model_weights.values().sum();
        assert!((weight_sum - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn s2_graham_undefined_degrades_gracefully() {
        let registry = EngineRegistry::init();
        let engine = EnsembleEngine::new(registry, Arc::new(EmptyStore));
        let mut input = sample_input();
        input.latest_income.eps = Some(dec!(-1.0));
        input.latest_balance.shareholders_equity = Some(dec!(10000000000));

        let result = engine.value(&input, TrendDirection::Stable, 90).await;
        assert_eq!(result.status, ResponseStatus::Degraded);
        assert!(result.degraded_metrics.contains(&"graham_number".to_string()));
    }
}
