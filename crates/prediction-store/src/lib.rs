//! Append-only Prediction/Outcome log (§4.K). `InMemoryPredictionStore` is the reference
//! implementation; an sqlx-backed store can sit behind the same `PredictionSink` trait
//! `valuation-core` defines without any caller change.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use dashmap::DashMap;
use valuation_core::{EngineResult, ModelId, Outcome, Prediction, PredictionSink, ValuationError};

/// Rolls a date forward to the next business day (Mon-Fri) -- weekend predictions settle
/// against the following Monday's close.
pub fn snap_to_business_day(date: DateTime<Utc>) -> DateTime<Utc> {
    let mut snapped = date;
    loop {
        match snapped.weekday() {
            Weekday::Sat => snapped += Duration::days(2),
            Weekday::Sun => snapped += Duration::days(1),
            _ => return snapped,
        }
    }
}

/// Looks up the realised market price used to reconcile a Prediction into an Outcome.
#[async_trait]
pub trait MarketPriceLookup: Send + Sync {
    async fn price_at(&self, company_id: &str, date: DateTime<Utc>) -> EngineResult<f64>;
}

/// In-memory append-only store. Predictions and outcomes are never mutated once written;
/// `reconcile` adds a new `Outcome` row keyed by `prediction_id`, it never rewrites one.
#[derive(Default)]
pub struct InMemoryPredictionStore {
    predictions: DashMap<String, Prediction>,
    outcomes: DashMap<String, Outcome>,
}

impl InMemoryPredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prediction_id: &str) -> Option<Prediction> {
        self.predictions.get(prediction_id).map(|p| p.value().clone())
    }

    pub fn outcome_for(&self, prediction_id: &str) -> Option<Outcome> {
        self.outcomes.get(prediction_id).map(|o| o.value().clone())
    }

    /// Predictions for (tenant, scope) issued within the last `days`, paired with their
    /// Outcome when reconciliation has already happened. `scope` is `"global"` or an industry
    /// name; callers filter by company->industry membership before calling `window` when they
    /// need an industry-restricted view, since `Prediction` itself doesn't carry industry.
    pub fn window(
        &self,
        tenant_id: &str,
        company_ids: &[String],
        days: i64,
        now: DateTime<Utc>,
    ) -> Vec<(Prediction, Option<Outcome>)> {
        let cutoff = now - Duration::days(days);
        self.predictions
            .iter()
            .filter(|entry| {
                let p = entry.value();
                p.tenant_id == tenant_id && p.issued_at >= cutoff && company_ids.contains(&p.company_id)
            })
            .map(|entry| {
                let p = entry.value().clone();
                let outcome = self.outcome_for(&p.id);
                (p, outcome)
            })
            .collect()
    }

    /// Predictions whose horizon has elapsed as of `now` and that have no Outcome yet.
    pub fn due_for_reconciliation(&self, now: DateTime<Utc>) -> Vec<Prediction> {
        self.predictions
            .iter()
            .filter(|entry| {
                let p = entry.value();
                let due_at = snap_to_business_day(p.issued_at + Duration::days(p.horizon_days));
                due_at <= now && !self.outcomes.contains_key(&p.id)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Writes the Outcome for one Prediction. `model_contributions` carries each model's
    /// per-share estimate at issuance so per-model error can be attributed later.
    pub fn write_outcome(
        &self,
        prediction_id: &str,
        actual_price: f64,
        model_contributions: HashMap<ModelId, f64>,
        reconciled_at: DateTime<Utc>,
    ) -> EngineResult<Outcome> {
        let prediction = self
            .predictions
            .get(prediction_id)
            .ok_or_else(|| ValuationError::InvalidData(format!("unknown prediction {prediction_id}")))?
            .value()
            .clone();

        let abs_pct_error = if actual_price.abs() > 1e-9 {
            ((prediction.fair_value - actual_price) / actual_price).abs()
        } else {
            0.0
        };

        let outcome = Outcome {
            prediction_id: prediction_id.to_string(),
            actual_price,
            abs_pct_error,
            model_contributions,
            reconciled_at,
        };
        self.outcomes.insert(prediction_id.to_string(), outcome.clone());
        Ok(outcome)
    }

    /// Runs the daily reconciler: for every Prediction past its (business-day-snapped) horizon
    /// without an Outcome, fetches the realised price and writes one.
    pub async fn reconcile(
        &self,
        lookup: &dyn MarketPriceLookup,
        now: DateTime<Utc>,
    ) -> EngineResult<usize> {
        let due = self.due_for_reconciliation(now);
        let mut written = 0;
        for prediction in due {
            match lookup.price_at(&prediction.company_id, now).await {
                Ok(actual_price) => {
                    self.write_outcome(
                        &prediction.id,
                        actual_price,
                        prediction.model_contributions.clone(),
                        now,
                    )?;
                    written += 1;
                }
                Err(err) => {
                    tracing::warn!(prediction_id = %prediction.id, %err, "price lookup failed during reconciliation");
                }
            }
        }
        Ok(written)
    }
}

#[async_trait]
impl PredictionSink for InMemoryPredictionStore {
    async fn record(&self, prediction: Prediction) -> EngineResult<()> {
        self.predictions.insert(prediction.id.clone(), prediction);
        Ok(())
    }
}
