use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use prediction_store::MarketPriceLookup;
use valuation_core::{CircuitState, EngineRegistry, EngineResult, ValuationError};

/// Wraps an optional upstream market-data client with the registry's circuit breaker and a
/// last-known-price cache, per §5 "Timeouts on upstream calls use bounded retries ... after
/// which the upstream circuit opens ... and the core falls back to cached or default inputs."
/// `upstream` is `None` when no ingestion collaborator is wired in -- upstream data ingestion
/// is out of scope for this core (§1); reconciliation then degrades to "no price available"
/// for every prediction until one is configured.
pub struct CachedPriceLookup {
    registry: Arc<EngineRegistry>,
    upstream: Option<Arc<dyn MarketPriceLookup>>,
    last_known: DashMap<String, f64>,
}

impl CachedPriceLookup {
    pub fn new(registry: Arc<EngineRegistry>, upstream: Option<Arc<dyn MarketPriceLookup>>) -> Self {
        Self {
            registry,
            upstream,
            last_known: DashMap::new(),
        }
    }
}

#[async_trait]
impl MarketPriceLookup for CachedPriceLookup {
    async fn price_at(&self, company_id: &str, date: DateTime<Utc>) -> EngineResult<f64> {
        let Some(upstream) = &self.upstream else {
            return self
                .last_known
                .get(company_id)
                .map(|p| *p)
                .ok_or_else(|| ValuationError::UpstreamUnavailable(format!("no market data source configured for {company_id}")));
        };

        let breaker = self.registry.breaker_for("market_price");
        if breaker.state().await == CircuitState::Open {
            return self.last_known.get(company_id).map(|p| *p).ok_or_else(|| {
                ValuationError::UpstreamUnavailable(format!("circuit open, no cached price for {company_id}"))
            });
        }

        const MAX_ATTEMPTS: u32 = 3;
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            match upstream.price_at(company_id, date).await {
                Ok(price) => {
                    breaker.record_success().await;
                    self.last_known.insert(company_id.to_string(), price);
                    return Ok(price);
                }
                Err(err) => {
                    last_err = Some(err);
                    let backoff_ms = 100u64 * 2u64.pow(attempt);
                    tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                }
            }
        }
        breaker.record_failure().await;

        if let Some(price) = self.last_known.get(company_id) {
            tracing::warn!(company_id, "falling back to cached price after upstream failure");
            return Ok(*price);
        }
        Err(last_err.unwrap_or_else(|| ValuationError::UpstreamUnavailable(company_id.to_string())))
    }
}
