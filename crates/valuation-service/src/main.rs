//! valuation-service: the ambient-stack binary around the Intelligent Valuation and Scoring
//! Engine core. Owns process init (env/tracing), the process-wide `EngineRegistry`, the
//! append-only stores, and the background scheduler that runs §4.G (daily WeightTrainer),
//! §4.H (weekly IndustryTrainer refresh) and §4.K (continuous prediction reconciliation).
//!
//! The request-time surface (`value`/`rate`/`rank`/...) is the logical `ValuationEngine` trait
//! in `valuation-core`; wiring it to a transport is the excluded HTTP layer's job (§1), so this
//! binary does not serve one -- it only keeps the derived state (weights, predictions, industry
//! profiles) current for whatever process does.

mod config;
mod price_lookup;
mod scheduler;

use std::sync::Arc;

use anyhow::Result;
use config::ServiceConfig;
use prediction_store::InMemoryPredictionStore;
use price_lookup::CachedPriceLookup;
use valuation_core::{EngineRegistry, InMemoryIndustryProfileStore, InMemoryWeightVectorStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!(%info, "panic in valuation-service");
    }));

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        tenants = config.tenants.len(),
        weight_train_hour_utc = config.weight_train_hour_utc,
        industry_refresh_weekday = config.industry_refresh_weekday,
        "valuation-service starting"
    );
    for task in scheduler::describe_schedules(&config) {
        tracing::info!(
            task = task.name,
            cron = task.schedule,
            scope = ?task.scope,
            lock_key = %task.lock_key,
            "scheduled task registered"
        );
    }

    let registry = EngineRegistry::init();
    let weight_store: Arc<dyn valuation_core::WeightVectorStore> =
        Arc::new(InMemoryWeightVectorStore::new());
    let profile_store: Arc<dyn valuation_core::IndustryProfileStore> =
        Arc::new(InMemoryIndustryProfileStore::new());
    let predictions = Arc::new(InMemoryPredictionStore::new());

    // No upstream market-data collaborator is wired in by default (ingestion is out of scope,
    // §1); `CachedPriceLookup` falls back to its last-known-price cache, which stays empty
    // until something outside this core (the excluded ingestion layer) populates it.
    let price_lookup: Arc<dyn prediction_store::MarketPriceLookup> =
        Arc::new(CachedPriceLookup::new(registry.clone(), None));

    let mut shutdown = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = scheduler::run_scheduler_loop(
            registry.clone(),
            weight_store,
            profile_store,
            predictions,
            price_lookup,
            config,
        ) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
        _ = shutdown.recv() => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }

    registry.shutdown();
    Ok(())
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
