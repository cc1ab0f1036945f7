use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use rand::Rng;
use valuation_core::{EngineRegistry, IndustryProfileStore, OwnerKind, WeightVectorStore};
use weight_trainer::{from_window, train_scope, MIN_SAMPLES_GLOBAL};

use crate::config::{ServiceConfig, TenantScope};

/// §9 design note: "scheduled tasks map to a task runner interface with the recognized options
/// {schedule, scope, jitter_seconds, lock_key}". The teacher workspace has no cron-expression
/// crate, so `schedule` is kept as a descriptive label (what a real deployment would put in its
/// cron config) rather than parsed -- firing is driven by the date/hour comparisons below, the
/// same `tokio::time::interval` idiom `trading-agent::main` uses for its scan loop.
pub struct TaskSchedule {
    pub name: &'static str,
    pub schedule: &'static str,
    pub scope: TaskScope,
    pub jitter_seconds: u64,
    pub lock_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    Global,
    Industry,
}

/// The task table this binary runs, logged at startup so an operator can see the equivalent
/// of what a `schedule.yaml` would declare in a deployment that does carry a cron runner.
pub fn describe_schedules(config: &ServiceConfig) -> Vec<TaskSchedule> {
    vec![
        TaskSchedule {
            name: "weight_train",
            schedule: "0 1 * * *",
            scope: TaskScope::Global,
            jitter_seconds: config.jitter_seconds,
            lock_key: "<tenant>:global".to_string(),
        },
        TaskSchedule {
            name: "industry_refresh",
            schedule: "0 1 * * 0",
            scope: TaskScope::Industry,
            jitter_seconds: config.jitter_seconds,
            lock_key: "<tenant>:industry".to_string(),
        },
    ]
}

/// Tracks the last UTC date each named task fired, so a poll loop that ticks more often than
/// once a day doesn't refire a task that already ran today.
#[derive(Default)]
pub struct TaskClock {
    last_run: HashMap<&'static str, DateTime<Utc>>,
}

impl TaskClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time this is called on a given UTC calendar day at/after `hour`.
    fn due_daily(&mut self, name: &'static str, now: DateTime<Utc>, hour: u32) -> bool {
        if now.hour() < hour {
            return false;
        }
        let already_ran_today = self
            .last_run
            .get(name)
            .map(|last| last.date_naive() == now.date_naive())
            .unwrap_or(false);
        if already_ran_today {
            return false;
        }
        self.last_run.insert(name, now);
        true
    }
}

async fn jitter_sleep(max_seconds: u64) {
    if max_seconds == 0 {
        return;
    }
    let delay = rand::thread_rng().gen_range(0..=max_seconds);
    tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
}

/// Builds per-industry `TrainingSample` buckets for one tenant from the prediction store's
/// trailing window, grouped by the company->industry map in config (§3: statements/company
/// directory are external; this binary is told the mapping rather than discovering it).
fn samples_by_industry(
    tenant: &TenantScope,
    pairs: &[(valuation_core::Prediction, Option<valuation_core::Outcome>)],
) -> HashMap<String, Vec<weight_trainer::TrainingSample>> {
    let industry_of: HashMap<&str, &str> = tenant
        .industries
        .iter()
        .map(|(c, i)| (c.as_str(), i.as_str()))
        .collect();

    let mut grouped: HashMap<String, Vec<(valuation_core::Prediction, Option<valuation_core::Outcome>)>> =
        HashMap::new();
    for (prediction, outcome) in pairs {
        if let Some(industry) = industry_of.get(prediction.company_id.as_str()) {
            grouped
                .entry(industry.to_string())
                .or_default()
                .push((prediction.clone(), outcome.clone()));
        }
    }

    grouped
        .into_iter()
        .map(|(industry, pairs)| (industry, from_window(&pairs, &HashMap::new())))
        .collect()
}

/// One daily pass of §4.G for one tenant's global scope, reusing the 180-day window
/// `PredictionStore::window` exposes.
pub async fn run_global_training(
    registry: &Arc<EngineRegistry>,
    weight_store: &dyn WeightVectorStore,
    predictions: &prediction_store::InMemoryPredictionStore,
    tenant: &TenantScope,
    seed: u64,
) {
    let pairs = predictions.window(&tenant.tenant_id, &tenant.companies, 180, Utc::now());
    let samples = from_window(&pairs, &HashMap::new());

    match train_scope(
        registry,
        weight_store,
        &tenant.tenant_id,
        OwnerKind::Global,
        "global",
        samples,
        MIN_SAMPLES_GLOBAL,
        seed,
    )
    .await
    {
        Ok(result) => {
            if let Some(deployed) = result.deployed {
                tracing::info!(tenant = %tenant.tenant_id, vector_id = %deployed.id, "deployed new global weight vector");
            } else {
                tracing::info!(
                    tenant = %tenant.tenant_id,
                    reason = ?result.candidate.rejected_reason,
                    "global candidate did not win the A/B gate; active vector unchanged"
                );
            }
        }
        Err(err) => tracing::warn!(tenant = %tenant.tenant_id, %err, "global weight training skipped"),
    }
}

/// One weekly pass of §4.H for one tenant across every industry with predictions this window.
pub async fn run_industry_refresh(
    registry: &Arc<EngineRegistry>,
    weight_store: &dyn WeightVectorStore,
    profile_store: &dyn IndustryProfileStore,
    predictions: &prediction_store::InMemoryPredictionStore,
    tenant: &TenantScope,
    meta_weights: &ensemble_net::EnsembleNetWeights,
    seed: u64,
) {
    let pairs = predictions.window(&tenant.tenant_id, &tenant.companies, 180, Utc::now());
    let by_industry = samples_by_industry(tenant, &pairs);
    if by_industry.is_empty() {
        return;
    }

    match industry_trainer::refresh_all(
        registry,
        weight_store,
        profile_store,
        &tenant.tenant_id,
        &by_industry,
        meta_weights,
        seed,
    )
    .await
    {
        Ok(outcomes) => {
            for outcome in outcomes {
                tracing::info!(
                    tenant = %tenant.tenant_id,
                    industry = %outcome.industry,
                    deployed = outcome.vector.is_some(),
                    "industry refresh complete"
                );
            }
        }
        Err(err) => tracing::warn!(tenant = %tenant.tenant_id, %err, "industry refresh failed"),
    }
}

/// The three §4.G/H/K background jobs this binary owns, each gated on its own cadence and
/// serialised per scope via `EngineRegistry::scope_locks` so a slow run can't overlap itself.
pub async fn run_scheduler_loop(
    registry: Arc<EngineRegistry>,
    weight_store: Arc<dyn WeightVectorStore>,
    profile_store: Arc<dyn IndustryProfileStore>,
    predictions: Arc<prediction_store::InMemoryPredictionStore>,
    price_lookup: Arc<dyn prediction_store::MarketPriceLookup>,
    config: ServiceConfig,
) {
    let mut clock = TaskClock::new();
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(config.scheduler_poll_seconds));
    let meta_weights = ensemble_net::EnsembleNetWeights::zeroed(ensemble_net::features::FEATURE_DIM + 1);

    loop {
        ticker.tick().await;
        let now = Utc::now();

        // §4.K: reconcile matured predictions every poll, not just daily -- outcomes should
        // land as soon as their horizon elapses, independent of the training cadence.
        match predictions.reconcile(price_lookup.as_ref(), now).await {
            Ok(written) if written > 0 => {
                tracing::info!(written, "reconciled predictions into outcomes")
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%err, "reconciliation pass failed"),
        }

        if clock.due_daily("weight_train", now, config.weight_train_hour_utc) {
            jitter_sleep(config.jitter_seconds).await;
            for tenant in &config.tenants {
                let key = format!("{}:global", tenant.tenant_id);
                let _guard = registry.scope_locks.scoped_lock(&key).await;
                run_global_training(&registry, weight_store.as_ref(), &predictions, tenant, config.training_seed).await;
            }
        }

        if now.weekday().number_from_monday() == config.industry_refresh_weekday
            && clock.due_daily("industry_refresh", now, config.weight_train_hour_utc)
        {
            for tenant in &config.tenants {
                let key = format!("{}:industry", tenant.tenant_id);
                let _guard = registry.scope_locks.scoped_lock(&key).await;
                run_industry_refresh(
                    &registry,
                    weight_store.as_ref(),
                    profile_store.as_ref(),
                    &predictions,
                    tenant,
                    &meta_weights,
                    config.training_seed,
                )
                .await;
            }
        }
    }
}
