use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// One tenant's scheduling scope: which companies to train over and the industry each
/// belongs to (for `industry-trainer`'s per-industry grouping). In production this would be
/// read from the (out-of-scope) tenancy/statement store; here it's config-driven so the
/// binary runs standalone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantScope {
    pub tenant_id: String,
    pub companies: Vec<String>,
    pub industries: Vec<(String, String)>, // (company_id, industry)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub tenants: Vec<TenantScope>,

    /// Hour of day (UTC) the daily WeightTrainer pass fires. Default 01:00 per §4.G.
    pub weight_train_hour_utc: u32,
    /// ISO weekday (1=Monday..7=Sunday) the weekly IndustryTrainer similarity/meta refresh fires.
    pub industry_refresh_weekday: u32,
    /// Day of month the Scorer ML dimension-weight optimiser retrains, per §4.J "monthly".
    pub scorer_retrain_day_of_month: u32,
    /// Polling cadence for the scheduler loop; does not need to be fine-grained since jobs are
    /// gated on wall-clock date comparisons, not on the poll interval itself.
    pub scheduler_poll_seconds: u64,
    /// Upper bound on the random jitter applied before a scheduled job acquires its scope lock,
    /// so that multiple tenants configured with the same hour don't all wake at once.
    pub jitter_seconds: u64,
    /// Default prediction horizon (days) when a caller doesn't specify one (§4.F step 9).
    pub default_horizon_days: i64,
    /// Training/backtest RNG seed; fixed for the reproducibility property (Testable Property 1).
    pub training_seed: u64,

    pub database_url: Option<String>,
    pub log_format_json: bool,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let tenants = parse_tenants().context("parsing TENANTS / TENANT_<ID>_COMPANIES env vars")?;

        Ok(Self {
            tenants,
            weight_train_hour_utc: env_or("WEIGHT_TRAIN_HOUR_UTC", 1)?,
            industry_refresh_weekday: env_or("INDUSTRY_REFRESH_WEEKDAY", 7)?,
            scorer_retrain_day_of_month: env_or("SCORER_RETRAIN_DAY_OF_MONTH", 1)?,
            scheduler_poll_seconds: env_or("SCHEDULER_POLL_SECONDS", 300)?,
            jitter_seconds: env_or("SCHEDULER_JITTER_SECONDS", 120)?,
            default_horizon_days: env_or("DEFAULT_HORIZON_DAYS", 90)?,
            training_seed: env_or("TRAINING_SEED", 42)?,
            database_url: env::var("DATABASE_URL").ok(),
            log_format_json: env::var("RUST_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

/// `TENANTS=t1,t2` plus, per tenant, `TENANT_T1_COMPANIES=AAPL:tech,MSFT:tech` (company:industry
/// pairs). Falls back to a single `default` tenant with an empty scope when unset, so the
/// binary still boots (and simply has nothing to train) in a bare environment.
fn parse_tenants() -> Result<Vec<TenantScope>> {
    let ids = match env::var("TENANTS") {
        Ok(raw) => raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
        Err(_) => vec!["default".to_string()],
    };

    let mut tenants = Vec::with_capacity(ids.len());
    for id in ids {
        let var_name = format!("TENANT_{}_COMPANIES", id.to_uppercase().replace(['-', ' '], "_"));
        let mut companies = Vec::new();
        let mut industries = Vec::new();
        if let Ok(raw) = env::var(&var_name) {
            for pair in raw.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
                let mut parts = pair.splitn(2, ':');
                let company = parts.next().unwrap_or_default().to_string();
                let industry = parts.next().unwrap_or("unknown").to_string();
                if company.is_empty() {
                    continue;
                }
                industries.push((company.clone(), industry));
                companies.push(company);
            }
        }
        tenants.push(TenantScope { tenant_id: id, companies, industries });
    }
    Ok(tenants)
}
