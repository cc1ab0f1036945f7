use async_trait::async_trait;

use crate::error::EngineResult;
use crate::types::{
    CompositeScore, EnsembleResult, IndustryProfile, ModelEstimate, ModelId, Prediction,
    RatioSet, SensitivityReport, TrendMetrics, ValuationInput, WeightVector,
};

/// One of the eight independent fair-value estimators (§4.C). Pure: no I/O, no mutable
/// state, same contract the teacher's analyzer traits follow.
pub trait ValuationModel: Send + Sync {
    fn model_id(&self) -> ModelId;
    fn estimate(&self, input: &ValuationInput) -> ModelEstimate;
}

/// Append-only repository for WeightVector rows. A `DashMap`-backed in-memory
/// implementation is provided by `valuation-core::registry`; an optional sqlx-backed one
/// can be layered on top without changing any caller.
#[async_trait]
pub trait WeightVectorStore: Send + Sync {
    async fn active_for(
        &self,
        tenant_id: &str,
        owner_kind: crate::types::OwnerKind,
        owner_id: &str,
    ) -> EngineResult<Option<WeightVector>>;

    async fn append(&self, vector: WeightVector) -> EngineResult<()>;

    async fn retire(&self, id: &str, effective_to: chrono::DateTime<chrono::Utc>) -> EngineResult<()>;
}

/// The logical invocation surface from §6, independent of transport.
#[async_trait]
pub trait ValuationEngine: Send + Sync {
    async fn value(
        &self,
        tenant_id: &str,
        company_id: &str,
        as_of: chrono::DateTime<chrono::Utc>,
        horizon_days: i64,
    ) -> EngineResult<EnsembleResult>;

    async fn rate(
        &self,
        tenant_id: &str,
        company_id: &str,
        as_of: chrono::DateTime<chrono::Utc>,
    ) -> EngineResult<CompositeScore>;

    async fn rank(
        &self,
        tenant_id: &str,
        scope: &str,
        min_score: Option<f64>,
    ) -> EngineResult<Vec<(String, f64, crate::types::Rating)>>;

    async fn trend(
        &self,
        tenant_id: &str,
        company_id: &str,
        metric: Option<&str>,
    ) -> EngineResult<Vec<TrendMetrics>>;

    async fn sensitivity(
        &self,
        tenant_id: &str,
        company_id: &str,
        as_of: chrono::DateTime<chrono::Utc>,
    ) -> EngineResult<SensitivityReport>;

    async fn train_scope(&self, tenant_id: &str, scope: &str) -> EngineResult<WeightVector>;

    async fn refresh_industry_profiles(&self, tenant_id: &str) -> EngineResult<usize>;

    async fn reconcile_outcomes(
        &self,
        tenant_id: &str,
        until: chrono::DateTime<chrono::Utc>,
    ) -> EngineResult<usize>;
}

/// Trivial marker so `RatioSet -> TrendMetrics` wiring can be unit-tested without the full
/// ensemble engine in scope.
pub trait RatioProvider: Send + Sync {
    fn compute(&self, input: &ValuationInput) -> EngineResult<RatioSet>;
}

/// Append-only sink for `Prediction` rows. `EnsembleEngine` writes to one after every
/// valuation; `PredictionStore` is the reference implementation, reached via `Arc<dyn
/// PredictionSink>` so the engine never depends on its storage backend directly.
#[async_trait]
pub trait PredictionSink: Send + Sync {
    async fn record(&self, prediction: Prediction) -> EngineResult<()>;
}

/// One row per industry, refreshed weekly by `industry-trainer` (§4.H). `get` returns the
/// most recent profile; `all` backs the nearest-neighbour search the transfer path runs
/// over industries that did not independently reach `MIN_SAMPLES_INDUSTRY` this cycle.
#[async_trait]
pub trait IndustryProfileStore: Send + Sync {
    async fn get(&self, tenant_id: &str, industry: &str) -> EngineResult<Option<IndustryProfile>>;

    async fn all(&self, tenant_id: &str) -> EngineResult<Vec<IndustryProfile>>;

    async fn upsert(&self, tenant_id: &str, profile: IndustryProfile) -> EngineResult<()>;
}
