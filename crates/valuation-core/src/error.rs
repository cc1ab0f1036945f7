use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error taxonomy for the valuation core. Library crates return this directly;
/// the service binary wraps it in `anyhow` at the edges.
#[derive(Error, Debug, Clone)]
pub enum ValuationError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("calculation error: {0}")]
    CalculationError(String),

    #[error("undefined formula: {0}")]
    UndefinedFormula(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("stale inputs: as_of {as_of} exceeds max age of {max_age_days} days")]
    StaleInputs {
        as_of: DateTime<Utc>,
        max_age_days: i64,
    },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("training unstable: cv_std {cv_std:.4} exceeds threshold {threshold:.4}")]
    TrainingUnstable { cv_std: f64, threshold: f64 },

    #[error("deadline exceeded: {elapsed_ms}ms elapsed against a {deadline_ms}ms deadline")]
    DeadlineExceeded { elapsed_ms: u64, deadline_ms: u64 },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

pub type EngineResult<T> = Result<T, ValuationError>;

/// Status carried on every user-visible response, per the error-handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Degraded,
    Failed,
}
