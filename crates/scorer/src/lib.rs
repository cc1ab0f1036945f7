//! Component J: five-dimension composite fundamental score (§4.J). Each dimension is scored
//! 0-100 from `RatioSet` plus caller-supplied industry benchmarks and market-side risk inputs,
//! folded into a weighted composite with a letter rating, ranked, and -- once enough
//! (dimension_scores -> forward_return) history accumulates -- re-weighted by a ridge-regression
//! ML optimiser in place of the distilled spec's Random-Forest regressor (no tree-ensemble crate
//! in this workspace; see DESIGN.md).

pub mod altman;
pub mod composite;
pub mod dimensions;
pub mod optimizer;
pub mod ranking;

pub use altman::altman_z_score;
pub use composite::{composite_score, default_weights};
pub use dimensions::{
    growth_score, health_score, profitability_score, risk_score, valuation_score,
    GrowthInputs, HealthTrends, IndustryBenchmarks, RiskInputs,
};
pub use optimizer::{train as train_dimension_weights, OptimizerResult, ScoreTrainingSample, MIN_TRAINING_SAMPLES};
pub use ranking::rank;
