use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A company covered by the engine. Immutable after creation except cosmetic fields
/// (name, sector label); ticker/industry changes are modelled as a new row upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub tenant_id: String,
    pub ticker: String,
    pub industry: String,
    pub sector: String,
    pub shares_outstanding: Decimal,
    pub fiscal_year_end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Annual,
    Quarterly,
}

/// Canonical income-statement line items for one (company, period_end, period_kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub company_id: String,
    pub period_end: DateTime<Utc>,
    pub period_kind: PeriodKind,
    pub revenue: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
    pub operating_income: Option<Decimal>,
    pub ebit: Option<Decimal>,
    pub net_income: Option<Decimal>,
    pub eps: Option<Decimal>,
    pub interest_expense: Option<Decimal>,
    pub tax_expense: Option<Decimal>,
    pub pretax_income: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub company_id: String,
    pub period_end: DateTime<Utc>,
    pub period_kind: PeriodKind,
    pub total_assets: Option<Decimal>,
    pub current_assets: Option<Decimal>,
    pub cash_and_equivalents: Option<Decimal>,
    pub inventory: Option<Decimal>,
    pub receivables: Option<Decimal>,
    pub total_liabilities: Option<Decimal>,
    pub current_liabilities: Option<Decimal>,
    pub long_term_debt: Option<Decimal>,
    pub total_debt: Option<Decimal>,
    pub shareholders_equity: Option<Decimal>,
    pub retained_earnings: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowStatement {
    pub company_id: String,
    pub period_end: DateTime<Utc>,
    pub period_kind: PeriodKind,
    pub cash_flow_operating: Option<Decimal>,
    pub cash_flow_investing: Option<Decimal>,
    pub cash_flow_financing: Option<Decimal>,
    pub capital_expenditures: Option<Decimal>,
    pub dividends_paid: Option<Decimal>,
}

/// One daily bar, unique per (company, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataPoint {
    pub company_id: String,
    pub date: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adjusted_close: Decimal,
    pub volume: Decimal,
}

/// Industry-level median multiple, read-only input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryMedian {
    pub industry: String,
    pub metric: String,
    pub value: f64,
}

/// Macro inputs, read-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacroInputs {
    pub risk_free_rate: f64,
    pub equity_risk_premium: f64,
    pub effective_tax_rate: f64,
}

/// Dense ratio record, one per (company, as_of_date). Every field is `None` when the
/// denominator guard fails or an input is missing -- never `Infinity`/`NaN`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RatioSet {
    pub company_id: String,
    pub tenant_id: String,
    pub as_of_date: Option<DateTime<Utc>>,

    // liquidity
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub cash_ratio: Option<f64>,
    pub working_capital: Option<f64>,

    // profitability
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub roic: Option<f64>,

    // leverage
    pub debt_to_equity: Option<f64>,
    pub debt_to_assets: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub asset_coverage: Option<f64>,

    // efficiency
    pub asset_turnover: Option<f64>,
    pub inventory_turnover: Option<f64>,
    pub receivables_turnover: Option<f64>,

    // market value
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub price_to_cash_flow: Option<f64>,
    pub ev_to_ebitda: Option<f64>,
    pub dividend_yield: Option<f64>,

    // growth (YoY unless noted)
    pub revenue_growth_yoy: Option<f64>,
    pub earnings_growth_yoy: Option<f64>,
    pub book_value_growth_yoy: Option<f64>,

    // cash flow
    pub free_cash_flow: Option<f64>,
    pub fcf_per_share: Option<f64>,
    pub operating_cash_flow_per_share: Option<f64>,
    pub cash_flow_to_debt: Option<f64>,
    pub quality_of_earnings: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    StrongImproving,
    Improving,
    Stable,
    Declining,
    StrongDeclining,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendMetrics {
    pub company_id: String,
    pub metric_name: String,
    pub as_of_date: DateTime<Utc>,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub cagr: Option<f64>,
    pub direction: TrendDirection,
    pub sig_flag: bool,
    pub anomaly_indices: Vec<usize>,
    pub seasonal: bool,
    pub golden_cross: bool,
    pub death_cross: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    Dcf,
    Rim,
    Eva,
    Graham,
    Lynch,
    Ncav,
    PriceToSales,
    PriceToCashFlow,
}

impl ModelId {
    pub const ALL: [ModelId; 8] = [
        ModelId::Dcf,
        ModelId::Rim,
        ModelId::Eva,
        ModelId::Graham,
        ModelId::Lynch,
        ModelId::Ncav,
        ModelId::PriceToSales,
        ModelId::PriceToCashFlow,
    ];

    pub fn index(&self) -> usize {
        ModelId::ALL.iter().position(|m| m == self).unwrap()
    }

    pub fn default_confidence_base(&self) -> f64 {
        match self {
            ModelId::Dcf => 0.75,
            ModelId::Rim => 0.72,
            ModelId::Eva => 0.70,
            ModelId::Graham => 0.68,
            ModelId::Lynch => 0.65,
            ModelId::Ncav => 0.60,
            ModelId::PriceToSales => 0.62,
            ModelId::PriceToCashFlow => 0.64,
        }
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            ModelId::Dcf => 0.20,
            ModelId::Rim => 0.15,
            ModelId::Eva => 0.15,
            ModelId::Graham => 0.12,
            ModelId::Lynch => 0.10,
            ModelId::Ncav => 0.08,
            ModelId::PriceToSales => 0.10,
            ModelId::PriceToCashFlow => 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Bull,
    Base,
    Bear,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Bull, Scenario::Base, Scenario::Bear];
}

/// Growth schedule and macro assumptions a valuation model consumes. `ScenarioExecutor`
/// derives perturbed copies of this per Bull/Base/Bear run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationParams {
    pub wacc: f64,
    pub cost_of_equity: f64,
    pub terminal_growth: f64,
    pub growth_schedule: Vec<f64>,
    pub margin_multiplier: f64,
    pub effective_tax_rate: f64,
    pub industry_ps_median: Option<f64>,
    pub industry_pcf_median: Option<f64>,
}

/// Point-in-time snapshot a `ValuationModel` is evaluated against: latest statements (plus
/// one prior period for growth), current market data, shares outstanding, and assumptions.
#[derive(Debug, Clone)]
pub struct ValuationInput {
    pub company: Company,
    pub as_of_date: DateTime<Utc>,
    pub latest_income: IncomeStatement,
    pub prior_income: Option<IncomeStatement>,
    pub latest_balance: BalanceSheet,
    pub latest_cash_flow: CashFlowStatement,
    pub current_price: f64,
    pub params: ValuationParams,
}

impl ValuationInput {
    /// Fraction of the fields a model typically needs that are actually present; used to
    /// scale `confidence_base` by data completeness.
    pub fn data_completeness(&self, present: usize, total: usize) -> f64 {
        if total == 0 {
            1.0
        } else {
            (present as f64 / total as f64).clamp(0.0, 1.0)
        }
    }
}

/// Raw output of a single `ValuationModel::estimate` call, before scenario blending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub fair_value: Option<f64>,
    pub confidence_base: f64,
    pub diagnostics: serde_json::Value,
}

/// One model's estimate under one scenario. Always produced in groups of 24 (8 models x
/// 3 scenarios) per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    pub company_id: String,
    pub as_of_date: DateTime<Utc>,
    pub model_id: ModelId,
    pub scenario: Scenario,
    pub fair_value: Option<f64>,
    pub confidence_base: f64,
    pub inputs_digest: String,
    pub diagnostics: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Global,
    Industry,
    CompanyOverride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    Default,
    Trained,
    Transferred,
    Meta,
    Smoothed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    Candidate,
    Shadow,
    Active,
    Retired,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct WeightTrainingMetrics {
    pub train_mape: f64,
    pub backtest_mape: f64,
    pub cv_std: f64,
    pub sample_count: usize,
}

/// A weight vector over the eight models for one owner. At most one `Active` vector per
/// owner at any instant; transitions are append-only with effective-date bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightVector {
    pub id: String,
    pub tenant_id: String,
    pub owner_kind: OwnerKind,
    pub owner_id: String,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
    pub model_weights: [f64; 8],
    pub source: WeightSource,
    pub metrics: WeightTrainingMetrics,
    pub ml_confidence: f64,
    pub deployed: DeployState,
    pub rejected_reason: Option<String>,
}

impl WeightVector {
    pub fn weight_of(&self, model: ModelId) -> f64 {
        self.model_weights[model.index()]
    }

    pub fn sums_to_one(&self) -> bool {
        (self.model_weights.iter().sum::<f64>() - 1.0).abs() <= 1e-6
    }

    pub fn all_nonnegative(&self) -> bool {
        self.model_weights.iter().all(|w| *w >= 0.0)
    }
}

/// A prediction emitted by EnsembleEngine::value. After `issued_at + horizon_days`, exactly
/// one Outcome is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub tenant_id: String,
    pub company_id: String,
    pub issued_at: DateTime<Utc>,
    pub horizon_days: i64,
    pub fair_value: f64,
    pub confidence: f64,
    pub weights_digest: String,
    pub model_contributions: HashMap<ModelId, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub prediction_id: String,
    pub actual_price: f64,
    pub abs_pct_error: f64,
    pub model_contributions: HashMap<ModelId, f64>,
    pub reconciled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Valuation,
    Profitability,
    Growth,
    Health,
    Risk,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Valuation,
        Dimension::Profitability,
        Dimension::Growth,
        Dimension::Health,
        Dimension::Risk,
    ];

    pub fn default_weight(&self) -> f64 {
        match self {
            Dimension::Valuation => 0.25,
            Dimension::Profitability => 0.20,
            Dimension::Growth => 0.20,
            Dimension::Health => 0.20,
            Dimension::Risk => 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub company_id: String,
    pub dimension: Dimension,
    pub as_of_date: DateTime<Utc>,
    pub value: f64,
    pub sub_metrics: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    F,
    D,
    C,
    CPlus,
    B,
    BPlus,
    A,
    APlus,
}

impl Rating {
    pub fn from_composite(composite: f64) -> Rating {
        if composite >= 90.0 {
            Rating::APlus
        } else if composite >= 80.0 {
            Rating::A
        } else if composite >= 70.0 {
            Rating::BPlus
        } else if composite >= 60.0 {
            Rating::B
        } else if composite >= 50.0 {
            Rating::CPlus
        } else if composite >= 40.0 {
            Rating::C
        } else if composite >= 30.0 {
            Rating::D
        } else {
            Rating::F
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::APlus => "A+",
            Rating::A => "A",
            Rating::BPlus => "B+",
            Rating::B => "B",
            Rating::CPlus => "C+",
            Rating::C => "C",
            Rating::D => "D",
            Rating::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Default,
    Ml,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
    pub company_id: String,
    pub as_of_date: DateTime<Utc>,
    pub composite: f64,
    pub rating: Rating,
    pub dimension_weights: HashMap<Dimension, f64>,
    pub dimension_scores: HashMap<Dimension, f64>,
    pub source: ScoreSource,
    pub ml_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub industry: String,
    pub sample_count: usize,
    pub centroid_feature_vector: Vec<f64>,
    pub best_models: Vec<ModelId>,
    pub last_trained: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneWayPoint {
    pub value: f64,
    pub fair_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoWayCell {
    pub x: f64,
    pub y: f64,
    pub fair_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TornadoBar {
    pub variable: String,
    pub low: f64,
    pub high: f64,
    pub impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloStats {
    pub simulations: usize,
    pub seed: u64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub percentiles: HashMap<String, f64>,
    pub ci_80: (f64, f64),
    pub ci_90: (f64, f64),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SensitivityReport {
    pub company_id: String,
    pub one_way: HashMap<String, Vec<OneWayPoint>>,
    pub two_way: Option<Vec<TwoWayCell>>,
    pub tornado: Vec<TornadoBar>,
    pub monte_carlo: Option<MonteCarloStats>,
}

/// Final result of `EnsembleEngine::value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub company_id: String,
    pub as_of: DateTime<Utc>,
    pub final_fair_value: f64,
    pub confidence: f64,
    pub value_range: (f64, f64),
    pub model_weights: HashMap<ModelId, f64>,
    pub scenario_weights: HashMap<Scenario, f64>,
    pub per_model_values: Vec<ValuationResult>,
    pub recommendation: String,
    pub status: crate::error::ResponseStatus,
    pub degraded_metrics: Vec<String>,
}
