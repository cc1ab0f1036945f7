use chrono::TimeZone;
use rust_decimal_macros::dec;
use valuation_core::{
    BalanceSheet, CashFlowStatement, Company, IncomeStatement, PeriodKind, ValuationInput,
    ValuationParams,
};

/// Shared fixture for the healthy-large-cap scenario (spec §8 S1), reused across every
/// model's unit tests so each one only overrides the fields it is exercising.
pub fn healthy_company(wacc: f64, terminal_growth: f64) -> ValuationInput {
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
        prior_income: Some(IncomeStatement {
            company_id: "c1".into(),
            period_end: chrono::Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
            period_kind: PeriodKind::Annual,
            revenue: Some(dec!(92000)),
            gross_profit: Some(dec!(55000)),
            operating_income: Some(dec!(18000)),
            ebit: Some(dec!(18000)),
            net_income: Some(dec!(13000)),
            eps: Some(dec!(5.80)),
            interest_expense: Some(dec!(480)),
            tax_expense: Some(dec!(3600)),
            pretax_income: Some(dec!(17000)),
        }),
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
            wacc,
            cost_of_equity: 0.10,
            terminal_growth,
            growth_schedule: vec![0.06, 0.05, 0.04, 0.03, 0.03],
            margin_multiplier: 1.0,
            effective_tax_rate: 0.21,
            industry_ps_median: Some(6.0),
            industry_pcf_median: Some(12.0),
        },
    }
}

/// Spec §8 S2: Graham-undefined scenario -- negative EPS, positive BVPS still intact.
pub fn negative_eps_company() -> ValuationInput {
    let mut input = healthy_company(0.09, 0.025);
    input.latest_income.eps = Some(dec!(-1.0));
    input.latest_income.net_income = Some(dec!(-10));
    input
}
