pub mod cash_flow;
pub mod efficiency;
pub mod growth;
pub mod leverage;
pub mod liquidity;
pub mod market_value;
pub mod profitability;
pub mod sum_ttm;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use valuation_core::{BalanceSheet, CashFlowStatement, IncomeStatement, RatioSet};

/// Flattened, f64-converted inputs RatioKernel::compute needs: the current and one
/// year-ago statement set, current price/shares, plus whatever trailing quarters are
/// available for TTM flow sums. All money fields arrive as `Decimal` from the data model and
/// are converted to `f64` once, at this boundary, since ratios are double-precision per the
/// data model contract.
pub struct RatioInput<'a> {
    pub as_of_date: DateTime<Utc>,
    pub income_ttm: &'a [IncomeStatement],
    pub income_prior_year_ttm: Option<&'a [IncomeStatement]>,
    pub balance_latest: &'a BalanceSheet,
    pub balance_prior_year: Option<&'a BalanceSheet>,
    pub cash_flow_ttm: &'a [CashFlowStatement],
    pub price: f64,
    pub shares_outstanding: f64,
    pub effective_tax_rate: f64,
    pub annual_dividends_per_share: f64,
}

fn dec(value: Option<rust_decimal::Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

/// Computes the full RatioSet for one (company, as_of_date). Pure function of its inputs:
/// identical inputs always produce an identical RatioSet (Testable Property 4).
pub fn compute(company_id: &str, tenant_id: &str, input: &RatioInput) -> RatioSet {
    use sum_ttm::{sum_ttm, yoy_growth};

    let revenue = sum_ttm(input.income_ttm, |s| dec(s.revenue));
    let gross_profit = sum_ttm(input.income_ttm, |s| dec(s.gross_profit));
    let operating_income = sum_ttm(input.income_ttm, |s| dec(s.operating_income));
    let net_income = sum_ttm(input.income_ttm, |s| dec(s.net_income));
    let ebit = sum_ttm(input.income_ttm, |s| dec(s.ebit));
    let interest_expense = sum_ttm(input.income_ttm, |s| dec(s.interest_expense));
    let eps = sum_ttm(input.income_ttm, |s| dec(s.eps));

    let revenue_prior = input
        .income_prior_year_ttm
        .and_then(|periods| sum_ttm(periods, |s| dec(s.revenue)));
    let net_income_prior = input
        .income_prior_year_ttm
        .and_then(|periods| sum_ttm(periods, |s| dec(s.net_income)));

    let cash_flow_operating = sum_ttm(input.cash_flow_ttm, |s| dec(s.cash_flow_operating));
    let capex = sum_ttm(input.cash_flow_ttm, |s| dec(s.capital_expenditures));

    let bs = input.balance_latest;
    let total_assets = dec(bs.total_assets).unwrap_or(0.0);
    let current_assets = dec(bs.current_assets).unwrap_or(0.0);
    let current_liabilities = dec(bs.current_liabilities).unwrap_or(0.0);
    let cash_and_equivalents = dec(bs.cash_and_equivalents).unwrap_or(0.0);
    let inventory = dec(bs.inventory).unwrap_or(0.0);
    let receivables = dec(bs.receivables).unwrap_or(0.0);
    let total_liabilities = dec(bs.total_liabilities).unwrap_or(0.0);
    let total_debt = dec(bs.total_debt).unwrap_or(0.0);
    let shareholders_equity = dec(bs.shareholders_equity).unwrap_or(0.0);

    let shareholders_equity_prior = input
        .balance_prior_year
        .and_then(|b| dec(b.shareholders_equity));

    let pe = market_value::pe_ratio(input.price, eps.unwrap_or(0.0));
    let earnings_growth_yoy = yoy_growth(net_income, net_income_prior);
    let revenue_growth_yoy = yoy_growth(revenue, revenue_prior);
    let book_value_growth_yoy = yoy_growth(
        Some(shareholders_equity),
        shareholders_equity_prior,
    );

    let free_cash_flow = match (cash_flow_operating, capex) {
        (Some(ocf), Some(capex)) => cash_flow::free_cash_flow(ocf, capex),
        _ => None,
    };

    let round = |v: Option<f64>| v.map(|x| valuation_core::rounding::round_half_even(x, 6));

    RatioSet {
        company_id: company_id.to_string(),
        tenant_id: tenant_id.to_string(),
        as_of_date: Some(input.as_of_date),

        current_ratio: round(liquidity::current_ratio(current_assets, current_liabilities)),
        quick_ratio: round(liquidity::quick_ratio(
            current_assets,
            inventory,
            current_liabilities,
        )),
        cash_ratio: round(liquidity::cash_ratio(cash_and_equivalents, current_liabilities)),
        working_capital: round(liquidity::working_capital(current_assets, current_liabilities)),

        gross_margin: round(gross_profit.and_then(|gp| {
            profitability::gross_margin(gp, revenue.unwrap_or(0.0))
        })),
        operating_margin: round(operating_income.and_then(|oi| {
            profitability::operating_margin(oi, revenue.unwrap_or(0.0))
        })),
        net_margin: round(net_income.and_then(|ni| {
            profitability::net_margin(ni, revenue.unwrap_or(0.0))
        })),
        roe: round(net_income.and_then(|ni| profitability::roe(ni, shareholders_equity))),
        roa: round(net_income.and_then(|ni| profitability::roa(ni, total_assets))),
        roic: round(operating_income.and_then(|oi| {
            profitability::roic(
                oi,
                input.effective_tax_rate,
                total_debt,
                shareholders_equity,
                cash_and_equivalents,
            )
        })),

        debt_to_equity: round(leverage::debt_to_equity(total_liabilities, shareholders_equity)),
        debt_to_assets: round(leverage::debt_to_assets(total_debt, total_assets)),
        interest_coverage: round(ebit.and_then(|e| {
            leverage::interest_coverage(e, interest_expense.unwrap_or(0.0))
        })),
        asset_coverage: round(leverage::asset_coverage(total_assets, total_liabilities)),

        asset_turnover: round(revenue.and_then(|r| efficiency::asset_turnover(r, total_assets))),
        inventory_turnover: round(revenue.and_then(|r| {
            let cost_of_revenue = r - gross_profit.unwrap_or(0.0);
            efficiency::inventory_turnover(cost_of_revenue, inventory)
        })),
        receivables_turnover: round(revenue.and_then(|r| {
            efficiency::receivables_turnover(r, receivables)
        })),

        pe_ratio: round(pe),
        pb_ratio: round(market_value::pb_ratio(
            input.price,
            input.shares_outstanding,
            shareholders_equity,
        )),
        peg_ratio: round(market_value::peg_ratio(pe, earnings_growth_yoy)),
        price_to_sales: round(market_value::price_to_sales(
            input.price,
            input.shares_outstanding,
            revenue.unwrap_or(0.0),
        )),
        price_to_cash_flow: round(market_value::price_to_cash_flow(
            input.price,
            input.shares_outstanding,
            cash_flow_operating.unwrap_or(0.0),
        )),
        ev_to_ebitda: round(operating_income.and_then(|oi| {
            // EBITDA approximated as operating income (EBIT) since D&A is not modelled as a
            // distinct statement line in this data model.
            market_value::ev_to_ebitda(
                input.price,
                input.shares_outstanding,
                total_debt,
                cash_and_equivalents,
                oi,
            )
        })),
        dividend_yield: round(market_value::dividend_yield(
            input.annual_dividends_per_share,
            input.price,
        )),

        revenue_growth_yoy: round(revenue_growth_yoy),
        earnings_growth_yoy: round(earnings_growth_yoy),
        book_value_growth_yoy: round(book_value_growth_yoy),

        free_cash_flow: round(free_cash_flow),
        fcf_per_share: round(free_cash_flow.and_then(|fcf| {
            cash_flow::per_share(fcf, input.shares_outstanding)
        })),
        operating_cash_flow_per_share: round(cash_flow_operating.and_then(|ocf| {
            cash_flow::per_share(ocf, input.shares_outstanding)
        })),
        cash_flow_to_debt: round(cash_flow_operating.and_then(|ocf| {
            cash_flow::cash_flow_to_debt(ocf, total_debt)
        })),
        quality_of_earnings: round(cash_flow_operating.and_then(|ocf| {
            cash_flow::quality_of_earnings(ocf, net_income.unwrap_or(0.0))
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use valuation_core::PeriodKind;

    fn income(revenue: f64, net_income: f64) -> IncomeStatement {
        IncomeStatement {
            company_id: "c1".into(),
            period_end: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
            period_kind: PeriodKind::Annual,
            revenue: Some(rust_decimal::Decimal::try_from(revenue).unwrap()),
            gross_profit: Some(dec!(400)),
            operating_income: Some(dec!(200)),
            ebit: Some(dec!(200)),
            net_income: Some(rust_decimal::Decimal::try_from(net_income).unwrap()),
            eps: Some(dec!(2.5)),
            interest_expense: Some(dec!(20)),
            tax_expense: Some(dec!(40)),
            pretax_income: Some(dec!(240)),
        }
    }

    fn balance() -> BalanceSheet {
        BalanceSheet {
            company_id: "c1".into(),
            period_end: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
            period_kind: PeriodKind::Annual,
            total_assets: Some(dec!(5000)),
            current_assets: Some(dec!(1500)),
            cash_and_equivalents: Some(dec!(500)),
            inventory: Some(dec!(300)),
            receivables: Some(dec!(200)),
            total_liabilities: Some(dec!(2000)),
            current_liabilities: Some(dec!(800)),
            long_term_debt: Some(dec!(1000)),
            total_debt: Some(dec!(1200)),
            shareholders_equity: Some(dec!(3000)),
            retained_earnings: Some(dec!(1000)),
        }
    }

    fn cash_flow_stmt() -> CashFlowStatement {
        CashFlowStatement {
            company_id: "c1".into(),
            period_end: Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap(),
            period_kind: PeriodKind::Annual,
            cash_flow_operating: Some(dec!(300)),
            cash_flow_investing: Some(dec!(-100)),
            cash_flow_financing: Some(dec!(-50)),
            capital_expenditures: Some(dec!(-80)),
            dividends_paid: Some(dec!(-20)),
        }
    }

    #[test]
    fn compute_is_reproducible() {
        let income_ttm = vec![income(1000.0, 150.0)];
        let balance_latest = balance();
        let cash_flow_ttm = vec![cash_flow_stmt()];
        let input = RatioInput {
            as_of_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            income_ttm: &income_ttm,
            income_prior_year_ttm: None,
            balance_latest: &balance_latest,
            balance_prior_year: None,
            cash_flow_ttm: &cash_flow_ttm,
            price: 45.0,
            shares_outstanding: 100.0,
            effective_tax_rate: 0.21,
            annual_dividends_per_share: 0.5,
        };

        let first = compute("c1", "t1", &input);
        let second = compute("c1", "t1", &input);

        assert_eq!(first.current_ratio, second.current_ratio);
        assert_eq!(first.roe, second.roe);
        assert!((first.current_ratio.unwrap() - 1.875).abs() < 1e-9);
        assert!((first.roe.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_denominator_yields_null_not_infinity() {
        let mut bad_balance = balance();
        bad_balance.current_liabilities = Some(dec!(0));
        let income_ttm = vec![income(1000.0, 150.0)];
        let cash_flow_ttm = vec![cash_flow_stmt()];
        let input = RatioInput {
            as_of_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            income_ttm: &income_ttm,
            income_prior_year_ttm: None,
            balance_latest: &bad_balance,
            balance_prior_year: None,
            cash_flow_ttm: &cash_flow_ttm,
            price: 45.0,
            shares_outstanding: 100.0,
            effective_tax_rate: 0.21,
            annual_dividends_per_share: 0.0,
        };

        let ratios = compute("c1", "t1", &input);
        assert_eq!(ratios.current_ratio, None);
    }
}
