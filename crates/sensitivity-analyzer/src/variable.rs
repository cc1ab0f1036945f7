use valuation_core::ValuationParams;

/// The subset of `ValuationParams` fields §4.I's one-way/two-way/tornado/Monte-Carlo operations
/// vary. `GrowthYear` addresses one entry of `growth_schedule` by index; out-of-range indices are
/// clamped to the last entry rather than panicking on a malformed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variable {
    Wacc,
    CostOfEquity,
    TerminalGrowth,
    MarginMultiplier,
    EffectiveTaxRate,
    GrowthYear(usize),
}

impl Variable {
    pub fn read(&self, params: &ValuationParams) -> f64 {
        match self {
            Variable::Wacc => params.wacc,
            Variable::CostOfEquity => params.cost_of_equity,
            Variable::TerminalGrowth => params.terminal_growth,
            Variable::MarginMultiplier => params.margin_multiplier,
            Variable::EffectiveTaxRate => params.effective_tax_rate,
            Variable::GrowthYear(i) => {
                let idx = (*i).min(params.growth_schedule.len().saturating_sub(1));
                params.growth_schedule.get(idx).copied().unwrap_or(0.0)
            }
        }
    }

    pub fn write(&self, params: &mut ValuationParams, value: f64) {
        match self {
            Variable::Wacc => params.wacc = value,
            Variable::CostOfEquity => params.cost_of_equity = value,
            Variable::TerminalGrowth => params.terminal_growth = value,
            Variable::MarginMultiplier => params.margin_multiplier = value,
            Variable::EffectiveTaxRate => params.effective_tax_rate = value,
            Variable::GrowthYear(i) => {
                let idx = (*i).min(params.growth_schedule.len().saturating_sub(1));
                if let Some(slot) = params.growth_schedule.get_mut(idx) {
                    *slot = value;
                }
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Variable::Wacc => "wacc".to_string(),
            Variable::CostOfEquity => "cost_of_equity".to_string(),
            Variable::TerminalGrowth => "terminal_growth".to_string(),
            Variable::MarginMultiplier => "margin_multiplier".to_string(),
            Variable::EffectiveTaxRate => "effective_tax_rate".to_string(),
            Variable::GrowthYear(i) => format!("growth_year_{i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ValuationParams {
        ValuationParams {
            wacc: 0.09,
            cost_of_equity: 0.10,
            terminal_growth: 0.025,
            growth_schedule: vec![0.06, 0.05, 0.04],
            margin_multiplier: 1.0,
            effective_tax_rate: 0.21,
            industry_ps_median: None,
            industry_pcf_median: None,
        }
    }

    #[test]
    fn reads_and_writes_wacc() {
        let mut p = params();
        assert!((Variable::Wacc.read(&p) - 0.09).abs() < 1e-9);
        Variable::Wacc.write(&mut p, 0.11);
        assert!((p.wacc - 0.11).abs() < 1e-9);
    }

    #[test]
    fn growth_year_clamps_out_of_range_indices() {
        let mut p = params();
        Variable::GrowthYear(99).write(&mut p, 0.2);
        assert!((p.growth_schedule[2] - 0.2).abs() < 1e-9);
    }
}
