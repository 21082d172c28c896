use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::config::ValuationAssumptions;
use crate::error::FairValueError;
use crate::financials::CompanyFinancials;
use crate::types::{round_rate, with_metadata, ComputationOutput, Rate};
use crate::FairValueResult;

use super::rates::{cost_of_debt, cost_of_equity, tax_rate};

/// Component breakdown of the Weighted Average Cost of Capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaccBreakdown {
    /// Weighted average cost of capital
    pub wacc: Rate,
    /// E / (D + E) at market value
    pub equity_weight: Rate,
    /// D / (D + E)
    pub debt_weight: Rate,
    pub cost_of_equity: Rate,
    /// Pre-tax cost of debt
    pub cost_of_debt: Rate,
    pub tax_rate: Rate,
    /// Kd * (1 - t)
    pub after_tax_cost_of_debt: Rate,
}

/// Calculate the Weighted Average Cost of Capital.
///
/// WACC = E/V * Ke + D/V * Kd * (1 - t), with V = E + D taken from the
/// company's market capitalisation and total debt.
pub fn calculate_wacc(
    company: &CompanyFinancials,
    assumptions: &ValuationAssumptions,
) -> FairValueResult<ComputationOutput<WaccBreakdown>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let breakdown = wacc_breakdown(company, assumptions)?;
    push_reasonableness_warnings(company, &breakdown, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "WACC via CAPM with effective tax and interest rates",
        assumptions,
        warnings,
        elapsed,
        breakdown,
    ))
}

/// The discount rate applied to every projected cash flow.
pub fn discount_rate(
    company: &CompanyFinancials,
    assumptions: &ValuationAssumptions,
) -> FairValueResult<Rate> {
    Ok(wacc_breakdown(company, assumptions)?.wacc)
}

pub(crate) fn wacc_breakdown(
    company: &CompanyFinancials,
    assumptions: &ValuationAssumptions,
) -> FairValueResult<WaccBreakdown> {
    assumptions.validate()?;
    if company.market_cap < 0 {
        return Err(FairValueError::invalid(
            "market_cap",
            "Market capitalisation cannot be negative",
        ));
    }
    if company.total_debt < 0 {
        return Err(FairValueError::invalid(
            "total_debt",
            "Total debt cannot be negative",
        ));
    }

    let equity = Decimal::from(company.market_cap);
    let debt = Decimal::from(company.total_debt);
    let value = equity + debt;
    if value.is_zero() {
        return Err(FairValueError::DivisionByZero {
            context: "WACC capital base (market cap + total debt)".into(),
        });
    }

    let ke = cost_of_equity(company, assumptions)?;
    let kd = cost_of_debt(company);
    let t = tax_rate(company);

    let equity_weight = equity / value;
    let debt_weight = debt / value;
    let after_tax_cost_of_debt = kd * (Decimal::ONE - t);
    let wacc = round_rate(equity_weight * ke + debt_weight * after_tax_cost_of_debt);

    debug!(
        wacc = %wacc,
        equity_weight = %equity_weight,
        cost_of_equity = %ke,
        cost_of_debt = %kd,
        tax_rate = %t,
        "computed discount rate"
    );

    Ok(WaccBreakdown {
        wacc,
        equity_weight,
        debt_weight,
        cost_of_equity: ke,
        cost_of_debt: kd,
        tax_rate: t,
        after_tax_cost_of_debt,
    })
}

pub(crate) fn push_reasonableness_warnings(
    company: &CompanyFinancials,
    breakdown: &WaccBreakdown,
    warnings: &mut Vec<String>,
) {
    if company.beta > dec!(3.0) {
        warnings.push(format!(
            "High beta ({}): verify market data; betas above 3.0 are unusual",
            company.beta
        ));
    }
    if breakdown.wacc > dec!(0.20) {
        warnings.push(format!(
            "WACC of {} exceeds 20%; appropriate for high-risk situations only",
            breakdown.wacc
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
