use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::config::ValuationAssumptions;
use crate::error::FairValueError;
use crate::financials::CompanyFinancials;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, ProjectionPeriod, Rate};
use crate::FairValueResult;

use super::growth::{
    cumulative_growth, growth_rates, resolve_growth_rate, zeroed_periods, CumulativeGrowth,
    GrowthSource,
};
use super::projection::project_fcf;
use super::terminal::terminal_value;
use super::wacc::{push_reasonableness_warnings, wacc_breakdown};
use super::ValuationInputs;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-share value before and after the margin of safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairValue {
    pub fair_value: Money,
    /// fair_value * (1 - margin_of_safety)
    pub adjusted_value: Money,
    pub margin_of_safety: Rate,
}

/// Fair value measured against the share price implied by market cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketComparison {
    pub market_price: Money,
    /// fair_value / market_price - 1
    pub fair_value_upside: Rate,
    /// adjusted_value / market_price - 1
    pub adjusted_value_upside: Rate,
    /// True when the market price is at or below the adjusted value
    pub below_adjusted_value: bool,
}

/// One discounted cash flow, explicit year or terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcfProjection {
    pub period: ProjectionPeriod,
    pub fcf: Money,
    pub discount_factor: Rate,
    pub discounted_fcf: Money,
}

/// Full breakdown of a fair value estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub tax_rate: Rate,
    pub cost_of_debt: Rate,
    pub cost_of_equity: Rate,
    pub equity_weight: Rate,
    pub debt_weight: Rate,
    /// Discount rate applied to every flow
    pub wacc: Rate,
    /// Historical period-over-period rates, oldest pair first
    pub growth_rates: Vec<Rate>,
    /// Growth rate applied to the projection
    pub average_growth_rate: Rate,
    pub growth_source: GrowthSource,
    pub cumulative_growth: Vec<CumulativeGrowth>,
    /// Explicit years followed by the terminal row
    pub projections: Vec<FcfProjection>,
    pub terminal_value: Money,
    /// Sum of discounted explicit-year flows
    pub pv_of_fcf: Money,
    pub pv_of_terminal: Money,
    pub total_discounted_fcf: Money,
    /// Share of total discounted value coming from the terminal value
    pub terminal_value_pct: Rate,
    pub fair_value: Money,
    pub adjusted_value: Money,
    pub margin_of_safety: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketComparison>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Discount factors for each explicit year, followed by the factor applied to
/// the terminal value (the final year's factor).
pub fn discount_factors(wacc: Rate, years: u32) -> FairValueResult<Vec<Rate>> {
    let mut factors = time_value::discount_factors(wacc, years)?;
    let last = *factors.last().ok_or_else(|| {
        FairValueError::InsufficientData("Discounting requires at least 1 projection year".into())
    })?;
    factors.push(last);
    Ok(factors)
}

/// Present value of each projected flow and of the terminal value.
pub fn discounted_fcf(
    future_fcf: &[Money],
    terminal_value: Money,
    factors: &[Rate],
) -> FairValueResult<Vec<Money>> {
    if factors.len() != future_fcf.len() + 1 {
        return Err(FairValueError::invalid(
            "discount_factors",
            format!(
                "expected {} factors for {} projected flows plus terminal value, got {}",
                future_fcf.len() + 1,
                future_fcf.len(),
                factors.len()
            ),
        ));
    }
    future_fcf
        .iter()
        .chain(std::iter::once(&terminal_value))
        .zip(factors)
        .enumerate()
        .map(|(idx, (flow, factor))| {
            flow.checked_mul(*factor).ok_or_else(|| {
                FairValueError::FinancialImpossibility(format!(
                    "discounted FCF overflows at period {} (flow {flow}, factor {factor})",
                    idx + 1
                ))
            })
        })
        .collect()
}

/// Sum of discounted flows per share, and the margin-of-safety price.
///
/// The flows are in whole currency units while the share count is in the
/// reporting unit, so the total is divided by `unit_scale` as well.
pub fn fair_value(
    discounted: &[Money],
    outstanding_shares: u64,
    assumptions: &ValuationAssumptions,
) -> FairValueResult<FairValue> {
    assumptions.validate()?;
    if outstanding_shares == 0 {
        return Err(FairValueError::DivisionByZero {
            context: "fair value per share (outstanding shares is zero)".into(),
        });
    }
    let total = discounted
        .iter()
        .try_fold(Decimal::ZERO, |acc, flow| acc.checked_add(*flow))
        .ok_or_else(|| {
            FairValueError::FinancialImpossibility("total discounted FCF overflows".into())
        })?;

    let fair = total / assumptions.scale() / Decimal::from(outstanding_shares);
    let adjusted = fair * (Decimal::ONE - assumptions.margin_of_safety);

    Ok(FairValue {
        fair_value: fair,
        adjusted_value: adjusted,
        margin_of_safety: assumptions.margin_of_safety,
    })
}

/// Compare per-share values with the price implied by market capitalisation.
pub fn market_comparison(company: &CompanyFinancials, value: &FairValue) -> Option<MarketComparison> {
    let market_price = company.market_price()?;
    if market_price <= Decimal::ZERO {
        return None;
    }
    Some(MarketComparison {
        market_price,
        fair_value_upside: value.fair_value.checked_div(market_price)? - Decimal::ONE,
        adjusted_value_upside: value.adjusted_value.checked_div(market_price)? - Decimal::ONE,
        below_adjusted_value: market_price <= value.adjusted_value,
    })
}

/// Run the full valuation: discount rate, growth, projection, terminal value,
/// discounting, and per-share fair value.
pub fn value_company(
    company: &CompanyFinancials,
    assumptions: &ValuationAssumptions,
) -> FairValueResult<ComputationOutput<ValuationReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    assumptions.validate()?;

    // --- Discount rate ---
    let rates = wacc_breakdown(company, assumptions)?;
    push_reasonableness_warnings(company, &rates, &mut warnings);

    // --- Growth ---
    let growth = resolve_growth_rate(company, &mut warnings)?;
    let history = &company.free_cash_flows;
    let historical_rates = match growth_rates(history) {
        Ok(r) => r,
        Err(e) => {
            // only reachable with a supplied growth rate
            warnings.push(format!("Historical growth rates unavailable: {e}"));
            Vec::new()
        }
    };
    let zeroed = zeroed_periods(history);
    if zeroed > 0 {
        warnings.push(format!(
            "{zeroed} historical period(s) involve negative free cash flow and count as zero growth"
        ));
    }

    // --- Projection and terminal value ---
    let future = project_fcf(company, assumptions, growth.rate)?;
    let final_fcf = *future.last().ok_or_else(|| {
        FairValueError::InsufficientData("No projection years generated".into())
    })?;
    let tv = terminal_value(
        assumptions.terminal_method,
        final_fcf,
        rates.wacc,
        assumptions.terminal_growth_rate,
    )?;

    // --- Discounting ---
    let factors = discount_factors(rates.wacc, assumptions.investment_duration_years)?;
    let discounted = discounted_fcf(&future, tv, &factors)?;
    let value = fair_value(&discounted, company.outstanding_shares, assumptions)?;

    let pv_of_terminal = *discounted.last().unwrap_or(&Decimal::ZERO);
    let total_discounted_fcf: Money = discounted.iter().sum();
    let pv_of_fcf = total_discounted_fcf - pv_of_terminal;

    let tv_pct = if total_discounted_fcf.is_zero() {
        Decimal::ZERO
    } else {
        pv_of_terminal
            .checked_div(total_discounted_fcf)
            .ok_or_else(|| {
                FairValueError::FinancialImpossibility(
                    "terminal value share of total overflows".into(),
                )
            })?
    };
    if tv_pct > dec!(0.75) {
        warnings.push(format!(
            "Terminal value represents {:.1}% of total discounted value; consider a longer projection horizon",
            tv_pct.saturating_mul(dec!(100))
        ));
    }
    if value.fair_value < Decimal::ZERO {
        warn!(fair_value = %value.fair_value, "negative fair value");
        warnings.push("Fair value is negative: projected cash flows are losses".into());
    }

    let years = assumptions.investment_duration_years;
    let projections = future
        .iter()
        .chain(std::iter::once(&tv))
        .zip(factors.iter().zip(discounted.iter()))
        .enumerate()
        .map(|(idx, (fcf, (factor, pv)))| {
            let year = idx as u32 + 1;
            FcfProjection {
                period: if year > years {
                    ProjectionPeriod::terminal(years)
                } else {
                    ProjectionPeriod::explicit(year)
                },
                fcf: *fcf,
                discount_factor: *factor,
                discounted_fcf: *pv,
            }
        })
        .collect();

    let report = ValuationReport {
        tax_rate: rates.tax_rate,
        cost_of_debt: rates.cost_of_debt,
        cost_of_equity: rates.cost_of_equity,
        equity_weight: rates.equity_weight,
        debt_weight: rates.debt_weight,
        wacc: rates.wacc,
        growth_rates: historical_rates,
        average_growth_rate: growth.rate,
        growth_source: growth.source,
        cumulative_growth: cumulative_growth(history, assumptions.cumulative_growth_years),
        projections,
        terminal_value: tv,
        pv_of_fcf,
        pv_of_terminal,
        total_discounted_fcf,
        terminal_value_pct: tv_pct,
        fair_value: value.fair_value,
        adjusted_value: value.adjusted_value,
        margin_of_safety: value.margin_of_safety,
        market: market_comparison(company, &value),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    info!(
        fair_value = %report.fair_value,
        adjusted_value = %report.adjusted_value,
        wacc = %report.wacc,
        elapsed_us = elapsed,
        "valuation complete"
    );

    Ok(with_metadata(
        "FCF DCF (CAPM-based WACC, perpetuity growth terminal value)",
        &ValuationInputs {
            company,
            assumptions,
        },
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
