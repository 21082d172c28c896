use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::ValuationAssumptions;
use crate::error::FairValueError;
use crate::financials::CompanyFinancials;
use crate::types::{round_rate, with_metadata, ComputationOutput, Rate};
use crate::FairValueResult;

use super::ValuationInputs;

/// Where the growth rate applied to the projection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSource {
    /// The company record carried an explicit override
    Supplied,
    /// Averaged from the historical period-over-period rates
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGrowth {
    pub rate: Rate,
    pub source: GrowthSource,
}

/// Growth over a trailing window ending at the latest reported period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeGrowth {
    pub years: u32,
    /// Growth from the start of the window to the latest period
    pub growth_rate: Rate,
    /// Mean of the period-over-period rates inside the window
    pub average_change: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthStatistics {
    /// Period-over-period rates, oldest pair first
    pub growth_rates: Vec<Rate>,
    pub average_growth_rate: Rate,
    /// Pairs involving a negative cash flow, whose rate was set to zero
    pub zeroed_periods: usize,
    pub cumulative: Vec<CumulativeGrowth>,
}

/// Growth from `older` to `newer`.
///
/// Any negative operand yields zero rather than a signed ratio, so a move
/// from a loss to a profit never reads as a huge (or inverted) growth rate.
pub fn period_over_period(newer: i64, older: i64) -> FairValueResult<Rate> {
    if older == 0 {
        return Err(FairValueError::DivisionByZero {
            context: "period-over-period growth base".into(),
        });
    }
    if newer < 0 || older < 0 {
        return Ok(Decimal::ZERO);
    }
    let older = Decimal::from(older);
    Ok((Decimal::from(newer) - older) / older)
}

/// Period-over-period growth rates of a newest-first history, returned
/// oldest pair first.
pub fn growth_rates(history: &[i64]) -> FairValueResult<Vec<Rate>> {
    if history.len() < 2 {
        return Err(FairValueError::InsufficientData(
            "Growth rates require at least 2 periods".into(),
        ));
    }
    if history.contains(&0) {
        return Err(FairValueError::invalid(
            "free_cash_flows",
            "Growth rates are undefined when a period is zero",
        ));
    }

    (1..history.len())
        .rev()
        .map(|i| period_over_period(history[i - 1], history[i]))
        .collect()
}

/// Arithmetic mean rounded to four decimal places.
pub fn average_growth_rate(rates: &[Rate]) -> FairValueResult<Rate> {
    if rates.is_empty() {
        return Err(FairValueError::InsufficientData(
            "Average growth rate requires at least one rate".into(),
        ));
    }
    let sum: Decimal = rates.iter().copied().sum();
    Ok(round_rate(sum / Decimal::from(rates.len() as u64)))
}

/// Number of adjacent pairs whose rate is forced to zero by a negative value.
pub fn zeroed_periods(history: &[i64]) -> usize {
    history
        .windows(2)
        .filter(|pair| pair[0] < 0 || pair[1] < 0)
        .count()
}

/// Growth over trailing 1..=`max_years` windows of a newest-first history.
///
/// Windows that reach past the history, or that contain a zero period, are
/// left out.
pub fn cumulative_growth(history: &[i64], max_years: u32) -> Vec<CumulativeGrowth> {
    let mut windows = Vec::new();
    for years in 1..=max_years {
        let k = years as usize;
        if k >= history.len() {
            break;
        }
        let window = &history[..=k];
        if window.contains(&0) {
            continue;
        }
        let Ok(growth_rate) = period_over_period(history[0], history[k]) else {
            continue;
        };
        let Ok(rates) = growth_rates(window) else {
            continue;
        };
        let Ok(average_change) = average_growth_rate(&rates) else {
            continue;
        };
        windows.push(CumulativeGrowth {
            years,
            growth_rate: round_rate(growth_rate),
            average_change,
        });
    }
    windows
}

/// Pick the growth rate for the projection: a supplied override within
/// [0, 1] wins, anything else falls back to the historical average.
pub fn resolve_growth_rate(
    company: &CompanyFinancials,
    warnings: &mut Vec<String>,
) -> FairValueResult<ResolvedGrowth> {
    match company.avg_fcf_growth_rate {
        Some(g) if g >= Decimal::ZERO && g <= Decimal::ONE => {
            debug!(growth_rate = %g, "using supplied FCF growth rate");
            return Ok(ResolvedGrowth {
                rate: g,
                source: GrowthSource::Supplied,
            });
        }
        Some(g) => {
            warn!(growth_rate = %g, "supplied FCF growth rate outside [0, 1] ignored");
            warnings.push(format!(
                "Supplied FCF growth rate ({g}) is outside [0, 1]; using the historical average instead"
            ));
        }
        None => {}
    }

    let rates = growth_rates(&company.free_cash_flows)?;
    let rate = average_growth_rate(&rates)?;
    debug!(growth_rate = %rate, periods = rates.len(), "derived FCF growth rate");
    Ok(ResolvedGrowth {
        rate,
        source: GrowthSource::Derived,
    })
}

/// Historical growth statistics of the company's free cash flow.
pub fn calculate_growth_statistics(
    company: &CompanyFinancials,
    assumptions: &ValuationAssumptions,
) -> FairValueResult<ComputationOutput<GrowthStatistics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    assumptions.validate()?;

    let history = &company.free_cash_flows;
    let rates = growth_rates(history)?;
    let average = average_growth_rate(&rates)?;
    let zeroed = zeroed_periods(history);
    if zeroed > 0 {
        warnings.push(format!(
            "{zeroed} of {} periods involve negative free cash flow and count as zero growth",
            rates.len()
        ));
    }

    let stats = GrowthStatistics {
        growth_rates: rates,
        average_growth_rate: average,
        zeroed_periods: zeroed,
        cumulative: cumulative_growth(history, assumptions.cumulative_growth_years),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Period-over-period FCF growth (negative periods zeroed)",
        &ValuationInputs {
            company,
            assumptions,
        },
        warnings,
        elapsed,
        stats,
    ))
}
