use crate::config::ValuationAssumptions;
use crate::error::FairValueError;
use crate::financials::CompanyFinancials;
use crate::types::{ComputationOutput, Money, Rate};
use crate::FairValueResult;

use super::dcf::{self, FairValue, ValuationReport};
use super::growth::{self, CumulativeGrowth, ResolvedGrowth};
use super::projection::project_fcf;
use super::rates;
use super::terminal;
use super::wacc;

/// Read accessors over every stage of the valuation of one company.
///
/// The engine holds a shared borrow of the company record, so the record
/// cannot change underneath it. Nothing is cached: each accessor recomputes
/// the stages it depends on.
#[derive(Debug, Clone)]
pub struct ValuationEngine<'a> {
    company: &'a CompanyFinancials,
    assumptions: ValuationAssumptions,
}

impl<'a> ValuationEngine<'a> {
    pub fn new(company: &'a CompanyFinancials, assumptions: ValuationAssumptions) -> Self {
        ValuationEngine {
            company,
            assumptions,
        }
    }

    pub fn with_defaults(company: &'a CompanyFinancials) -> Self {
        Self::new(company, ValuationAssumptions::default())
    }

    pub fn company(&self) -> &CompanyFinancials {
        self.company
    }

    pub fn assumptions(&self) -> &ValuationAssumptions {
        &self.assumptions
    }

    pub fn tax_rate(&self) -> Rate {
        rates::tax_rate(self.company)
    }

    pub fn cost_of_debt(&self) -> Rate {
        rates::cost_of_debt(self.company)
    }

    pub fn cost_of_equity(&self) -> FairValueResult<Rate> {
        rates::cost_of_equity(self.company, &self.assumptions)
    }

    pub fn wacc(&self) -> FairValueResult<Rate> {
        wacc::discount_rate(self.company, &self.assumptions)
    }

    /// Historical period-over-period rates, oldest pair first.
    pub fn growth_rates(&self) -> FairValueResult<Vec<Rate>> {
        growth::growth_rates(&self.company.free_cash_flows)
    }

    /// Growth rate applied to the projection, supplied or derived.
    pub fn average_growth_rate(&self) -> FairValueResult<Rate> {
        Ok(self.resolved_growth()?.rate)
    }

    pub fn resolved_growth(&self) -> FairValueResult<ResolvedGrowth> {
        growth::resolve_growth_rate(self.company, &mut Vec::new())
    }

    pub fn cumulative_growth(&self) -> Vec<CumulativeGrowth> {
        growth::cumulative_growth(
            &self.company.free_cash_flows,
            self.assumptions.cumulative_growth_years,
        )
    }

    pub fn future_fcf(&self) -> FairValueResult<Vec<Money>> {
        project_fcf(self.company, &self.assumptions, self.average_growth_rate()?)
    }

    pub fn terminal_value(&self) -> FairValueResult<Money> {
        let future = self.future_fcf()?;
        let final_fcf = *future.last().ok_or_else(|| {
            FairValueError::InsufficientData("No projection years generated".into())
        })?;
        terminal::terminal_value(
            self.assumptions.terminal_method,
            final_fcf,
            self.wacc()?,
            self.assumptions.terminal_growth_rate,
        )
    }

    /// One factor per projection year plus the terminal value's factor.
    pub fn discount_factors(&self) -> FairValueResult<Vec<Rate>> {
        dcf::discount_factors(self.wacc()?, self.assumptions.investment_duration_years)
    }

    pub fn discounted_fcf(&self) -> FairValueResult<Vec<Money>> {
        dcf::discounted_fcf(
            &self.future_fcf()?,
            self.terminal_value()?,
            &self.discount_factors()?,
        )
    }

    pub fn fair_value(&self) -> FairValueResult<FairValue> {
        dcf::fair_value(
            &self.discounted_fcf()?,
            self.company.outstanding_shares,
            &self.assumptions,
        )
    }

    /// Every intermediate in one pass, wrapped with warnings and metadata.
    pub fn report(&self) -> FairValueResult<ComputationOutput<ValuationReport>> {
        dcf::value_company(self.company, &self.assumptions)
    }
}
