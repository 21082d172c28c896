use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FairValueError;
use crate::types::Rate;
use crate::FairValueResult;

/// Longest explicit projection horizon accepted, in years.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// How the cost of equity is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostOfEquityMethod {
    /// Capital asset pricing model: Rf + beta * (Rm - Rf)
    #[default]
    Capm,
    /// Dividend capitalization model. Not implemented.
    DividendCapitalization,
}

/// How value beyond the explicit horizon is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalMethod {
    /// Perpetuity growth: TV = FCF_N * (1+g) / (WACC - g)
    #[default]
    PerpetuityGrowth,
    /// Exit multiple on terminal-year earnings. Not implemented.
    ExitMultiple,
}

/// Market and policy assumptions shared by every valuation.
///
/// Every field has a default so a partial YAML/JSON file only needs to name
/// what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationAssumptions {
    /// 5-year treasury yield; its term should match the investment horizon
    pub risk_free_rate: Rate,
    /// Long-run equity market return (S&P 500)
    pub market_rate: Rate,
    /// Sustainable long-run growth used for the terminal value (GDP)
    pub terminal_growth_rate: Rate,
    /// Haircut applied to fair value: adjusted = fair * (1 - margin)
    pub margin_of_safety: Rate,
    /// Reporting unit of the monetary inputs (1000 = thousands)
    pub unit_scale: u32,
    /// Explicit projection horizon in years
    pub investment_duration_years: u32,
    pub cost_of_equity_method: CostOfEquityMethod,
    pub terminal_method: TerminalMethod,
    /// Longest trailing window reported by the cumulative growth statistics
    pub cumulative_growth_years: u32,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        ValuationAssumptions {
            risk_free_rate: dec!(0.04181),
            market_rate: dec!(0.0796),
            terminal_growth_rate: dec!(0.0293),
            margin_of_safety: dec!(0.30),
            unit_scale: 1000,
            investment_duration_years: 5,
            cost_of_equity_method: CostOfEquityMethod::Capm,
            terminal_method: TerminalMethod::PerpetuityGrowth,
            cumulative_growth_years: 3,
        }
    }
}

impl ValuationAssumptions {
    pub fn validate(&self) -> FairValueResult<()> {
        if self.risk_free_rate < Decimal::ZERO {
            return Err(FairValueError::invalid(
                "risk_free_rate",
                "Risk-free rate cannot be negative",
            ));
        }
        if self.market_rate < Decimal::ZERO {
            return Err(FairValueError::invalid(
                "market_rate",
                "Market rate cannot be negative",
            ));
        }
        if self.margin_of_safety < Decimal::ZERO || self.margin_of_safety >= Decimal::ONE {
            return Err(FairValueError::invalid(
                "margin_of_safety",
                "Margin of safety must be in [0, 1)",
            ));
        }
        if self.unit_scale == 0 {
            return Err(FairValueError::invalid(
                "unit_scale",
                "Unit scale must be positive",
            ));
        }
        if self.investment_duration_years == 0 {
            return Err(FairValueError::invalid(
                "investment_duration_years",
                "Projection horizon must be at least one year",
            ));
        }
        if self.investment_duration_years > MAX_PROJECTION_YEARS {
            return Err(FairValueError::invalid(
                "investment_duration_years",
                format!("Projection horizon cannot exceed {MAX_PROJECTION_YEARS} years"),
            ));
        }
        Ok(())
    }

    pub(crate) fn scale(&self) -> Decimal {
        Decimal::from(self.unit_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let a = ValuationAssumptions::default();
        assert_eq!(a.risk_free_rate, dec!(0.04181));
        assert_eq!(a.market_rate, dec!(0.0796));
        assert_eq!(a.terminal_growth_rate, dec!(0.0293));
        assert_eq!(a.margin_of_safety, dec!(0.30));
        assert_eq!(a.unit_scale, 1000);
        assert_eq!(a.investment_duration_years, 5);
        assert_eq!(a.cost_of_equity_method, CostOfEquityMethod::Capm);
        assert_eq!(a.terminal_method, TerminalMethod::PerpetuityGrowth);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let a: ValuationAssumptions =
            serde_json::from_str(r#"{"investment_duration_years": 10, "terminal_method": "exit_multiple"}"#)
                .unwrap();
        assert_eq!(a.investment_duration_years, 10);
        assert_eq!(a.terminal_method, TerminalMethod::ExitMultiple);
        assert_eq!(a.margin_of_safety, dec!(0.30));
    }

    #[test]
    fn test_margin_of_safety_bounds() {
        let mut a = ValuationAssumptions::default();
        a.margin_of_safety = Decimal::ONE;
        assert!(a.validate().is_err());
        a.margin_of_safety = dec!(-0.1);
        assert!(a.validate().is_err());
        a.margin_of_safety = Decimal::ZERO;
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let a = ValuationAssumptions {
            investment_duration_years: 0,
            ..Default::default()
        };
        assert!(matches!(
            a.validate(),
            Err(FairValueError::InvalidInput { ref field, .. }) if field == "investment_duration_years"
        ));
    }

    #[test]
    fn test_horizon_upper_bound() {
        let mut a = ValuationAssumptions {
            investment_duration_years: MAX_PROJECTION_YEARS,
            ..Default::default()
        };
        assert!(a.validate().is_ok());

        a.investment_duration_years = MAX_PROJECTION_YEARS + 1;
        assert!(matches!(
            a.validate(),
            Err(FairValueError::InvalidInput { ref field, .. }) if field == "investment_duration_years"
        ));

        a.investment_duration_years = 4_000_000_000;
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_zero_unit_scale_rejected() {
        let a = ValuationAssumptions {
            unit_scale: 0,
            ..Default::default()
        };
        assert!(a.validate().is_err());
    }
}
