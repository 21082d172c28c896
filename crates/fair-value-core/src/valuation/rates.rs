use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{CostOfEquityMethod, ValuationAssumptions};
use crate::error::FairValueError;
use crate::financials::CompanyFinancials;
use crate::types::{round_rate, Rate};
use crate::FairValueResult;

/// Ratio of two reported amounts, rounded to four decimal places.
///
/// A non-positive numerator or denominator yields exactly zero: a company
/// with no tax charge (or a pre-tax loss) pays 0% tax, and one without
/// meaningful debt or interest carries a 0% cost of debt.
pub fn normalized_rate(numerator: i64, denominator: i64) -> Rate {
    if numerator <= 0 || denominator <= 0 {
        return Decimal::ZERO;
    }
    round_rate(Decimal::from(numerator) / Decimal::from(denominator))
}

/// Effective corporate tax rate.
pub fn tax_rate(company: &CompanyFinancials) -> Rate {
    normalized_rate(company.income_tax, company.pretax_income)
}

/// Effective interest rate on total debt.
pub fn cost_of_debt(company: &CompanyFinancials) -> Rate {
    normalized_rate(company.interest_expense, company.total_debt)
}

/// CAPM: Ke = Rf + beta * (Rm - Rf)
pub fn capm_cost_of_equity(beta: Decimal, risk_free_rate: Rate, market_rate: Rate) -> Rate {
    round_rate(risk_free_rate + beta * (market_rate - risk_free_rate))
}

/// Cost of equity under the configured method.
pub fn cost_of_equity(
    company: &CompanyFinancials,
    assumptions: &ValuationAssumptions,
) -> FairValueResult<Rate> {
    assumptions.validate()?;
    match assumptions.cost_of_equity_method {
        CostOfEquityMethod::Capm => {
            let ke = capm_cost_of_equity(
                company.beta,
                assumptions.risk_free_rate,
                assumptions.market_rate,
            );
            debug!(beta = %company.beta, cost_of_equity = %ke, "CAPM cost of equity");
            Ok(ke)
        }
        CostOfEquityMethod::DividendCapitalization => Err(FairValueError::UnsupportedMethod {
            method: "dividend capitalization cost of equity (use CAPM)".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cost_of_equity_validates_assumptions() {
        let company = CompanyFinancials {
            market_cap: 1_000,
            outstanding_shares: 100,
            beta: dec!(1.2),
            pretax_income: 100,
            income_tax: 20,
            total_debt: 500,
            interest_expense: 25,
            free_cash_flows: vec![110, 100],
            avg_fcf_growth_rate: None,
        };
        let assumptions = ValuationAssumptions {
            risk_free_rate: dec!(-0.01),
            ..Default::default()
        };
        assert!(matches!(
            cost_of_equity(&company, &assumptions),
            Err(FairValueError::InvalidInput { ref field, .. }) if field == "risk_free_rate"
        ));
    }

    #[test]
    fn test_normalized_rate_rounds_to_four_places() {
        assert_eq!(normalized_rate(699_000, 6_343_000), dec!(0.1102));
        assert_eq!(normalized_rate(371_000, 33_723_000), dec!(0.011));
        assert_eq!(normalized_rate(1, 3), dec!(0.3333));
    }

    #[test]
    fn test_normalized_rate_non_positive_is_zero() {
        assert_eq!(normalized_rate(0, 100), Decimal::ZERO);
        assert_eq!(normalized_rate(-50, 100), Decimal::ZERO);
        assert_eq!(normalized_rate(50, 0), Decimal::ZERO);
        assert_eq!(normalized_rate(50, -100), Decimal::ZERO);
    }

    #[test]
    fn test_capm_defaults() {
        // 0.04181 + 2.11 * (0.0796 - 0.04181) = 0.1215469
        let ke = capm_cost_of_equity(dec!(2.11), dec!(0.04181), dec!(0.0796));
        assert_eq!(ke, dec!(0.1215));
    }

    #[test]
    fn test_capm_negative_beta() {
        // 0.04 + (-0.5) * 0.04 = 0.02
        let ke = capm_cost_of_equity(dec!(-0.5), dec!(0.04), dec!(0.08));
        assert_eq!(ke, dec!(0.02));
    }

    #[test]
    fn test_dividend_capitalization_unsupported() {
        let company = CompanyFinancials {
            market_cap: 100,
            outstanding_shares: 10,
            beta: dec!(1),
            pretax_income: 10,
            income_tax: 2,
            total_debt: 10,
            interest_expense: 1,
            free_cash_flows: vec![2, 1],
            avg_fcf_growth_rate: None,
        };
        let assumptions = ValuationAssumptions {
            cost_of_equity_method: CostOfEquityMethod::DividendCapitalization,
            ..Default::default()
        };
        let err = cost_of_equity(&company, &assumptions).unwrap_err();
        assert!(matches!(err, FairValueError::UnsupportedMethod { .. }));
    }
}
