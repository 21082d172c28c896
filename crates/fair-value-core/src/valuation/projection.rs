use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ValuationAssumptions;
use crate::error::FairValueError;
use crate::financials::CompanyFinancials;
use crate::time_value::compound_series;
use crate::types::{Money, Rate};
use crate::FairValueResult;

/// Project free cash flow over the investment horizon.
///
/// The latest reported FCF, converted out of its reporting unit, is
/// compounded once per year at `growth_rate`. Returns one value per year,
/// oldest first.
pub fn project_fcf(
    company: &CompanyFinancials,
    assumptions: &ValuationAssumptions,
    growth_rate: Rate,
) -> FairValueResult<Vec<Money>> {
    assumptions.validate()?;
    let latest = company.latest_fcf().ok_or_else(|| {
        FairValueError::InsufficientData("FCF projection requires at least 1 period".into())
    })?;
    if growth_rate <= Decimal::NEGATIVE_ONE {
        return Err(FairValueError::invalid(
            "growth_rate",
            "Growth rate must be greater than -100%",
        ));
    }

    let seed = Decimal::from(latest) * assumptions.scale();
    let years = assumptions.investment_duration_years;
    let projected = compound_series(seed, growth_rate, years)?;

    debug!(seed = %seed, growth_rate = %growth_rate, years, "projected free cash flow");
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn company(history: Vec<i64>) -> CompanyFinancials {
        CompanyFinancials {
            market_cap: 1_000,
            outstanding_shares: 100,
            beta: dec!(1.0),
            pretax_income: 100,
            income_tax: 20,
            total_debt: 500,
            interest_expense: 25,
            free_cash_flows: history,
            avg_fcf_growth_rate: None,
        }
    }

    #[test]
    fn test_projection_seeds_from_latest_in_dollars() {
        let flows = project_fcf(
            &company(vec![100, 90]),
            &ValuationAssumptions::default(),
            dec!(0.10),
        )
        .unwrap();
        assert_eq!(flows.len(), 5);
        assert_eq!(flows[0], dec!(110000));
        assert_eq!(flows[1], dec!(121000));
        assert_eq!(flows[4], dec!(161051));
    }

    #[test]
    fn test_projection_horizon_is_configurable() {
        let assumptions = ValuationAssumptions {
            investment_duration_years: 10,
            unit_scale: 1,
            ..Default::default()
        };
        let flows = project_fcf(&company(vec![100]), &assumptions, Decimal::ZERO).unwrap();
        assert_eq!(flows, vec![dec!(100); 10]);
    }

    #[test]
    fn test_projection_sample() {
        let c = company(vec![3_515_000, 2_786_000]);
        let flows = project_fcf(&c, &ValuationAssumptions::default(), dec!(0.4615)).unwrap();
        assert_eq!(flows[0], dec!(5137172500));
        assert_eq!(flows[1], dec!(7507977608.75));
    }

    #[test]
    fn test_projection_empty_history() {
        let err = project_fcf(&company(vec![]), &ValuationAssumptions::default(), dec!(0.1))
            .unwrap_err();
        assert!(matches!(err, FairValueError::InsufficientData(_)));
    }

    #[test]
    fn test_projection_rejects_oversized_horizon() {
        let assumptions = ValuationAssumptions {
            investment_duration_years: 4_000_000_000,
            ..Default::default()
        };
        let err = project_fcf(&company(vec![100]), &assumptions, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, FairValueError::InvalidInput { .. }));
    }

    #[test]
    fn test_projection_rejects_total_loss_growth() {
        assert!(project_fcf(
            &company(vec![100]),
            &ValuationAssumptions::default(),
            dec!(-1)
        )
        .is_err());
    }
}
