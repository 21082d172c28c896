use fair_value_core::valuation::{dcf, growth, rates, ValuationEngine};
use fair_value_core::{CompanyFinancials, FairValueError, ValuationAssumptions};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn company_with_history(history: Vec<i64>) -> CompanyFinancials {
    CompanyFinancials {
        market_cap: 500_000,
        outstanding_shares: 10_000,
        beta: Decimal::ONE,
        pretax_income: 40_000,
        income_tax: 8_000,
        total_debt: 100_000,
        interest_expense: 5_000,
        free_cash_flows: history,
        avg_fcf_growth_rate: None,
    }
}

fn non_zero() -> impl Strategy<Value = i64> {
    prop_oneof![-1_000_000_000i64..=-1, 1i64..=1_000_000_000]
}

proptest! {
    #[test]
    fn normalized_rate_is_rounded_ratio(n in 1i64..=1_000_000_000, d in 1i64..=1_000_000_000) {
        let expected = (Decimal::from(n) / Decimal::from(d)).round_dp(4);
        prop_assert_eq!(rates::normalized_rate(n, d), expected);
    }

    #[test]
    fn normalized_rate_non_positive_is_zero(n in -1_000_000i64..=0, d in -1_000_000i64..=1_000_000) {
        prop_assert_eq!(rates::normalized_rate(n, d), Decimal::ZERO);
        prop_assert_eq!(rates::normalized_rate(d.abs() + 1, n), Decimal::ZERO);
    }

    #[test]
    fn growth_rates_length(history in prop::collection::vec(non_zero(), 2..12)) {
        let rates = growth::growth_rates(&history).unwrap();
        prop_assert_eq!(rates.len(), history.len() - 1);
    }

    #[test]
    fn growth_rates_reject_zero(mut history in prop::collection::vec(non_zero(), 2..12), idx in 0usize..12) {
        let i = idx % history.len();
        history[i] = 0;
        prop_assert!(growth::growth_rates(&history).is_err());
    }

    #[test]
    fn period_over_period_negative_is_zero(newer in -1_000_000i64..=1_000_000, older in non_zero()) {
        let rate = growth::period_over_period(newer, older).unwrap();
        if newer < 0 || older < 0 {
            prop_assert_eq!(rate, Decimal::ZERO);
        } else {
            let expected = (Decimal::from(newer) - Decimal::from(older)) / Decimal::from(older);
            prop_assert_eq!(rate, expected);
        }
    }

    #[test]
    fn period_over_period_zero_base_fails(newer in -1_000_000i64..=1_000_000) {
        let is_div_zero = matches!(
            growth::period_over_period(newer, 0),
            Err(FairValueError::DivisionByZero { .. })
        );
        prop_assert!(is_div_zero);
    }

    #[test]
    fn future_fcf_compounds(
        latest in 1_000i64..=2_000,
        rest in prop::collection::vec(1_000i64..=2_000, 1..6),
        years in 1u32..=10,
    ) {
        let mut history = vec![latest];
        history.extend(rest);
        let company = company_with_history(history);
        let engine = ValuationEngine::new(
            &company,
            ValuationAssumptions { investment_duration_years: years, ..Default::default() },
        );
        let growth = engine.average_growth_rate().unwrap();
        let future = engine.future_fcf().unwrap();
        prop_assert_eq!(future.len(), years as usize);
        prop_assert_eq!(future[0], Decimal::from(latest) * Decimal::from(1000) * (Decimal::ONE + growth));
        for pair in future.windows(2) {
            prop_assert_eq!(pair[1], pair[0] * (Decimal::ONE + growth));
        }
    }

    #[test]
    fn fair_value_increases_with_each_term(
        flows in prop::collection::vec(-1_000_000_000i64..=1_000_000_000, 1..8),
        bump in 1i64..=1_000_000,
        idx in 0usize..8,
    ) {
        let assumptions = ValuationAssumptions::default();
        let base: Vec<Decimal> = flows.iter().map(|f| Decimal::from(*f)).collect();
        let mut bumped = base.clone();
        let i = idx % bumped.len();
        bumped[i] += Decimal::from(bump);

        let low = dcf::fair_value(&base, 1, &assumptions).unwrap();
        let high = dcf::fair_value(&bumped, 1, &assumptions).unwrap();
        prop_assert!(high.fair_value > low.fair_value);
        prop_assert!(high.adjusted_value > low.adjusted_value);
    }
}

#[test]
fn average_growth_rate_empty_fails() {
    assert!(matches!(
        growth::average_growth_rate(&[]),
        Err(FairValueError::InsufficientData(_))
    ));
}

#[test]
fn fair_value_zero_shares_fails() {
    assert!(dcf::fair_value(&[Decimal::ONE], 0, &ValuationAssumptions::default()).is_err());
}
