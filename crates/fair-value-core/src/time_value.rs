use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FairValueError;
use crate::types::{Money, Rate};
use crate::FairValueResult;

/// End-of-period discount factors `1 / (1 + rate)^t` for `t = 1..=periods`.
pub fn discount_factors(rate: Rate, periods: u32) -> FairValueResult<Vec<Rate>> {
    if rate <= dec!(-1) {
        return Err(FairValueError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut compounded = Decimal::ONE;
    let mut factors = Vec::with_capacity(periods as usize);

    for t in 1..=periods {
        compounded = compounded.checked_mul(one_plus_r).ok_or_else(|| {
            FairValueError::FinancialImpossibility(format!(
                "discount factor underflows at period {t}"
            ))
        })?;
        if compounded.is_zero() {
            return Err(FairValueError::DivisionByZero {
                context: format!("discount factor at period {t}"),
            });
        }
        factors.push(Decimal::ONE / compounded);
    }

    Ok(factors)
}

/// Compound `seed` forward one period at a time, returning each period's value.
pub fn compound_series(seed: Money, rate: Rate, periods: u32) -> FairValueResult<Vec<Money>> {
    let one_plus_g = Decimal::ONE + rate;
    let mut values = Vec::with_capacity(periods as usize);
    let mut prev = seed;
    for t in 1..=periods {
        let next = prev.checked_mul(one_plus_g).ok_or_else(|| {
            FairValueError::FinancialImpossibility(format!(
                "compounded value overflows at period {t}"
            ))
        })?;
        values.push(next);
        prev = next;
    }
    Ok(values)
}
