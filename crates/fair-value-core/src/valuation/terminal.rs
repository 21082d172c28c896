use rust_decimal::Decimal;
use tracing::debug;

use crate::config::TerminalMethod;
use crate::error::FairValueError;
use crate::types::{Money, Rate};
use crate::FairValueResult;

/// Value of all cash flows beyond the explicit horizon, as of its final year.
///
/// Perpetuity growth: TV = FCF_N * (1 + g) / (WACC - g). The discount rate
/// must exceed the terminal growth rate, otherwise the perpetuity diverges.
pub fn terminal_value(
    method: TerminalMethod,
    final_fcf: Money,
    wacc: Rate,
    terminal_growth_rate: Rate,
) -> FairValueResult<Money> {
    match method {
        TerminalMethod::PerpetuityGrowth => {
            let spread = wacc - terminal_growth_rate;
            if spread <= Decimal::ZERO {
                return Err(FairValueError::FinancialImpossibility(format!(
                    "WACC ({wacc}) must exceed the terminal growth rate ({terminal_growth_rate}) for the perpetuity growth model"
                )));
            }
            let tv = final_fcf
                .checked_mul(Decimal::ONE + terminal_growth_rate)
                .and_then(|grown| grown.checked_div(spread))
                .ok_or_else(|| {
                    FairValueError::FinancialImpossibility(
                        "terminal value overflows; WACC is too close to terminal growth".into(),
                    )
                })?;
            debug!(terminal_value = %tv, "perpetuity growth terminal value");
            Ok(tv)
        }
        TerminalMethod::ExitMultiple => Err(FairValueError::UnsupportedMethod {
            method: "exit multiple terminal value (use perpetuity growth)".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_perpetuity_growth() {
        // 100 * 1.02 / (0.10 - 0.02) = 1275
        let tv = terminal_value(
            TerminalMethod::PerpetuityGrowth,
            dec!(100),
            dec!(0.10),
            dec!(0.02),
        )
        .unwrap();
        assert_eq!(tv, dec!(1275));
    }

    #[test]
    fn test_growth_at_or_above_wacc_rejected() {
        for g in [dec!(0.10), dec!(0.12)] {
            let err = terminal_value(TerminalMethod::PerpetuityGrowth, dec!(100), dec!(0.10), g)
                .unwrap_err();
            assert!(matches!(err, FairValueError::FinancialImpossibility(_)));
        }
    }

    #[test]
    fn test_negative_final_fcf_gives_negative_value() {
        let tv = terminal_value(
            TerminalMethod::PerpetuityGrowth,
            dec!(-100),
            dec!(0.10),
            dec!(0.02),
        )
        .unwrap();
        assert_eq!(tv, dec!(-1275));
    }

    #[test]
    fn test_exit_multiple_unsupported() {
        let err = terminal_value(TerminalMethod::ExitMultiple, dec!(100), dec!(0.10), dec!(0.02))
            .unwrap_err();
        assert!(matches!(err, FairValueError::UnsupportedMethod { .. }));
    }
}
