use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Decimal places kept on every reported rate.
pub const RATE_PRECISION: u32 = 4;

/// Round a rate to the reporting precision.
pub fn round_rate(rate: Rate) -> Rate {
    rate.round_dp(RATE_PRECISION)
}

/// A single period in a financial projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPeriod {
    pub year: u32,
    pub label: String,
    pub is_terminal: bool,
}

impl ProjectionPeriod {
    pub fn explicit(year: u32) -> Self {
        ProjectionPeriod {
            year,
            label: format!("Year {year}"),
            is_terminal: false,
        }
    }

    pub fn terminal(year: u32) -> Self {
        ProjectionPeriod {
            year,
            label: "Terminal".to_string(),
            is_terminal: true,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_rate_four_places() {
        assert_eq!(round_rate(dec!(0.110200220)), dec!(0.1102));
        assert_eq!(round_rate(dec!(0.01100140)), dec!(0.011));
    }

    #[test]
    fn test_projection_period_labels() {
        assert_eq!(ProjectionPeriod::explicit(3).label, "Year 3");
        let tv = ProjectionPeriod::terminal(5);
        assert!(tv.is_terminal);
        assert_eq!(tv.year, 5);
    }

    #[test]
    fn test_with_metadata_echoes_assumptions() {
        let out = with_metadata("test", &serde_json::json!({"a": 1}), vec![], 7, dec!(1));
        assert_eq!(out.methodology, "test");
        assert_eq!(out.assumptions["a"], 1);
        assert_eq!(out.metadata.computation_time_us, 7);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
