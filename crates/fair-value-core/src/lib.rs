pub mod config;
pub mod error;
pub mod financials;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

pub use config::{CostOfEquityMethod, TerminalMethod, ValuationAssumptions};
pub use error::FairValueError;
pub use financials::CompanyFinancials;
pub use types::*;

/// Standard result type for all fair-value operations
pub type FairValueResult<T> = Result<T, FairValueError>;
