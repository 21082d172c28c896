use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FairValueError;
use crate::types::{Money, Rate};
use crate::FairValueResult;

/// Keys a company data file must define, in the order they are usually written.
pub const REQUIRED_FIELDS: [&str; 9] = [
    "market_cap",
    "outstanding_shares",
    "pretax_income",
    "income_tax",
    "total_debt",
    "interest_ex",
    "beta",
    "free_cash_flows",
    "avg_fcf_growth_rate",
];

/// Reported financials of a single company.
///
/// Monetary fields are integral amounts in the reporting unit of the source
/// (usually thousands of dollars). The record is never mutated by the
/// valuation pipeline; every stage borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Equity market capitalisation
    pub market_cap: i64,
    /// Shares outstanding, in the same unit as the monetary fields
    pub outstanding_shares: u64,
    /// Levered equity beta
    pub beta: Decimal,
    pub pretax_income: i64,
    /// Income tax expense; non-positive means an effective rate of 0%
    pub income_tax: i64,
    /// Total debt, used for both the debt weight and the cost of debt
    pub total_debt: i64,
    /// Interest expense; non-positive means a cost of debt of 0%
    #[serde(alias = "interest_ex")]
    pub interest_expense: i64,
    /// Free cash flow history, newest first
    pub free_cash_flows: Vec<i64>,
    /// Optional override for the projected FCF growth rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_fcf_growth_rate: Option<Rate>,
}

impl CompanyFinancials {
    /// Share price implied by the market capitalisation.
    pub fn market_price(&self) -> Option<Money> {
        if self.outstanding_shares == 0 {
            return None;
        }
        Some(Decimal::from(self.market_cap) / Decimal::from(self.outstanding_shares))
    }

    /// Most recent reported free cash flow.
    pub fn latest_fcf(&self) -> Option<i64> {
        self.free_cash_flows.first().copied()
    }
}

/// Parses the `field:value` company data format.
///
/// Integers may carry thousands separators, the cash flow history is
/// whitespace (normally tab) separated, and `avg_fcf_growth_rate` may be left
/// empty.
impl FromStr for CompanyFinancials {
    type Err = FairValueError;

    fn from_str(s: &str) -> FairValueResult<Self> {
        let mut fields: HashMap<&str, &str> = HashMap::new();

        for (idx, raw) in s.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once(':').ok_or_else(|| {
                FairValueError::invalid(
                    "line",
                    format!("line {}: expected `field:value`, got '{line}'", idx + 1),
                )
            })?;
            let key = key.trim();
            if !REQUIRED_FIELDS.contains(&key) {
                debug!(field = key, "ignoring unknown company field");
                continue;
            }
            fields.insert(key, value.trim());
        }

        for field in REQUIRED_FIELDS {
            if !fields.contains_key(field) {
                return Err(FairValueError::invalid(field, "missing field"));
            }
        }

        Ok(CompanyFinancials {
            market_cap: parse_integer("market_cap", fields["market_cap"])?,
            outstanding_shares: parse_count("outstanding_shares", fields["outstanding_shares"])?,
            beta: parse_decimal("beta", fields["beta"])?,
            pretax_income: parse_integer("pretax_income", fields["pretax_income"])?,
            income_tax: parse_integer("income_tax", fields["income_tax"])?,
            total_debt: parse_integer("total_debt", fields["total_debt"])?,
            interest_expense: parse_integer("interest_ex", fields["interest_ex"])?,
            free_cash_flows: parse_integer_list("free_cash_flows", fields["free_cash_flows"])?,
            avg_fcf_growth_rate: parse_optional_rate(
                "avg_fcf_growth_rate",
                fields["avg_fcf_growth_rate"],
            )?,
        })
    }
}

fn strip_separators(value: &str) -> String {
    value.trim().replace(',', "")
}

fn parse_integer(field: &str, value: &str) -> FairValueResult<i64> {
    let cleaned = strip_separators(value);
    cleaned
        .parse::<i64>()
        .map_err(|_| FairValueError::invalid(field, format!("expected an integer, got '{value}'")))
}

fn parse_count(field: &str, value: &str) -> FairValueResult<u64> {
    let cleaned = strip_separators(value);
    cleaned.parse::<u64>().map_err(|_| {
        FairValueError::invalid(field, format!("expected a non-negative integer, got '{value}'"))
    })
}

fn parse_decimal(field: &str, value: &str) -> FairValueResult<Decimal> {
    let cleaned = strip_separators(value);
    Decimal::from_str(&cleaned)
        .map_err(|_| FairValueError::invalid(field, format!("expected a number, got '{value}'")))
}

fn parse_integer_list(field: &str, value: &str) -> FairValueResult<Vec<i64>> {
    let values = value
        .split_whitespace()
        .map(|item| parse_integer(field, item))
        .collect::<FairValueResult<Vec<i64>>>()?;
    if values.is_empty() {
        return Err(FairValueError::invalid(field, "missing value"));
    }
    Ok(values)
}

fn parse_optional_rate(field: &str, value: &str) -> FairValueResult<Option<Rate>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(field, value).map(Some)
}
