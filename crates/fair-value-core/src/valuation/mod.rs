use serde::Serialize;

use crate::config::ValuationAssumptions;
use crate::financials::CompanyFinancials;

pub mod dcf;
pub mod engine;
pub mod growth;
pub mod projection;
pub mod rates;
pub mod terminal;
pub mod wacc;

pub use engine::ValuationEngine;

/// Echoed into the output envelope's `assumptions` slot.
#[derive(Serialize)]
pub(crate) struct ValuationInputs<'a> {
    pub company: &'a CompanyFinancials,
    pub assumptions: &'a ValuationAssumptions,
}
