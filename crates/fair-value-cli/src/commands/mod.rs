pub mod growth;
pub mod valuation;
