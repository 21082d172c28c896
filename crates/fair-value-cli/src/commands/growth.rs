use serde_json::Value;

use fair_value_core::valuation::growth;

use super::valuation::{load_assumptions, load_company, CompanyArgs};

pub fn run_growth(args: CompanyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let company = load_company(&args)?;
    let assumptions = load_assumptions(&args)?;

    let result = growth::calculate_growth_statistics(&company, &assumptions)?;
    Ok(serde_json::to_value(result)?)
}
