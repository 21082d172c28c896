use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use fair_value_core::valuation::{dcf, growth, wacc};
use fair_value_core::{CompanyFinancials, ValuationAssumptions};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Either `{ "company": {...}, "assumptions": {...} }` or a bare company
/// object, in which case the default assumptions apply.
#[derive(Deserialize)]
#[serde(untagged)]
enum ValuationRequest {
    Wrapped {
        company: CompanyFinancials,
        #[serde(default)]
        assumptions: ValuationAssumptions,
    },
    Bare(CompanyFinancials),
}

impl ValuationRequest {
    fn into_parts(self) -> (CompanyFinancials, ValuationAssumptions) {
        match self {
            ValuationRequest::Wrapped {
                company,
                assumptions,
            } => (company, assumptions),
            ValuationRequest::Bare(company) => (company, ValuationAssumptions::default()),
        }
    }
}

fn parse_request(input_json: &str) -> NapiResult<(CompanyFinancials, ValuationAssumptions)> {
    let request: ValuationRequest = serde_json::from_str(input_json).map_err(to_napi_error)?;
    Ok(request.into_parts())
}

#[napi]
pub fn value_company(input_json: String) -> NapiResult<String> {
    let (company, assumptions) = parse_request(&input_json)?;
    let output = dcf::value_company(&company, &assumptions).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_wacc(input_json: String) -> NapiResult<String> {
    let (company, assumptions) = parse_request(&input_json)?;
    let output = wacc::calculate_wacc(&company, &assumptions).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn growth_statistics(input_json: String) -> NapiResult<String> {
    let (company, assumptions) = parse_request(&input_json)?;
    let output =
        growth::calculate_growth_statistics(&company, &assumptions).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn parse_company_text(text: String) -> NapiResult<String> {
    let company: CompanyFinancials = text.parse().map_err(to_napi_error)?;
    serde_json::to_string(&company).map_err(to_napi_error)
}
