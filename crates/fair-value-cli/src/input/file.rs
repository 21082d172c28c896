use std::fs;
use std::path::{Path, PathBuf};

use fair_value_core::{CompanyFinancials, ValuationAssumptions};
use tracing::debug;

/// Input encodings recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Text,
}

fn format_of(path: &Path) -> Format {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => Format::Json,
        Some("yaml") | Some("yml") => Format::Yaml,
        _ => Format::Text,
    }
}

/// Read a company record: JSON or YAML by extension, otherwise the
/// `field:value` company data format.
pub fn read_company(path: &str) -> Result<CompanyFinancials, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_contents(&canonical)?;
    let company: CompanyFinancials = match format_of(&canonical) {
        Format::Json => serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        Format::Yaml => serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        Format::Text => contents
            .parse()
            .map_err(|e| format!("Failed to load '{}': {}", canonical.display(), e))?,
    };
    debug!(path = %canonical.display(), periods = company.free_cash_flows.len(), "loaded company");
    Ok(company)
}

/// Read valuation assumptions from a YAML or JSON file.
pub fn read_assumptions(path: &str) -> Result<ValuationAssumptions, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = read_contents(&canonical)?;
    let assumptions: ValuationAssumptions = match format_of(&canonical) {
        Format::Json => serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        Format::Yaml | Format::Text => serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
    };
    debug!(path = %canonical.display(), "loaded assumptions");
    Ok(assumptions)
}

fn read_contents(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?)
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn write_temp(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!("fairval-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_read_company_text() {
        let path = write_temp(
            "company.txt",
            "market_cap:1,000\noutstanding_shares:100\nbeta:1.2\npretax_income:50\n\
             income_tax:10\ntotal_debt:200\ninterest_ex:8\nfree_cash_flows:30\t20\n\
             avg_fcf_growth_rate:\n",
        );
        let company = read_company(&path).unwrap();
        assert_eq!(company.market_cap, 1_000);
        assert_eq!(company.free_cash_flows, vec![30, 20]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_company_json() {
        let path = write_temp(
            "company.json",
            r#"{"market_cap": 1000, "outstanding_shares": 100, "beta": "1.2",
                "pretax_income": 50, "income_tax": 10, "total_debt": 200,
                "interest_expense": 8, "free_cash_flows": [30, 20],
                "avg_fcf_growth_rate": "0.05"}"#,
        );
        let company = read_company(&path).unwrap();
        assert_eq!(company.avg_fcf_growth_rate, Some(dec!(0.05)));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_read_assumptions_yaml() {
        let path = write_temp(
            "assumptions.yaml",
            "investment_duration_years: 10\nmargin_of_safety: \"0.25\"\nterminal_method: perpetuity_growth\n",
        );
        let assumptions = read_assumptions(&path).unwrap();
        assert_eq!(assumptions.investment_duration_years, 10);
        assert_eq!(assumptions.margin_of_safety, dec!(0.25));
        assert_eq!(assumptions.risk_free_rate, dec!(0.04181));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = read_company("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
