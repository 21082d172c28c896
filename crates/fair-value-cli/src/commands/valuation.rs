use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fair_value_core::valuation::{dcf, wacc};
use fair_value_core::{CompanyFinancials, ValuationAssumptions};

use crate::input;

/// Company data and assumption overrides shared by every command
#[derive(Args, Debug, Default)]
#[command(allow_hyphen_values = true)]
pub struct CompanyArgs {
    /// Path to company data (`field:value` text, .json or .yaml)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a YAML or JSON file of valuation assumptions
    #[arg(long)]
    pub assumptions: Option<String>,

    /// Risk-free rate (e.g. 0.04181 for the 5-year treasury)
    #[arg(long)]
    pub risk_free_rate: Option<Decimal>,

    /// Expected market return (e.g. 0.0796)
    #[arg(long)]
    pub market_rate: Option<Decimal>,

    /// Terminal (perpetuity) growth rate
    #[arg(long)]
    pub terminal_growth: Option<Decimal>,

    /// Margin of safety applied to fair value (e.g. 0.30)
    #[arg(long)]
    pub margin_of_safety: Option<Decimal>,

    /// Projection years
    #[arg(long)]
    pub years: Option<u32>,

    /// Reporting unit of the company figures (1000 = thousands)
    #[arg(long)]
    pub unit_scale: Option<u32>,
}

/// Arguments for a full fair value estimate
#[derive(Args, Debug)]
pub struct ValueArgs {
    #[command(flatten)]
    pub company: CompanyArgs,

    /// Override the FCF growth rate (0 to 1) instead of the historical average
    #[arg(long)]
    pub growth_rate: Option<Decimal>,
}

pub fn run_value(args: ValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut company = load_company(&args.company)?;
    if let Some(g) = args.growth_rate {
        company.avg_fcf_growth_rate = Some(g);
    }
    let assumptions = load_assumptions(&args.company)?;

    let result = dcf::value_company(&company, &assumptions)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_wacc(args: CompanyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let company = load_company(&args)?;
    let assumptions = load_assumptions(&args)?;

    let result = wacc::calculate_wacc(&company, &assumptions)?;
    Ok(serde_json::to_value(result)?)
}

pub(crate) fn load_company(args: &CompanyArgs) -> Result<CompanyFinancials, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::file::read_company(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input is required (or pipe company JSON on stdin)".into())
    }
}

pub(crate) fn load_assumptions(
    args: &CompanyArgs,
) -> Result<ValuationAssumptions, Box<dyn std::error::Error>> {
    let base = match args.assumptions {
        Some(ref path) => input::file::read_assumptions(path)?,
        None => ValuationAssumptions::default(),
    };
    let assumptions = apply_overrides(base, args);
    assumptions.validate()?;
    Ok(assumptions)
}

fn apply_overrides(mut assumptions: ValuationAssumptions, args: &CompanyArgs) -> ValuationAssumptions {
    if let Some(r) = args.risk_free_rate {
        assumptions.risk_free_rate = r;
    }
    if let Some(r) = args.market_rate {
        assumptions.market_rate = r;
    }
    if let Some(g) = args.terminal_growth {
        assumptions.terminal_growth_rate = g;
    }
    if let Some(m) = args.margin_of_safety {
        assumptions.margin_of_safety = m;
    }
    if let Some(n) = args.years {
        assumptions.investment_duration_years = n;
    }
    if let Some(s) = args.unit_scale {
        assumptions.unit_scale = s;
    }
    assumptions
}
