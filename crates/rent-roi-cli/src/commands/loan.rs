use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rent_roi_core::amortization;
use rent_roi_core::financing::{self, LoanInput};

use crate::input;

/// Arguments shared by the loan payment and amortization commands
#[derive(Args)]
pub struct LoanArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long, default_value = "7.0")]
    pub rate: Decimal,

    /// Term in years
    #[arg(long, default_value = "30")]
    pub term: u32,

    /// Path to JSON or YAML loan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn loan_input(args: LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_request(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Ok(LoanInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate_percent: args.rate,
        term_years: args.term,
    })
}

pub fn run_payment(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(args)?;
    let result = financing::summarize_loan(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_amortize(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(args)?;
    let result = amortization::amortize_loan(&loan)?;
    Ok(serde_json::to_value(result)?)
}
