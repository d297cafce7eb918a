use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rent_roi_core::cash_flow::InvestmentAssumptions;
use rent_roi_core::property::{PropertyInput, RentEstimate};
use rent_roi_core::report::{self, RentRoiRequest};

use crate::input;

/// Arguments for rent and investment analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AnalyzeArgs {
    /// Path to JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Estimated monthly rent from the rent model
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Lower end of the rent confidence band (default: rent - 10%)
    #[arg(long)]
    pub confidence_lower: Option<Decimal>,

    /// Upper end of the rent confidence band (default: rent + 10%)
    #[arg(long)]
    pub confidence_upper: Option<Decimal>,

    /// Purchase price; omit for rent-only output
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Down payment, percent of price (default 20)
    #[arg(long)]
    pub down_payment_percent: Option<Decimal>,

    /// Annual mortgage rate in percent (default 7.0)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Loan term in years (default 30)
    #[arg(long)]
    pub loan_term_years: Option<u32>,

    /// Annual property tax, percent of price (default 1.25)
    #[arg(long)]
    pub property_tax_rate: Option<Decimal>,

    /// Monthly insurance premium
    #[arg(long, alias = "insurance")]
    pub insurance_monthly: Option<Decimal>,

    /// Monthly utilities paid by the owner
    #[arg(long, alias = "utilities")]
    pub utilities_monthly: Option<Decimal>,

    /// Maintenance reserve, percent of monthly rent
    #[arg(long)]
    pub maintenance_percent: Option<Decimal>,

    /// Property management fee, percent of monthly rent
    #[arg(long, alias = "management-percent")]
    pub property_management_percent: Option<Decimal>,

    /// Vacancy allowance, percent of monthly rent
    #[arg(long)]
    pub vacancy_rate: Option<Decimal>,

    /// Bedrooms (property validation needs all five feature flags)
    #[arg(long)]
    pub beds: Option<u32>,

    /// Bathrooms in 0.5 increments
    #[arg(long)]
    pub baths: Option<Decimal>,

    /// Interior square footage
    #[arg(long)]
    pub footage: Option<u32>,

    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<Decimal>,

    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<Decimal>,

    /// Street address, carried through for display
    #[arg(long)]
    pub address: Option<String>,

    /// Attach the yearly amortization schedule
    #[arg(long)]
    pub amortization: bool,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RentRoiRequest = if let Some(ref path) = args.input {
        input::file::read_request(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        request_from_flags(args)?
    };
    let result = report::evaluate(&request)?;
    Ok(serde_json::to_value(result)?)
}

fn request_from_flags(args: AnalyzeArgs) -> Result<RentRoiRequest, Box<dyn std::error::Error>> {
    let monthly_rent = args
        .rent
        .ok_or("--rent is required (or provide --input)")?;

    let property = property_from_flags(&args)?;

    let assumptions = InvestmentAssumptions {
        purchase_price: None,
        down_payment_percent: args.down_payment_percent,
        interest_rate: args.interest_rate,
        loan_term_years: args.loan_term_years,
        property_tax_rate: args.property_tax_rate,
        insurance_monthly: args.insurance_monthly,
        utilities_monthly: args.utilities_monthly,
        maintenance_percent: args.maintenance_percent,
        property_management_percent: args.property_management_percent,
        vacancy_rate: args.vacancy_rate,
    };

    Ok(RentRoiRequest {
        property,
        rent_estimate: RentEstimate {
            monthly_rent,
            confidence_lower: args.confidence_lower,
            confidence_upper: args.confidence_upper,
        },
        purchase_price: args.purchase_price,
        assumptions: Some(assumptions),
        bounds: None,
        include_amortization: args.amortization,
    })
}

fn property_from_flags(
    args: &AnalyzeArgs,
) -> Result<Option<PropertyInput>, Box<dyn std::error::Error>> {
    match (
        args.beds,
        args.baths,
        args.footage,
        args.latitude,
        args.longitude,
    ) {
        (None, None, None, None, None) => Ok(None),
        (Some(beds), Some(baths), Some(footage_sq_ft), Some(latitude), Some(longitude)) => {
            Ok(Some(PropertyInput {
                beds,
                baths,
                footage_sq_ft,
                latitude,
                longitude,
                address: args.address.clone(),
            }))
        }
        _ => Err(
            "--beds, --baths, --footage, --latitude and --longitude must be given together".into(),
        ),
    }
}
