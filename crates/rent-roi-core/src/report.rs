use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[cfg(feature = "amortization")]
use crate::amortization::{amortization_schedule, AmortizationYear};
use crate::cash_flow::{
    analyze, validate_assumptions, CashFlowResult, InvestmentAssumptions, YieldClass,
};
use crate::property::{
    validate_property, validate_rent_estimate, MetroBounds, PropertyInput, RentEstimate,
};
use crate::error::RentRoiError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::RentRoiResult;

const TYPICAL_MIN_PRICE: Money = dec!(100000);
const TYPICAL_MAX_PRICE: Money = dec!(10000000);
const HIGH_VACANCY_RATE: Decimal = dec!(15);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One rent-and-ROI evaluation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentRoiRequest {
    /// Property features; validated against `bounds` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyInput>,
    pub rent_estimate: RentEstimate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<InvestmentAssumptions>,
    /// Metro feature ranges; San Francisco when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<MetroBounds>,
    /// Attach the yearly amortization schedule of the loan
    #[serde(default)]
    pub include_amortization: bool,
}

impl RentRoiRequest {
    pub fn new(rent_estimate: RentEstimate) -> Self {
        Self {
            property: None,
            rent_estimate,
            purchase_price: None,
            assumptions: None,
            bounds: None,
            include_amortization: false,
        }
    }
}

/// Rent view available with or without a purchase price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentSummary {
    pub monthly_rent: Money,
    pub annual_rent: Money,
    pub confidence_lower: Money,
    pub confidence_upper: Money,
}

/// Complete evaluation output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentReport {
    pub rent: RentSummary,
    /// Cash-flow statement; absent in rent-only mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment: Option<CashFlowResult>,
    #[cfg(feature = "amortization")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amortization: Option<Vec<AmortizationYear>>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate a request, run the cash-flow analysis and wrap the result with
/// warnings and computation metadata.
pub fn evaluate(request: &RentRoiRequest) -> RentRoiResult<ComputationOutput<InvestmentReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_request(request)?;

    let estimate = &request.rent_estimate;
    let (confidence_lower, confidence_upper) = estimate.confidence_range();
    let rent = RentSummary {
        monthly_rent: estimate.monthly_rent,
        annual_rent: estimate
            .monthly_rent
            .checked_mul(dec!(12))
            .ok_or_else(|| RentRoiError::overflow("annual rent"))?,
        confidence_lower,
        confidence_upper,
    };

    let investment = analyze(estimate, request.purchase_price, request.assumptions.as_ref())?;

    if let Some(cf) = &investment {
        collect_warnings(cf, &mut warnings);
    } else {
        log::debug!("no purchase price supplied, rent-only evaluation");
    }

    #[cfg(feature = "amortization")]
    let amortization = match (&investment, request.include_amortization) {
        (Some(cf), true) if cf.loan_amount > Decimal::ZERO => Some(amortization_schedule(
            cf.loan_amount,
            cf.assumptions.interest_rate,
            cf.assumptions.loan_term_years,
        )?),
        _ => None,
    };

    let report = InvestmentReport {
        rent,
        investment,
        #[cfg(feature = "amortization")]
        amortization,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Rental Cash-Flow Analysis (Fixed-Rate Amortization)",
        request,
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Validation & warnings
// ---------------------------------------------------------------------------

fn validate_request(request: &RentRoiRequest) -> RentRoiResult<()> {
    if let Some(property) = &request.property {
        let default_bounds = MetroBounds::default();
        let bounds = request.bounds.as_ref().unwrap_or(&default_bounds);
        validate_property(property, bounds)?;
    }

    validate_rent_estimate(&request.rent_estimate)?;

    if let Some(assumptions) = &request.assumptions {
        validate_assumptions(assumptions)?;
    }

    if let Some(price) = request.purchase_price {
        validate_assumptions(&InvestmentAssumptions {
            purchase_price: Some(price),
            ..Default::default()
        })?;
    }

    Ok(())
}

fn collect_warnings(cf: &CashFlowResult, warnings: &mut Vec<String>) {
    if cf.purchase_price < TYPICAL_MIN_PRICE || cf.purchase_price > TYPICAL_MAX_PRICE {
        warnings.push(format!(
            "Purchase price {} is not between {TYPICAL_MIN_PRICE} and {TYPICAL_MAX_PRICE}, the typical range",
            cf.purchase_price
        ));
    }

    if cf.assumptions.vacancy_rate > HIGH_VACANCY_RATE {
        warnings.push(format!(
            "Vacancy rate {}% exceeds {HIGH_VACANCY_RATE}%, above typical market norms",
            cf.assumptions.vacancy_rate
        ));
    }

    if cf.down_payment.is_zero() {
        warnings.push("No down payment: cash-on-cash return reported as 0".into());
    }

    let strong_yield = matches!(cf.yield_class, YieldClass::Excellent | YieldClass::Good);
    if strong_yield && !cf.is_good_investment {
        warnings.push(format!(
            "Gross yield is {} ({:.2}%) but net monthly cash flow is not positive",
            cf.yield_class, cf.gross_rental_yield
        ));
    } else if !strong_yield && cf.is_good_investment {
        warnings.push(format!(
            "Net monthly cash flow is positive but gross yield is poor ({:.2}%)",
            cf.gross_rental_yield
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> RentRoiRequest {
        RentRoiRequest {
            property: Some(PropertyInput {
                beds: 2,
                baths: dec!(1),
                footage_sq_ft: 1000,
                latitude: dec!(37.7749),
                longitude: dec!(-122.4194),
                address: None,
            }),
            rent_estimate: RentEstimate::new(dec!(4000)),
            purchase_price: Some(dec!(1200000)),
            assumptions: Some(InvestmentAssumptions {
                insurance_monthly: Some(dec!(200)),
                utilities_monthly: Some(dec!(150)),
                maintenance_percent: Some(dec!(1)),
                property_management_percent: Some(dec!(8)),
                vacancy_rate: Some(dec!(5)),
                ..Default::default()
            }),
            bounds: None,
            include_amortization: false,
        }
    }

    #[test]
    fn test_rent_only_report() {
        let req = RentRoiRequest::new(RentEstimate::new(dec!(3500)));
        let out = evaluate(&req).unwrap();
        assert!(out.result.investment.is_none());
        assert_eq!(out.result.rent.annual_rent, dec!(42000));
        assert_eq!(out.result.rent.confidence_lower, dec!(3150));
        assert_eq!(out.result.rent.confidence_upper, dec!(3850));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_full_report() {
        let out = evaluate(&sample_request()).unwrap();
        let cf = out.result.investment.as_ref().unwrap();
        assert_eq!(cf.yield_class, YieldClass::Poor);
        assert!(!cf.is_good_investment);
        assert_eq!(
            out.methodology,
            "Rental Cash-Flow Analysis (Fixed-Rate Amortization)"
        );
    }

    #[test]
    fn test_invalid_property_rejected() {
        let mut req = sample_request();
        if let Some(p) = req.property.as_mut() {
            p.longitude = dec!(-121.0);
        }
        let err = evaluate(&req).unwrap_err();
        assert!(matches!(err, RentRoiError::InvalidInput { .. }));
    }

    #[test]
    fn test_negative_purchase_price_rejected() {
        let mut req = sample_request();
        req.purchase_price = Some(dec!(-10));
        assert!(evaluate(&req).is_err());
    }

    #[test]
    fn test_disagreement_warning() {
        let mut req = sample_request();
        req.purchase_price = Some(dec!(500000));
        req.assumptions = Some(InvestmentAssumptions {
            down_payment_percent: Some(dec!(5)),
            interest_rate: Some(dec!(12)),
            ..Default::default()
        });
        let out = evaluate(&req).unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("net monthly cash flow is not positive")));
    }

    #[test]
    fn test_zero_down_and_price_warnings() {
        let mut req = sample_request();
        req.purchase_price = Some(dec!(50000));
        req.assumptions = Some(InvestmentAssumptions {
            down_payment_percent: Some(Decimal::ZERO),
            vacancy_rate: Some(dec!(20)),
            ..Default::default()
        });
        let out = evaluate(&req).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("typical")));
        assert!(out.warnings.iter().any(|w| w.contains("Vacancy rate")));
        assert!(out.warnings.iter().any(|w| w.contains("No down payment")));
    }

    #[cfg(feature = "amortization")]
    #[test]
    fn test_amortization_attached_on_request() {
        let mut req = sample_request();
        req.include_amortization = true;
        let out = evaluate(&req).unwrap();
        let schedule = out.result.amortization.as_ref().unwrap();
        assert_eq!(schedule.len(), 30);
        assert_eq!(schedule.last().unwrap().ending_balance, Decimal::ZERO);
    }

    #[cfg(feature = "amortization")]
    #[test]
    fn test_no_amortization_for_all_cash() {
        let mut req = sample_request();
        req.include_amortization = true;
        req.assumptions = Some(InvestmentAssumptions {
            down_payment_percent: Some(dec!(100)),
            ..Default::default()
        });
        let out = evaluate(&req).unwrap();
        assert!(out.result.amortization.is_none());
    }

    #[test]
    fn test_out_of_range_requests_are_rejected() {
        let huge_price = r#"{
            "rent_estimate": { "monthly_rent": 4000 },
            "purchase_price": "10000000000000000000000000000"
        }"#;
        let long_term = r#"{
            "rent_estimate": { "monthly_rent": 4000 },
            "purchase_price": 1200000,
            "assumptions": { "loan_term_years": 400000000 }
        }"#;
        let high_rate = r#"{
            "rent_estimate": { "monthly_rent": 4000 },
            "purchase_price": 1200000,
            "assumptions": { "interest_rate": 200 },
            "include_amortization": true
        }"#;
        let huge_rent = r#"{
            "rent_estimate": { "monthly_rent": "79228162514264337593543950335" }
        }"#;

        for json in [huge_price, long_term, high_rate, huge_rent] {
            let req: RentRoiRequest = serde_json::from_str(json).unwrap();
            let err = evaluate(&req).unwrap_err();
            assert!(
                matches!(err, RentRoiError::InvalidInput { .. }),
                "unexpected {err:?} for {json}"
            );
        }
    }

    #[cfg(feature = "amortization")]
    #[test]
    fn test_ceiling_request_is_evaluated() {
        let mut req = sample_request();
        req.purchase_price = Some(crate::cash_flow::MAX_PURCHASE_PRICE);
        req.include_amortization = true;
        req.assumptions = Some(InvestmentAssumptions {
            interest_rate: Some(crate::financing::MAX_INTEREST_RATE),
            loan_term_years: Some(crate::financing::MAX_LOAN_TERM_YEARS),
            ..Default::default()
        });
        let out = evaluate(&req).unwrap();
        let schedule = out.result.amortization.as_ref().unwrap();
        assert_eq!(schedule.len(), 50);
        assert_eq!(schedule.last().unwrap().ending_balance, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("not between")));
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "rent_estimate": { "monthly_rent": 4000 },
            "purchase_price": 500000,
            "assumptions": { "down_payment_percent": 100, "property_tax_rate": 0, "interest_rate": 0 }
        }"#;
        let req: RentRoiRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.assumptions.as_ref().unwrap().vacancy_rate, None);
        assert_eq!(
            req.assumptions.as_ref().unwrap().property_tax_rate,
            Some(Decimal::ZERO)
        );
        let out = evaluate(&req).unwrap();
        let cf = out.result.investment.unwrap();
        assert_eq!(cf.cash_on_cash_return, dec!(9.6));
        assert_eq!(cf.yield_class, YieldClass::Excellent);
    }
}
