use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RentRoiError;
use crate::financing::{monthly_payment, MAX_INTEREST_RATE, MAX_LOAN_TERM_YEARS};
use crate::property::RentEstimate;
use crate::types::{Money, Percent, Years};
use crate::RentRoiResult;

pub const DEFAULT_DOWN_PAYMENT_PERCENT: Percent = dec!(20);
pub const DEFAULT_INTEREST_RATE: Percent = dec!(7.0);
pub const DEFAULT_LOAN_TERM_YEARS: u32 = 30;
pub const DEFAULT_PROPERTY_TAX_RATE: Percent = dec!(1.25);

/// Largest purchase price accepted by validation.
pub const MAX_PURCHASE_PRICE: Money = dec!(1000000000000);

/// Gross yield at or above which a property is classed excellent.
pub const EXCELLENT_YIELD_THRESHOLD: Percent = dec!(8);
/// Gross yield at or above which a property is classed good.
pub const GOOD_YIELD_THRESHOLD: Percent = dec!(5);

const MONTHS: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Financing and operating assumptions for an acquisition.
///
/// Every field is optional: `None` takes the documented default while an
/// explicit zero is honoured as zero. All percentages are whole numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentAssumptions {
    /// Acquisition price; absence disables investment analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<Money>,
    /// Default 20
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_payment_percent: Option<Percent>,
    /// Annual mortgage rate, default 7.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Percent>,
    /// Default 30
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_term_years: Option<u32>,
    /// Annual percent of purchase price, default 1.25
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_tax_rate: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_monthly: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilities_monthly: Option<Money>,
    /// Percent of monthly rent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_percent: Option<Percent>,
    /// Percent of monthly rent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_management_percent: Option<Percent>,
    /// Percent of monthly rent lost to vacancy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacancy_rate: Option<Percent>,
}

/// Assumptions after defaults have been applied field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAssumptions {
    pub down_payment_percent: Percent,
    pub interest_rate: Percent,
    pub loan_term_years: u32,
    pub property_tax_rate: Percent,
    pub insurance_monthly: Money,
    pub utilities_monthly: Money,
    pub maintenance_percent: Percent,
    pub property_management_percent: Percent,
    pub vacancy_rate: Percent,
}

impl InvestmentAssumptions {
    pub fn resolve(&self) -> ResolvedAssumptions {
        ResolvedAssumptions {
            down_payment_percent: self
                .down_payment_percent
                .unwrap_or(DEFAULT_DOWN_PAYMENT_PERCENT),
            interest_rate: self.interest_rate.unwrap_or(DEFAULT_INTEREST_RATE),
            loan_term_years: self.loan_term_years.unwrap_or(DEFAULT_LOAN_TERM_YEARS),
            property_tax_rate: self.property_tax_rate.unwrap_or(DEFAULT_PROPERTY_TAX_RATE),
            insurance_monthly: self.insurance_monthly.unwrap_or(Decimal::ZERO),
            utilities_monthly: self.utilities_monthly.unwrap_or(Decimal::ZERO),
            maintenance_percent: self.maintenance_percent.unwrap_or(Decimal::ZERO),
            property_management_percent: self
                .property_management_percent
                .unwrap_or(Decimal::ZERO),
            vacancy_rate: self.vacancy_rate.unwrap_or(Decimal::ZERO),
        }
    }
}

impl Default for ResolvedAssumptions {
    fn default() -> Self {
        InvestmentAssumptions::default().resolve()
    }
}

/// Gross-yield band shown next to the cash-flow verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YieldClass {
    /// Gross yield of 8% or more
    Excellent,
    /// Gross yield in [5%, 8%)
    Good,
    /// Gross yield below 5%
    Poor,
}

impl YieldClass {
    pub fn from_gross_yield(gross_yield: Percent) -> Self {
        if gross_yield >= EXCELLENT_YIELD_THRESHOLD {
            YieldClass::Excellent
        } else if gross_yield >= GOOD_YIELD_THRESHOLD {
            YieldClass::Good
        } else {
            YieldClass::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            YieldClass::Excellent => "excellent",
            YieldClass::Good => "good",
            YieldClass::Poor => "poor",
        }
    }

    /// One-line interpretation for renderers.
    pub fn interpretation(&self) -> &'static str {
        match self {
            YieldClass::Excellent => "Strong rental yield potential",
            YieldClass::Good => "Decent rental yield for the market",
            YieldClass::Poor => "Low yield; consider negotiating price or other properties",
        }
    }
}

impl fmt::Display for YieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full monthly/annual cash-flow statement for a rental acquisition.
///
/// All values keep full decimal precision; round only when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowResult {
    pub purchase_price: Money,
    pub monthly_rent: Money,
    pub annual_rent: Money,

    // Financing
    pub down_payment: Money,
    pub loan_amount: Money,
    pub monthly_mortgage: Money,

    // Fixed monthly costs
    pub property_tax: Money,
    pub insurance: Money,
    pub utilities: Money,

    // Rent-proportional costs
    pub maintenance: Money,
    pub property_management: Money,
    pub vacancy_loss: Money,

    pub total_monthly_expenses: Money,
    pub net_monthly_cash_flow: Money,
    pub annual_cash_flow: Money,

    /// Annual cash flow / down payment, as a percent; 0 with no down payment
    pub cash_on_cash_return: Percent,
    /// Annual rent / purchase price, as a percent
    pub gross_rental_yield: Percent,
    /// Years of gross rent needed to recover the purchase price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payback_period_years: Option<Years>,

    /// Strictly positive net monthly cash flow
    pub is_good_investment: bool,
    pub yield_class: YieldClass,

    pub assumptions: ResolvedAssumptions,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the cash-flow statement for buying a property to rent out.
///
/// The explicit `purchase_price` wins over `assumptions.purchase_price`.
/// Returns `Ok(None)` when no positive purchase price is available (rent-only
/// mode). Ranges are not re-validated here; see [`validate_assumptions`].
/// Out-of-range inputs that would overflow a `Decimal` return
/// [`RentRoiError::Overflow`].
pub fn analyze(
    rent_estimate: &RentEstimate,
    purchase_price: Option<Money>,
    assumptions: Option<&InvestmentAssumptions>,
) -> RentRoiResult<Option<CashFlowResult>> {
    let price = match purchase_price.or_else(|| assumptions.and_then(|a| a.purchase_price)) {
        Some(p) if p > Decimal::ZERO => p,
        _ => return Ok(None),
    };

    let a = assumptions.map(InvestmentAssumptions::resolve).unwrap_or_default();
    let rent = rent_estimate.monthly_rent;

    // --- Financing ---
    let down_payment = percent_of(price, a.down_payment_percent, "down payment")?;
    let loan_amount = price
        .checked_sub(down_payment)
        .ok_or_else(|| RentRoiError::overflow("loan amount"))?
        .max(Decimal::ZERO);
    let monthly_mortgage = monthly_payment(loan_amount, a.interest_rate, a.loan_term_years)?;

    // --- Fixed monthly costs ---
    let property_tax = percent_of(price, a.property_tax_rate, "property tax")? / MONTHS;
    let insurance = a.insurance_monthly;
    let utilities = a.utilities_monthly;

    // --- Rent-proportional costs ---
    let maintenance = percent_of(rent, a.maintenance_percent, "maintenance")?;
    let property_management =
        percent_of(rent, a.property_management_percent, "property management")?;
    let vacancy_loss = percent_of(rent, a.vacancy_rate, "vacancy loss")?;

    let total_monthly_expenses = [
        monthly_mortgage,
        property_tax,
        insurance,
        utilities,
        maintenance,
        property_management,
        vacancy_loss,
    ]
    .into_iter()
    .try_fold(Decimal::ZERO, |total, line| total.checked_add(line))
    .ok_or_else(|| RentRoiError::overflow("total monthly expenses"))?;

    let net_monthly_cash_flow = rent
        .checked_sub(total_monthly_expenses)
        .ok_or_else(|| RentRoiError::overflow("net monthly cash flow"))?;
    let annual_cash_flow = net_monthly_cash_flow
        .checked_mul(MONTHS)
        .ok_or_else(|| RentRoiError::overflow("annual cash flow"))?;

    let cash_on_cash_return = if down_payment > Decimal::ZERO {
        annual_cash_flow
            .checked_div(down_payment)
            .and_then(|ratio| ratio.checked_mul(HUNDRED))
            .ok_or_else(|| RentRoiError::overflow("cash-on-cash return"))?
    } else {
        Decimal::ZERO
    };

    let annual_rent = rent
        .checked_mul(MONTHS)
        .ok_or_else(|| RentRoiError::overflow("annual rent"))?;
    let gross_rental_yield = gross_rental_yield(rent, price)?;
    let payback_period_years = payback_period(rent, price)?;

    log::debug!(
        "analyzed price={price} rent={rent}: net={net_monthly_cash_flow} gross_yield={gross_rental_yield}%"
    );

    Ok(Some(CashFlowResult {
        purchase_price: price,
        monthly_rent: rent,
        annual_rent,
        down_payment,
        loan_amount,
        monthly_mortgage,
        property_tax,
        insurance,
        utilities,
        maintenance,
        property_management,
        vacancy_loss,
        total_monthly_expenses,
        net_monthly_cash_flow,
        annual_cash_flow,
        cash_on_cash_return,
        gross_rental_yield,
        payback_period_years,
        is_good_investment: net_monthly_cash_flow > Decimal::ZERO,
        yield_class: YieldClass::from_gross_yield(gross_rental_yield),
        assumptions: a,
    }))
}

/// Annual rent as a percentage of purchase price, ignoring financing.
pub fn gross_rental_yield(monthly_rent: Money, purchase_price: Money) -> RentRoiResult<Percent> {
    if purchase_price <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    monthly_rent
        .checked_mul(MONTHS)
        .and_then(|annual| annual.checked_div(purchase_price))
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or_else(|| RentRoiError::overflow("gross rental yield"))
}

/// Years of gross rent needed to equal the purchase price.
///
/// `None` when there is no rent to pay the price back with.
pub fn payback_period(monthly_rent: Money, purchase_price: Money) -> RentRoiResult<Option<Years>> {
    let annual_rent = monthly_rent
        .checked_mul(MONTHS)
        .ok_or_else(|| RentRoiError::overflow("annual rent"))?;
    if annual_rent <= Decimal::ZERO {
        return Ok(None);
    }
    purchase_price
        .checked_div(annual_rent)
        .map(Some)
        .ok_or_else(|| RentRoiError::overflow("payback period"))
}

/// `amount * percent / 100`.
fn percent_of(amount: Decimal, percent: Percent, context: &str) -> RentRoiResult<Decimal> {
    amount
        .checked_mul(percent / HUNDRED)
        .ok_or_else(|| RentRoiError::overflow(context))
}

/// Round a currency amount for display (2 dp, half away from zero).
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage for display (2 dp, half away from zero).
pub fn round_percent(pct: Percent) -> Percent {
    pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Caller-side range checks for assumptions.
pub fn validate_assumptions(assumptions: &InvestmentAssumptions) -> RentRoiResult<()> {
    if let Some(price) = assumptions.purchase_price {
        if price <= Decimal::ZERO {
            return Err(RentRoiError::InvalidInput {
                field: "purchase_price".into(),
                reason: "Purchase price must be positive".into(),
            });
        }
        if price > MAX_PURCHASE_PRICE {
            return Err(RentRoiError::InvalidInput {
                field: "purchase_price".into(),
                reason: format!("Purchase price must not exceed {MAX_PURCHASE_PRICE}"),
            });
        }
    }

    if let Some(dp) = assumptions.down_payment_percent {
        if dp < Decimal::ZERO || dp > HUNDRED {
            return Err(RentRoiError::InvalidInput {
                field: "down_payment_percent".into(),
                reason: "Down payment must be between 0 and 100 percent".into(),
            });
        }
    }

    if let Some(term) = assumptions.loan_term_years {
        if term == 0 || term > MAX_LOAN_TERM_YEARS {
            return Err(RentRoiError::InvalidInput {
                field: "loan_term_years".into(),
                reason: format!("Loan term must be between 1 and {MAX_LOAN_TERM_YEARS} years"),
            });
        }
    }

    if assumptions
        .interest_rate
        .is_some_and(|rate| rate > MAX_INTEREST_RATE)
    {
        return Err(RentRoiError::InvalidInput {
            field: "interest_rate".into(),
            reason: format!("Interest rate must not exceed {MAX_INTEREST_RATE}%"),
        });
    }

    let non_negative = [
        ("interest_rate", assumptions.interest_rate),
        ("property_tax_rate", assumptions.property_tax_rate),
        ("insurance_monthly", assumptions.insurance_monthly),
        ("utilities_monthly", assumptions.utilities_monthly),
        ("maintenance_percent", assumptions.maintenance_percent),
        (
            "property_management_percent",
            assumptions.property_management_percent,
        ),
        ("vacancy_rate", assumptions.vacancy_rate),
    ];

    for (field, value) in non_negative {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(RentRoiError::InvalidInput {
                field: field.into(),
                reason: "Must be non-negative".into(),
            });
        }
    }

    Ok(())
}
