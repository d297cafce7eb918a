use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentRoiError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RentRoiResult;

pub(crate) const MONTHS_PER_YEAR: u32 = 12;

/// Longest loan term accepted by validation.
pub const MAX_LOAN_TERM_YEARS: u32 = 50;
/// Highest annual rate (percent) accepted by validation.
pub const MAX_INTEREST_RATE: Percent = dec!(100);

/// A fixed-rate, fully amortizing loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    /// Annual rate as a whole-number percent (7.0 = 7%)
    pub annual_rate_percent: Percent,
    pub term_years: u32,
}

/// Payment totals for a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub monthly_payment: Money,
    pub number_of_payments: u32,
    pub total_payments: Money,
    pub total_interest: Money,
}

/// Convert an annual percentage rate (7.0 = 7%) to a monthly decimal rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Decimal {
    annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// Total number of monthly payments for a term in years.
pub fn total_months(term_years: u32) -> RentRoiResult<u32> {
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| RentRoiError::overflow(format!("{term_years}-year term in months")))
}

/// Fixed monthly payment for a fully amortizing loan.
///
/// `annual_rate_percent` is a whole-number percentage. A non-positive
/// principal yields a zero payment and a zero rate falls back to
/// straight-line repayment. The compounding factor `(1 + r)^n` is computed
/// in closed form.
///
/// The caller validates ranges. Failures are arithmetic safety only: a zero
/// term reaching the division, or a result too large for a `Decimal`.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> RentRoiResult<Money> {
    if principal <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let n = total_months(term_years)?;
    if n == 0 {
        return Err(RentRoiError::DivisionByZero {
            context: "monthly payment with zero-year term".into(),
        });
    }

    if annual_rate_percent.is_zero() {
        // Interest-free: straight-line amortisation
        return Ok(principal / Decimal::from(n));
    }

    let r = monthly_rate(annual_rate_percent);
    let compound = compound_factor(r, n)?;
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(RentRoiError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    // (1+r)^n / ((1+r)^n - 1) stays near 1, so reduce it before scaling
    let annuity = compound
        .checked_div(denominator)
        .ok_or_else(|| RentRoiError::overflow("annuity factor"))?;

    principal
        .checked_mul(r)
        .and_then(|interest| interest.checked_mul(annuity))
        .ok_or_else(|| RentRoiError::overflow("monthly payment"))
}

/// Total interest paid over the life of the loan.
pub fn total_interest(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> RentRoiResult<Money> {
    if principal <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let n = total_months(term_years)?;
    let payment = monthly_payment(principal, annual_rate_percent, term_years)?;
    let total_payments = payment
        .checked_mul(Decimal::from(n))
        .ok_or_else(|| RentRoiError::overflow("total loan payments"))?;
    Ok(total_payments - principal)
}

/// Outstanding balance after `months_elapsed` scheduled payments.
///
/// Uses the closed form `B_k = P(1+r)^k - PMT((1+r)^k - 1)/r`. Once the term
/// is exhausted the balance is zero.
pub fn remaining_balance(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
    months_elapsed: u32,
) -> RentRoiResult<Money> {
    if principal <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let n = total_months(term_years)?;
    if months_elapsed >= n {
        return Ok(Decimal::ZERO);
    }

    let payment = monthly_payment(principal, annual_rate_percent, term_years)?;

    if annual_rate_percent.is_zero() {
        return Ok(principal - payment * Decimal::from(months_elapsed));
    }

    let r = monthly_rate(annual_rate_percent);
    let growth = compound_factor(r, months_elapsed)?;
    let accrued = principal.checked_mul(growth);
    let repaid = (growth - Decimal::ONE)
        .checked_div(r)
        .and_then(|factor| payment.checked_mul(factor));

    match (accrued, repaid) {
        (Some(accrued), Some(repaid)) => Ok((accrued - repaid).max(Decimal::ZERO)),
        _ => Err(RentRoiError::overflow("remaining balance")),
    }
}

/// Validate a loan and compute its payment and lifetime totals.
pub fn summarize_loan(input: &LoanInput) -> RentRoiResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan(input)?;

    if input.annual_rate_percent > dec!(20) {
        warnings.push(format!(
            "Interest rate {}% exceeds 20%, outside the usual mortgage range",
            input.annual_rate_percent
        ));
    }

    let payment = monthly_payment(input.principal, input.annual_rate_percent, input.term_years)?;
    let n = total_months(input.term_years)?;
    let total_payments = payment
        .checked_mul(Decimal::from(n))
        .ok_or_else(|| RentRoiError::overflow("total loan payments"))?;

    let summary = LoanSummary {
        monthly_payment: payment,
        number_of_payments: n,
        total_payments,
        total_interest: (total_payments - input.principal).max(Decimal::ZERO),
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fixed-Rate Loan Amortization (Closed Form)",
        input,
        warnings,
        elapsed,
        summary,
    ))
}

pub(crate) fn validate_loan(input: &LoanInput) -> RentRoiResult<()> {
    if input.principal < Decimal::ZERO {
        return Err(RentRoiError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be non-negative".into(),
        });
    }
    if input.annual_rate_percent < Decimal::ZERO {
        return Err(RentRoiError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Interest rate must be non-negative".into(),
        });
    }
    if input.annual_rate_percent > MAX_INTEREST_RATE {
        return Err(RentRoiError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: format!("Interest rate must not exceed {MAX_INTEREST_RATE}%"),
        });
    }
    if input.term_years == 0 || input.term_years > MAX_LOAN_TERM_YEARS {
        return Err(RentRoiError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Loan term must be between 1 and {MAX_LOAN_TERM_YEARS} years"),
        });
    }
    Ok(())
}

/// `(1 + r)^n` via exponentiation, never by stepping through periods.
pub(crate) fn compound_factor(r: Decimal, n: u32) -> RentRoiResult<Decimal> {
    (Decimal::ONE + r)
        .checked_powu(u64::from(n))
        .ok_or_else(|| RentRoiError::overflow(format!("compounding factor (1 + {r})^{n}")))
}
