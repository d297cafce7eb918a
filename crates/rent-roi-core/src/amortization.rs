use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RentRoiError;
use crate::financing::{
    monthly_payment, monthly_rate, total_months, validate_loan, LoanInput, MAX_LOAN_TERM_YEARS,
    MONTHS_PER_YEAR,
};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::RentRoiResult;

/// One loan year of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    /// 1-based loan year
    pub year: u32,
    /// Total paid during the year (principal + interest)
    pub payments: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    /// Balance outstanding after the year's last payment
    pub ending_balance: Money,
}

/// Yearly amortization schedule for a fixed-rate loan.
///
/// Payments follow `monthly_payment`; the final instalment retires whatever
/// balance remains so the schedule always closes at exactly zero.
pub fn amortization_schedule(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> RentRoiResult<Vec<AmortizationYear>> {
    if principal <= Decimal::ZERO {
        return Ok(Vec::new());
    }

    let n = total_months(term_years)?;
    let payment = monthly_payment(principal, annual_rate_percent, term_years)?;
    let r = monthly_rate(annual_rate_percent);

    // Every running total below is bounded by the lifetime payments
    payment
        .checked_mul(Decimal::from(n))
        .ok_or_else(|| RentRoiError::overflow("total scheduled payments"))?;

    let mut schedule = Vec::with_capacity(term_years.min(MAX_LOAN_TERM_YEARS) as usize);
    let mut balance = principal;
    let mut year = AmortizationYear {
        year: 1,
        payments: Decimal::ZERO,
        principal_paid: Decimal::ZERO,
        interest_paid: Decimal::ZERO,
        ending_balance: principal,
    };

    for month in 1..=n {
        let interest = balance * r;
        let principal_part = if month == n {
            balance
        } else {
            (payment - interest).min(balance)
        };

        balance -= principal_part;
        year.interest_paid += interest;
        year.principal_paid += principal_part;
        year.payments += principal_part + interest;
        year.ending_balance = balance;

        if month % MONTHS_PER_YEAR == 0 {
            let next = year.year + 1;
            schedule.push(year);
            year = AmortizationYear {
                year: next,
                payments: Decimal::ZERO,
                principal_paid: Decimal::ZERO,
                interest_paid: Decimal::ZERO,
                ending_balance: balance,
            };
        }
    }

    log::trace!(
        "amortized {principal} over {term_years}y at {annual_rate_percent}%: {} rows",
        schedule.len()
    );

    Ok(schedule)
}

/// Validate a loan and produce its yearly schedule in the output envelope.
pub fn amortize_loan(input: &LoanInput) -> RentRoiResult<ComputationOutput<Vec<AmortizationYear>>> {
    let start = Instant::now();

    validate_loan(input)?;

    let schedule = amortization_schedule(
        input.principal,
        input.annual_rate_percent,
        input.term_years,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Fixed-Rate Loan Amortization Schedule (Yearly)",
        input,
        Vec::new(),
        elapsed,
        schedule,
    ))
}
