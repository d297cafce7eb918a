use rent_roi_core::financing::{
    monthly_payment, remaining_balance, summarize_loan, total_interest, LoanInput,
    MAX_INTEREST_RATE, MAX_LOAN_TERM_YEARS,
};
use rent_roi_core::RentRoiError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Monthly payment properties
// ===========================================================================

const RATES: [Decimal; 6] = [dec!(0), dec!(0.5), dec!(3.25), dec!(7), dec!(12.5), dec!(20)];
const TERMS: [u32; 4] = [5, 10, 15, 30];

#[test]
fn test_payment_non_negative() {
    for rate in RATES {
        for term in TERMS {
            let pmt = monthly_payment(dec!(250000), rate, term).unwrap();
            assert!(pmt >= Decimal::ZERO, "rate {rate} term {term} gave {pmt}");
        }
    }
}

#[test]
fn test_payment_monotone_in_principal() {
    for rate in RATES {
        for term in TERMS {
            let small = monthly_payment(dec!(100000), rate, term).unwrap();
            let large = monthly_payment(dec!(100001), rate, term).unwrap();
            assert!(large >= small, "rate {rate} term {term}");
        }
    }
}

#[test]
fn test_payment_monotone_in_rate() {
    for term in TERMS {
        let payments: Vec<Decimal> = RATES
            .iter()
            .map(|r| monthly_payment(dec!(400000), *r, term).unwrap())
            .collect();
        for pair in payments.windows(2) {
            assert!(pair[1] >= pair[0], "term {term}: {} then {}", pair[0], pair[1]);
        }
    }
}

#[test]
fn test_zero_principal_always_zero() {
    for rate in RATES {
        for term in TERMS {
            assert_eq!(monthly_payment(Decimal::ZERO, rate, term).unwrap(), Decimal::ZERO);
        }
    }
}

#[test]
fn test_zero_rate_exact_straight_line() {
    for term in TERMS {
        let p = dec!(123456.78);
        let expected = p / Decimal::from(term * 12);
        assert_eq!(monthly_payment(p, Decimal::ZERO, term).unwrap(), expected);
    }
}

#[test]
fn test_payments_recover_principal() {
    for rate in RATES.iter().filter(|r| !r.is_zero()) {
        for term in TERMS {
            let p = dec!(750000);
            let pmt = monthly_payment(p, *rate, term).unwrap();
            assert!(pmt * Decimal::from(term * 12) >= p, "rate {rate} term {term}");
        }
    }
}

#[test]
fn test_known_mortgage_reference() {
    // $300k, 30y, 6.5%: widely quoted payment of $1,896.20
    let pmt = monthly_payment(dec!(300000), dec!(6.5), 30).unwrap();
    assert!((pmt - dec!(1896.20)).abs() < dec!(0.01), "got {pmt}");
}

// ===========================================================================
// Balance & interest
// ===========================================================================

#[test]
fn test_balance_declines_over_time() {
    let mut previous = dec!(500000);
    for month in [12, 60, 120, 240, 348] {
        let balance = remaining_balance(dec!(500000), dec!(6), 30, month).unwrap();
        assert!(balance < previous, "month {month}");
        previous = balance;
    }
}

#[test]
fn test_total_interest_grows_with_rate() {
    let low = total_interest(dec!(500000), dec!(4), 30).unwrap();
    let high = total_interest(dec!(500000), dec!(8), 30).unwrap();
    assert!(high > low);
}

// ===========================================================================
// Range edges
// ===========================================================================

#[test]
fn test_payment_at_validation_ceiling() {
    let pmt = monthly_payment(dec!(1000000), MAX_INTEREST_RATE, MAX_LOAN_TERM_YEARS).unwrap();
    // Interest alone is 1,000,000 * 100% / 12
    assert!(pmt > dec!(83333.33) && pmt < dec!(83334), "got {pmt}");
}

#[test]
fn test_beyond_ceiling_never_panics() {
    let cases: [(Decimal, Decimal, u32); 5] = [
        (dec!(1000000), dec!(7), 400_000_000),
        (dec!(1000000), dec!(200), 30),
        (dec!(1000000), dec!(1000000), 30),
        (Decimal::MAX, dec!(2400), 1),
        (Decimal::MAX, dec!(7), u32::MAX),
    ];
    for (principal, rate, term) in cases {
        for result in [
            monthly_payment(principal, rate, term),
            total_interest(principal, rate, term),
            remaining_balance(principal, rate, term, 12),
        ] {
            assert!(
                matches!(result, Ok(_) | Err(RentRoiError::Overflow { .. })),
                "{principal} @ {rate}% over {term}y gave {result:?}"
            );
        }

        let summary = summarize_loan(&LoanInput {
            principal,
            annual_rate_percent: rate,
            term_years: term,
        });
        assert!(
            matches!(
                summary,
                Ok(_) | Err(RentRoiError::InvalidInput { .. } | RentRoiError::Overflow { .. })
            ),
            "{principal} @ {rate}% over {term}y gave {summary:?}"
        );
    }
}

#[test]
fn test_summarize_rejects_inputs_past_ceiling() {
    let cases = [
        (dec!(200), 30),
        (dec!(7), 400_000_000),
        (dec!(7), MAX_LOAN_TERM_YEARS + 1),
    ];
    for (rate, term) in cases {
        let err = summarize_loan(&LoanInput {
            principal: dec!(1000000),
            annual_rate_percent: rate,
            term_years: term,
        })
        .unwrap_err();
        assert!(matches!(err, RentRoiError::InvalidInput { .. }), "{rate}% {term}y");
    }
}
