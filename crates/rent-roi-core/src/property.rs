use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RentRoiError;
use crate::types::Money;
use crate::RentRoiResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Physical and location features of a property, as entered or geocoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInput {
    pub beds: u32,
    /// Bathrooms in half-bath increments (1.5 = one full, one half)
    pub baths: Decimal,
    pub footage_sq_ft: u32,
    pub latitude: Decimal,
    pub longitude: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A geocoded point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

/// Monthly rent produced by an external estimator. Treated as ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentEstimate {
    pub monthly_rent: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_lower: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_upper: Option<Money>,
}

/// Half-width of the confidence band when the estimator supplies none.
pub const DEFAULT_CONFIDENCE_BAND: Decimal = dec!(0.10);

/// Largest monthly rent accepted by validation.
pub const MAX_MONTHLY_RENT: Money = dec!(1000000000);

impl RentEstimate {
    /// Point estimate with no confidence band.
    pub fn new(monthly_rent: Money) -> Self {
        Self {
            monthly_rent,
            confidence_lower: None,
            confidence_upper: None,
        }
    }

    /// Point estimate with a ±10% band around it.
    pub fn with_default_band(monthly_rent: Money) -> Self {
        let (lower, upper) = default_band(monthly_rent);
        Self {
            monthly_rent,
            confidence_lower: Some(lower),
            confidence_upper: Some(upper),
        }
    }

    /// The supplied band, or the ±10% default for whichever end is missing.
    pub fn confidence_range(&self) -> (Money, Money) {
        let (lower, upper) = default_band(self.monthly_rent);
        (
            self.confidence_lower.unwrap_or(lower),
            self.confidence_upper.unwrap_or(upper),
        )
    }
}

fn default_band(rent: Money) -> (Money, Money) {
    (
        rent * (Decimal::ONE - DEFAULT_CONFIDENCE_BAND),
        rent.checked_mul(Decimal::ONE + DEFAULT_CONFIDENCE_BAND)
            .unwrap_or(Decimal::MAX),
    )
}

/// Valid feature ranges for the metro a rent model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetroBounds {
    pub min_beds: u32,
    pub max_beds: u32,
    pub min_baths: Decimal,
    pub max_baths: Decimal,
    pub min_footage: u32,
    pub max_footage: u32,
    pub min_latitude: Decimal,
    pub max_latitude: Decimal,
    pub min_longitude: Decimal,
    pub max_longitude: Decimal,
}

impl MetroBounds {
    /// San Francisco, the metro the bundled model covers.
    pub fn san_francisco() -> Self {
        Self {
            min_beds: 0,
            max_beds: 10,
            min_baths: dec!(0.5),
            max_baths: dec!(10),
            min_footage: 250,
            max_footage: 10000,
            min_latitude: dec!(37.6),
            max_latitude: dec!(37.9),
            min_longitude: dec!(-122.6),
            max_longitude: dec!(-122.3),
        }
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

impl Default for MetroBounds {
    fn default() -> Self {
        Self::san_francisco()
    }
}

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// Source of rent estimates (an ML model, a comps service, a fixture).
pub trait RentEstimator {
    fn estimate(&self, property: &PropertyInput) -> RentRoiResult<RentEstimate>;
}

/// Resolves a free-text address to coordinates.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> RentRoiResult<Coordinates>;
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject property features outside the metro's valid ranges.
pub fn validate_property(property: &PropertyInput, bounds: &MetroBounds) -> RentRoiResult<()> {
    if property.beds < bounds.min_beds || property.beds > bounds.max_beds {
        return Err(out_of_range("beds", bounds.min_beds, bounds.max_beds));
    }

    if property.baths < bounds.min_baths || property.baths > bounds.max_baths {
        return Err(out_of_range("baths", bounds.min_baths, bounds.max_baths));
    }

    if !(property.baths * dec!(2)).fract().is_zero() {
        return Err(RentRoiError::InvalidInput {
            field: "baths".into(),
            reason: "Bathrooms must be in 0.5 increments".into(),
        });
    }

    if property.footage_sq_ft == 0 {
        return Err(RentRoiError::InvalidInput {
            field: "footage_sq_ft".into(),
            reason: "Square footage must be positive".into(),
        });
    }

    if property.footage_sq_ft < bounds.min_footage || property.footage_sq_ft > bounds.max_footage {
        return Err(out_of_range(
            "footage_sq_ft",
            bounds.min_footage,
            bounds.max_footage,
        ));
    }

    if property.latitude < bounds.min_latitude || property.latitude > bounds.max_latitude {
        return Err(out_of_range(
            "latitude",
            bounds.min_latitude,
            bounds.max_latitude,
        ));
    }

    if property.longitude < bounds.min_longitude || property.longitude > bounds.max_longitude {
        return Err(out_of_range(
            "longitude",
            bounds.min_longitude,
            bounds.max_longitude,
        ));
    }

    Ok(())
}

/// Reject non-positive rent and confidence bands that exclude the estimate.
pub fn validate_rent_estimate(estimate: &RentEstimate) -> RentRoiResult<()> {
    if estimate.monthly_rent <= Decimal::ZERO {
        return Err(RentRoiError::InvalidInput {
            field: "monthly_rent".into(),
            reason: "Monthly rent must be positive".into(),
        });
    }

    if estimate.monthly_rent > MAX_MONTHLY_RENT {
        return Err(RentRoiError::InvalidInput {
            field: "monthly_rent".into(),
            reason: format!("Monthly rent must not exceed {MAX_MONTHLY_RENT}"),
        });
    }

    if let Some(lower) = estimate.confidence_lower {
        if lower > estimate.monthly_rent {
            return Err(RentRoiError::InvalidInput {
                field: "confidence_lower".into(),
                reason: "Lower confidence bound exceeds the estimate".into(),
            });
        }
    }

    if let Some(upper) = estimate.confidence_upper {
        if upper < estimate.monthly_rent {
            return Err(RentRoiError::InvalidInput {
                field: "confidence_upper".into(),
                reason: "Upper confidence bound is below the estimate".into(),
            });
        }
    }

    Ok(())
}

fn out_of_range(
    field: &str,
    min: impl std::fmt::Display,
    max: impl std::fmt::Display,
) -> RentRoiError {
    RentRoiError::InvalidInput {
        field: field.into(),
        reason: format!("Must be between {min} and {max}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_property() -> PropertyInput {
        PropertyInput {
            beds: 2,
            baths: dec!(1.5),
            footage_sq_ft: 1200,
            latitude: dec!(37.7749),
            longitude: dec!(-122.4194),
            address: Some("1 Market St".into()),
        }
    }

    #[test]
    fn test_valid_property() {
        assert!(validate_property(&sample_property(), &MetroBounds::default()).is_ok());
    }

    #[test]
    fn test_too_many_beds() {
        let mut p = sample_property();
        p.beds = 11;
        let err = validate_property(&p, &MetroBounds::default()).unwrap_err();
        match err {
            RentRoiError::InvalidInput { field, .. } => assert_eq!(field, "beds"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_quarter_bath_rejected() {
        let mut p = sample_property();
        p.baths = dec!(1.25);
        assert!(validate_property(&p, &MetroBounds::default()).is_err());
    }

    #[test]
    fn test_zero_footage_rejected() {
        let mut p = sample_property();
        p.footage_sq_ft = 0;
        let err = validate_property(&p, &MetroBounds::default()).unwrap_err();
        assert!(err.to_string().contains("footage_sq_ft"));
    }

    #[test]
    fn test_outside_metro_rejected() {
        let mut p = sample_property();
        p.latitude = dec!(40.7128);
        p.longitude = dec!(-74.0060);
        assert!(validate_property(&p, &MetroBounds::default()).is_err());
    }

    #[test]
    fn test_custom_bounds() {
        let bounds = MetroBounds {
            min_latitude: dec!(40.4),
            max_latitude: dec!(41.0),
            min_longitude: dec!(-74.3),
            max_longitude: dec!(-73.6),
            ..MetroBounds::default()
        };
        let mut p = sample_property();
        p.latitude = dec!(40.7128);
        p.longitude = dec!(-74.0060);
        assert!(validate_property(&p, &bounds).is_ok());
        assert!(bounds.contains(&Coordinates {
            latitude: p.latitude,
            longitude: p.longitude,
        }));
    }

    #[test]
    fn test_default_band() {
        let est = RentEstimate::with_default_band(dec!(4000));
        assert_eq!(est.confidence_lower, Some(dec!(3600)));
        assert_eq!(est.confidence_upper, Some(dec!(4400)));
    }

    #[test]
    fn test_partial_band_filled() {
        let est = RentEstimate {
            monthly_rent: dec!(3000),
            confidence_lower: Some(dec!(2500)),
            confidence_upper: None,
        };
        assert_eq!(est.confidence_range(), (dec!(2500), dec!(3300)));
    }

    #[test]
    fn test_rent_estimate_validation() {
        assert!(validate_rent_estimate(&RentEstimate::new(dec!(2500))).is_ok());
        assert!(validate_rent_estimate(&RentEstimate::new(Decimal::ZERO)).is_err());

        let inverted = RentEstimate {
            monthly_rent: dec!(2500),
            confidence_lower: Some(dec!(2600)),
            confidence_upper: Some(dec!(2400)),
        };
        assert!(validate_rent_estimate(&inverted).is_err());
    }

    #[test]
    fn test_rent_ceiling() {
        assert!(validate_rent_estimate(&RentEstimate::new(MAX_MONTHLY_RENT)).is_ok());
        let err = validate_rent_estimate(&RentEstimate::new(Decimal::MAX)).unwrap_err();
        assert!(err.to_string().contains("monthly_rent"));
    }

    #[test]
    fn test_default_band_saturates() {
        let (lower, upper) = RentEstimate::new(Decimal::MAX).confidence_range();
        assert!(lower < Decimal::MAX);
        assert_eq!(upper, Decimal::MAX);
    }

    struct FixedEstimator(Money);

    impl RentEstimator for FixedEstimator {
        fn estimate(&self, _property: &PropertyInput) -> RentRoiResult<RentEstimate> {
            Ok(RentEstimate::with_default_band(self.0))
        }
    }

    #[test]
    fn test_estimator_seam() {
        let est = FixedEstimator(dec!(3200)).estimate(&sample_property()).unwrap();
        assert_eq!(est.monthly_rent, dec!(3200));
        assert!(validate_rent_estimate(&est).is_ok());
    }

    struct StubGeocoder;

    impl Geocoder for StubGeocoder {
        fn geocode(&self, address: &str) -> RentRoiResult<Coordinates> {
            if address.is_empty() {
                return Err(RentRoiError::InvalidInput {
                    field: "address".into(),
                    reason: "Address is empty".into(),
                });
            }
            Ok(Coordinates {
                latitude: dec!(37.7793),
                longitude: dec!(-122.4193),
            })
        }
    }

    #[test]
    fn test_geocoder_seam() {
        let point = StubGeocoder.geocode("City Hall, San Francisco").unwrap();
        assert!(MetroBounds::san_francisco().contains(&point));
        assert!(StubGeocoder.geocode("").is_err());
    }
}
