//! Rating value object for survey answers (0 to 10 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Agreement with a probe question: 0 (fully disagree) to 10 (fully agree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SurveyRating(u8);

impl SurveyRating {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;

    /// Scale midpoint, the neutral answer.
    pub const MIDPOINT: SurveyRating = SurveyRating(5);

    /// Creates a rating, returning error if out of range.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::out_of_range(
                "rating",
                Self::MIN as i64,
                Self::MAX as i64,
                value as i64,
            ));
        }
        Ok(Self(value))
    }

    /// Creates a rating from any number, rounding and clamping into 0-10.
    /// Returns whether the input had to be adjusted.
    pub fn clamped(value: f64) -> (Self, bool) {
        if value.is_nan() {
            return (Self::MIDPOINT, true);
        }
        let rounded = value.round().clamp(Self::MIN as f64, Self::MAX as f64);
        (Self(rounded as u8), rounded != value)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for SurveyRating {
    fn default() -> Self {
        Self::MIDPOINT
    }
}

impl TryFrom<u8> for SurveyRating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SurveyRating::new(value)
    }
}

impl From<SurveyRating> for u8 {
    fn from(rating: SurveyRating) -> Self {
        rating.0
    }
}

impl fmt::Display for SurveyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_scale_values() {
        for v in 0..=10 {
            assert_eq!(SurveyRating::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn new_rejects_above_scale() {
        assert!(matches!(
            SurveyRating::new(11),
            Err(ValidationError::OutOfRange { actual: 11, .. })
        ));
    }

    #[test]
    fn clamped_reports_adjustment() {
        assert_eq!(SurveyRating::clamped(7.0), (SurveyRating(7), false));
        assert_eq!(SurveyRating::clamped(12.0), (SurveyRating(10), true));
        assert_eq!(SurveyRating::clamped(-1.0), (SurveyRating(0), true));
        assert_eq!(SurveyRating::clamped(6.4), (SurveyRating(6), true));
        assert_eq!(SurveyRating::clamped(f64::NAN), (SurveyRating::MIDPOINT, true));
    }

    #[test]
    fn deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<SurveyRating>("11").is_err());
        assert_eq!(serde_json::from_str::<SurveyRating>("3").unwrap().value(), 3);
    }
}
