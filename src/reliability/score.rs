use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound of the reliability scale (percentage of sessions attended)
pub const MAX_SCORE: u8 = 100;

/// Rejected reliability score input.
///
/// Producers are expected to hand over an integer percentage. Anything else
/// is surfaced here instead of being clamped, so upstream data bugs stay visible.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidScoreError {
    #[error("reliability score {0} is outside 0..=100")]
    OutOfRange(i64),

    #[error("reliability score {0} is not an integer")]
    NotIntegral(f64),

    #[error("reliability score '{0}' is not a number")]
    NotANumber(String),
}

/// A validated reliability score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ReliabilityScore(u8);

impl ReliabilityScore {
    pub const MAX: ReliabilityScore = ReliabilityScore(MAX_SCORE);

    pub fn new(value: i64) -> Result<Self, InvalidScoreError> {
        if (0..=MAX_SCORE as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidScoreError::OutOfRange(value))
        }
    }

    /// Accept a float only if it carries an exact integer value.
    /// No rounding happens here; that is the producer's job.
    pub fn from_f64(value: f64) -> Result<Self, InvalidScoreError> {
        if value.is_nan() {
            return Err(InvalidScoreError::NotANumber(value.to_string()));
        }
        if value.is_infinite() || value.fract() != 0.0 {
            return Err(InvalidScoreError::NotIntegral(value));
        }
        // Whole numbers past i64 are still integers, just far out of range
        if value >= i64::MAX as f64 {
            return Err(InvalidScoreError::OutOfRange(i64::MAX));
        }
        if value < i64::MIN as f64 {
            return Err(InvalidScoreError::OutOfRange(i64::MIN));
        }
        Self::new(value as i64)
    }

    /// Score from attendance counts: `round(attended / total * 100)`.
    ///
    /// `attended` may be fractional when partial attendance (late arrivals)
    /// is weighted. Returns `None` when there is no session history yet.
    pub fn from_attendance(attended: f64, total: u64) -> Option<Self> {
        if total == 0 {
            return None;
        }
        let total = total as f64;
        let attended = if attended.is_nan() { 0.0 } else { attended.clamp(0.0, total) };
        let pct = (attended / total * 100.0).round();
        Some(Self(pct as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for ReliabilityScore {
    type Error = InvalidScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<f64> for ReliabilityScore {
    type Error = InvalidScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl From<ReliabilityScore> for u8 {
    fn from(score: ReliabilityScore) -> u8 {
        score.0
    }
}

impl FromStr for ReliabilityScore {
    type Err = InvalidScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return Self::new(v);
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Self::from_f64(v),
            Err(_) => Err(InvalidScoreError::NotANumber(s.to_string())),
        }
    }
}

impl fmt::Display for ReliabilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_range() {
        for v in 0..=100 {
            assert_eq!(ReliabilityScore::new(v).unwrap().value() as i64, v);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(ReliabilityScore::new(-1), Err(InvalidScoreError::OutOfRange(-1)));
        assert_eq!(ReliabilityScore::new(101), Err(InvalidScoreError::OutOfRange(101)));
        assert!(ReliabilityScore::new(i64::MAX).is_err());
    }

    #[test]
    fn test_float_must_be_integral() {
        assert_eq!(ReliabilityScore::from_f64(72.0).unwrap().value(), 72);
        assert_eq!(ReliabilityScore::from_f64(50.5), Err(InvalidScoreError::NotIntegral(50.5)));
        assert!(matches!(ReliabilityScore::from_f64(f64::NAN), Err(InvalidScoreError::NotANumber(_))));
        assert!(ReliabilityScore::from_f64(f64::INFINITY).is_err());
        assert_eq!(ReliabilityScore::from_f64(-1.0), Err(InvalidScoreError::OutOfRange(-1)));
    }

    #[test]
    fn test_huge_whole_floats_are_out_of_range() {
        assert_eq!(ReliabilityScore::from_f64(1e20), Err(InvalidScoreError::OutOfRange(i64::MAX)));
        assert_eq!(ReliabilityScore::from_f64(-1e20), Err(InvalidScoreError::OutOfRange(i64::MIN)));
        assert!(matches!("1e20".parse::<ReliabilityScore>(), Err(InvalidScoreError::OutOfRange(_))));
        assert!(ReliabilityScore::from_f64(1e20).unwrap_err().to_string().contains("outside 0..=100"));
    }

    #[test]
    fn test_parse() {
        assert_eq!("85".parse::<ReliabilityScore>().unwrap().value(), 85);
        assert_eq!(" 9 ".parse::<ReliabilityScore>().unwrap().value(), 9);
        assert_eq!("70.0".parse::<ReliabilityScore>().unwrap().value(), 70);
        assert!(matches!("72.5".parse::<ReliabilityScore>(), Err(InvalidScoreError::NotIntegral(_))));
        assert!(matches!("abc".parse::<ReliabilityScore>(), Err(InvalidScoreError::NotANumber(_))));
        assert!(matches!("NaN".parse::<ReliabilityScore>(), Err(InvalidScoreError::NotANumber(_))));
        assert!(matches!("101".parse::<ReliabilityScore>(), Err(InvalidScoreError::OutOfRange(101))));
    }

    #[test]
    fn test_from_attendance() {
        assert_eq!(ReliabilityScore::from_attendance(0.0, 0), None);
        assert_eq!(ReliabilityScore::from_attendance(2.0, 3).unwrap().value(), 67);
        assert_eq!(ReliabilityScore::from_attendance(1.0, 3).unwrap().value(), 33);
        assert_eq!(ReliabilityScore::from_attendance(10.0, 10).unwrap().value(), 100);
        assert_eq!(ReliabilityScore::from_attendance(0.0, 4).unwrap().value(), 0);
    }

    #[test]
    fn test_from_weighted_attendance() {
        // one present plus one late at 0.8
        assert_eq!(ReliabilityScore::from_attendance(1.8, 2).unwrap().value(), 90);
        assert_eq!(ReliabilityScore::from_attendance(0.8, 3).unwrap().value(), 27);
        assert_eq!(ReliabilityScore::from_attendance(5.0, 2).unwrap().value(), 100);
        assert_eq!(ReliabilityScore::from_attendance(-1.0, 2).unwrap().value(), 0);
    }

    #[test]
    fn test_serde_validates() {
        let s: ReliabilityScore = serde_json::from_str("42").unwrap();
        assert_eq!(s.value(), 42);
        assert!(serde_json::from_str::<ReliabilityScore>("142").is_err());
        assert_eq!(serde_json::to_string(&s).unwrap(), "42");
    }
}
