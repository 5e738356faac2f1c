//! Temporal types for stays and property-local time
//!
//! Hotels bill by the property-local day: a folio is overdue once the
//! property's business day ends, not at UTC midnight. This module provides
//! the timezone wrapper and stay-period types the billing engine relies on.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper for property locations
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(self.0)
            .single()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }

    /// Gets the end of day (23:59:59.999999999) in this timezone as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap()
            .and_local_timezone(self.0)
            .single()
            .expect("Invalid timezone conversion")
            .with_timezone(&Utc)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid stay: check-in {check_in} must be before check-out {check_out}")]
    InvalidStay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Date is outside the stay period")]
    OutsideStay,
}

/// The occupied period of a reservation
///
/// Check-in is inclusive, check-out is exclusive: a guest arriving on the
/// 10th and leaving on the 12th is billed two nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPeriod {
    /// Arrival date (inclusive)
    pub check_in: NaiveDate,
    /// Departure date (exclusive)
    pub check_out: NaiveDate,
}

impl StayPeriod {
    /// Creates a new stay period, rejecting zero-night and inverted stays
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, TemporalError> {
        if check_in >= check_out {
            return Err(TemporalError::InvalidStay { check_in, check_out });
        }
        Ok(Self { check_in, check_out })
    }

    /// Number of billable nights
    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    /// Returns true if the given date falls within the stay
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.check_in && date < self.check_out
    }

    /// The last occupied night of the stay
    pub fn last_night(&self) -> NaiveDate {
        self.check_out
            .checked_sub_days(Days::new(1))
            .expect("check_out has a preceding day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stay_period_nights() {
        let stay = StayPeriod::new(date(2024, 6, 10), date(2024, 6, 12)).unwrap();
        assert_eq!(stay.nights(), 2);
        assert_eq!(stay.last_night(), date(2024, 6, 11));
    }

    #[test]
    fn test_stay_period_rejects_inverted() {
        let result = StayPeriod::new(date(2024, 6, 12), date(2024, 6, 10));
        assert!(matches!(result, Err(TemporalError::InvalidStay { .. })));
    }

    #[test]
    fn test_stay_period_rejects_zero_nights() {
        let result = StayPeriod::new(date(2024, 6, 10), date(2024, 6, 10));
        assert!(result.is_err());
    }

    #[test]
    fn test_stay_contains() {
        let stay = StayPeriod::new(date(2024, 6, 10), date(2024, 6, 12)).unwrap();
        assert!(stay.contains(date(2024, 6, 10)));
        assert!(stay.contains(date(2024, 6, 11)));
        assert!(!stay.contains(date(2024, 6, 12)));
    }

    #[test]
    fn test_end_of_day_follows_property_timezone() {
        let bangkok = Timezone::new(chrono_tz::Asia::Bangkok);
        let end = bangkok.end_of_day(date(2024, 6, 10));

        // Bangkok is UTC+7, so local end of day is 16:59:59 UTC
        let expected = Utc.with_ymd_and_hms(2024, 6, 10, 16, 59, 59).unwrap();
        assert_eq!(end.date_naive(), expected.date_naive());
        assert_eq!(end.time().format("%H:%M:%S").to_string(), "16:59:59");
    }

    #[test]
    fn test_timezone_serde_round_trip() {
        let tz = Timezone::new(chrono_tz::America::New_York);
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"America/New_York\"");

        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }
}
