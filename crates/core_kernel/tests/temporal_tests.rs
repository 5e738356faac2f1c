//! Integration tests for temporal types

use chrono::NaiveDate;
use core_kernel::{StayPeriod, TemporalError, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn week_long_stay_has_seven_billable_nights() {
    let stay = StayPeriod::new(date(2024, 3, 1), date(2024, 3, 8)).unwrap();
    assert_eq!(stay.nights(), 7);
}

#[test]
fn checkout_day_is_not_occupied() {
    let stay = StayPeriod::new(date(2024, 3, 1), date(2024, 3, 8)).unwrap();
    assert!(!stay.contains(date(2024, 3, 8)));
    assert_eq!(stay.last_night(), date(2024, 3, 7));
}

#[test]
fn inverted_stay_is_invalid() {
    let err = StayPeriod::new(date(2024, 3, 8), date(2024, 3, 1)).unwrap_err();
    assert_eq!(
        err,
        TemporalError::InvalidStay {
            check_in: date(2024, 3, 8),
            check_out: date(2024, 3, 1),
        }
    );
}

#[test]
fn property_end_of_day_precedes_utc_end_of_day_east_of_greenwich() {
    let bangkok = Timezone::new(chrono_tz::Asia::Bangkok);
    let utc = Timezone::default();

    let due = date(2024, 3, 1);
    assert!(bangkok.end_of_day(due) < utc.end_of_day(due));
}

#[test]
fn start_of_day_is_before_end_of_day() {
    let tz = Timezone::new(chrono_tz::America::New_York);
    let day = date(2024, 11, 3); // DST fall-back day
    assert!(tz.start_of_day(day) < tz.end_of_day(day));
}
