use super::DateSpec;
use chrono::{Days, Local, NaiveDate, NaiveTime};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Date specs for every offset in `[from_offset, to_offset)`, counted in days from today's
/// local date.
pub fn date_strings(from_offset: i64, to_offset: i64) -> Vec<DateSpec> {
    date_strings_from(Local::now().date_naive(), from_offset, to_offset)
}

/// Same as [`date_strings`], anchored at `today`.
///
/// The timestamp is the date's UTC midnight in whole seconds, rescaled to milliseconds.
pub fn date_strings_from(today: NaiveDate, from_offset: i64, to_offset: i64) -> Vec<DateSpec> {
    (from_offset..to_offset)
        .filter_map(|off| {
            let date = shift(today, off)?;
            let secs = date.and_time(NaiveTime::MIN).and_utc().timestamp();
            Some(DateSpec {
                date_key: date.format("%Y%m%d").to_string(),
                epoch_millis: 1000 * secs,
            })
        })
        .collect()
}

// None only beyond chrono's representable range
fn shift(today: NaiveDate, off: i64) -> Option<NaiveDate> {
    let days = Days::new(off.unsigned_abs());
    if off >= 0 {
        today.checked_add_days(days)
    } else {
        today.checked_sub_days(days)
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[test]
fn window_is_half_open_and_daily() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let specs = date_strings_from(today, -2, 3);

    assert_eq!(specs.len(), 5);
    let keys: Vec<&str> = specs.iter().map(|s| s.date_key.as_str()).collect();
    assert_eq!(
        keys,
        ["20240307", "20240308", "20240309", "20240310", "20240311"]
    );
    for pair in specs.windows(2) {
        assert_eq!(pair[1].epoch_millis - pair[0].epoch_millis, MILLIS_PER_DAY);
    }
}

#[test]
fn epoch_is_utc_midnight_in_whole_seconds() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let specs = date_strings_from(today, 0, 1);

    assert_eq!(specs[0].date_key, "20240102");
    assert_eq!(specs[0].epoch_millis, 1_704_153_600_000);
    assert_eq!(specs[0].epoch_millis % 1000, 0);
}

#[test]
fn empty_when_from_not_below_to() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    assert!(date_strings_from(today, 3, 3).is_empty());
    assert!(date_strings_from(today, 5, 1).is_empty());
}

#[test]
fn crosses_month_and_year_boundaries() {
    let today = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let specs = date_strings_from(today, 0, 2);
    assert_eq!(specs[0].date_key, "20231231");
    assert_eq!(specs[1].date_key, "20240101");
}

#[test]
fn local_window_is_contiguous() {
    let specs = date_strings(-1, 2);
    assert_eq!(specs.len(), 3);
    assert_eq!(specs[1].epoch_millis - specs[0].epoch_millis, MILLIS_PER_DAY);
    assert_eq!(specs[2].epoch_millis - specs[1].epoch_millis, MILLIS_PER_DAY);
}
