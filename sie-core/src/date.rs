//! Date fields. SIE writes dates as `yyyyMMdd`, periods as `yyyyMM` and years as `yyyy`.

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y%m%d";

/// Parses a `yyyyMMdd` date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Formats a date as `yyyyMMdd`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whether `s` is a `yyyyMM` period with a valid month.
pub fn is_valid_period(s: &str) -> bool {
    s.len() == 6 && parse_date(&format!("{}01", s)).is_some()
}

/// Whether `s` is a four digit year.
pub fn is_valid_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

#[test]
fn test_parse_date() {
    assert_eq!(parse_date("20230406"), NaiveDate::from_ymd_opt(2023, 4, 6));
    assert_eq!(parse_date("20230230"), None);
    assert_eq!(parse_date("2023-04-06"), None);
    assert_eq!(parse_date("+2023046"), None);
    assert_eq!(parse_date(""), None);
}

#[test]
fn test_period_and_year() {
    assert!(is_valid_period("202304"));
    assert!(!is_valid_period("202314"));
    assert!(!is_valid_period("2023041"));
    assert!(is_valid_year("2023"));
    assert!(!is_valid_year("23"));
    assert!(!is_valid_year("20x3"));
}

#[test]
fn test_format_date() {
    let date = NaiveDate::from_ymd_opt(2000, 9, 21).unwrap();
    assert_eq!(format_date(date), "20000921");
}
