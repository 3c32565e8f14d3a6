use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use headermatch_codec::*;

#[test]
fn every_format_normalizes_to_rfc1123() {
    for text in [
        "Sun, 06 Nov 1994 08:49:37 GMT",
        "Sunday, 06-Nov-94 08:49:37 GMT",
        "Sun Nov  6 08:49:37 1994",
    ] {
        let date = HttpDate::parse(text).unwrap();
        assert_eq!(date.canonical(), "Sun, 06 Nov 1994 08:49:37 GMT", "{text}");
    }
}

#[test]
fn matches_other_formats_of_the_same_instant() {
    let expected = HttpDate::from(Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap());
    assert!(expected.matches("Sunday, 06-Nov-94 08:49:37 GMT").unwrap());
    assert!(!expected.matches("Sun, 06 Nov 1994 08:49:38 GMT").unwrap());
}

#[test]
fn invalid_dates_report_accepted_formats() {
    let err = HttpDate::parse("yesterday").unwrap_err();
    assert_matches!(&err, DateError::InvalidDateFormat(_));
    assert!(err.to_string().contains(ACCEPTED_DATE_FORMATS));
}

#[test]
fn errors_convert_into_header_error() {
    fn parse_any(text: &str) -> Result<HttpDate, HeaderError> {
        Ok(HttpDate::parse(text)?)
    }
    assert_matches!(parse_any("nope"), Err(HeaderError::Date(_)));
}
