use assert_matches::assert_matches;
use chrono::{Datelike, TimeZone, Utc};
use headermatch_codec::*;

#[test]
fn max_age_zero_is_not_absent() {
    assert_eq!(Cookie::parse("user=x; max-age=0").unwrap().max_age, Some(0));
    assert_eq!(Cookie::parse("user=x").unwrap().max_age, None);
}

#[test]
fn expires_two_digit_years_split_at_seventy() {
    let cookie = Cookie::parse("user=x; Expires=Thu, 01-Jan-70 00:00:01 GMT").unwrap();
    assert_eq!(cookie.expires.unwrap().year(), 1970);

    let cookie = Cookie::parse("user=x; Expires=Sun, 01-Jan-69 00:00:01 GMT").unwrap();
    assert_eq!(cookie.expires.unwrap().year(), 2069);
}

#[test]
fn matches_ignores_attribute_order_and_case() {
    let expected = Cookie::builder("session", "abc")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
        .unwrap();

    assert!(
        expected
            .matches("session=abc; SameSite=strict; HTTPONLY; Secure; path=/")
            .unwrap()
    );
    assert!(!expected.matches("session=abc; Path=/; HttpOnly").unwrap());
}

#[test]
fn matches_propagates_parse_failures() {
    let expected = Cookie::new("session", "abc");
    assert_matches!(
        expected.matches("session=abc; Max-Age=forever"),
        Err(CookieError::InvalidMaxAge(_))
    );
    assert_matches!(expected.matches(""), Err(CookieError::EmptyHeader));
}

#[test]
fn every_field_round_trips() {
    let cookie = Cookie::builder("id", "a3fWa")
        .domain("example.com")
        .path("/docs")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::None)
        .max_age(-1)
        .expires(Utc.with_ymd_and_hms(2031, 3, 9, 23, 5, 59).unwrap())
        .build()
        .unwrap();

    assert_eq!(Cookie::parse(&cookie.canonical()).unwrap(), cookie);
}

#[test]
fn from_str_and_display_use_wire_form() {
    let cookie: Cookie = "lang=en-US; Path=/".parse().unwrap();
    assert_eq!(cookie.to_string(), "lang=en-US; Path=/");
}
