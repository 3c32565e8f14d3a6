//! HTTP-date handling (RFC 7231 §7.1.1.1) and the looser cookie-date grammar
//! of RFC 6265 §5.1.1.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SubsecRound, TimeZone, Utc};

use crate::error::{CookieError, DateError};
use crate::token;
use crate::value::HeaderValue;

pub type Timestamp = DateTime<Utc>;

const RFC1123_DATE: &str = "%d %b %Y %H:%M:%S";
const RFC850_DATE: &str = "%d-%b-%y %H:%M:%S";
const ASCTIME_DATE: &str = "%b %e %H:%M:%S %Y";
const RFC1123_OUT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// A date header value such as `Date`, `Expires` or `Last-Modified`.
///
/// Held at whole-second precision, the finest the wire format carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpDate(Timestamp);

impl HttpDate {
    pub fn new(timestamp: Timestamp) -> Self {
        Self(truncate_to_seconds(timestamp))
    }

    pub fn timestamp(&self) -> Timestamp {
        self.0
    }
}

impl From<Timestamp> for HttpDate {
    fn from(timestamp: Timestamp) -> Self {
        Self::new(timestamp)
    }
}

impl HeaderValue for HttpDate {
    type Error = DateError;

    fn parse(wire: &str) -> Result<Self, Self::Error> {
        parse_http_date(wire).map(Self)
    }

    fn canonical(&self) -> String {
        format_http_date(&self.0)
    }
}

impl fmt::Display for HttpDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for HttpDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as HeaderValue>::parse(s)
    }
}

pub(crate) fn truncate_to_seconds(timestamp: Timestamp) -> Timestamp {
    timestamp.trunc_subsecs(0)
}

/// Parses RFC 1123, RFC 850 or asctime text, tried in that order.
///
/// The leading weekday name is skipped rather than checked against the date.
pub fn parse_http_date(text: &str) -> Result<Timestamp, DateError> {
    let invalid = || DateError::InvalidDateFormat(text.to_string());

    let stripped = token::unquote(token::trim(text), '\'');
    let normalized = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some((body, zone)) = normalized.rsplit_once(' ') {
        let dated = body
            .split_once(", ")
            .filter(|(weekday, _)| is_weekday_name(weekday));
        if let (Some(offset), Some((_, date))) = (parse_zone(zone), dated) {
            for format in [RFC1123_DATE, RFC850_DATE] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(date, format) {
                    log::trace!("date {text:?} matched {format:?}");
                    return offset
                        .from_local_datetime(&naive)
                        .single()
                        .map(|datetime| datetime.with_timezone(&Utc))
                        .ok_or_else(invalid);
                }
            }
        }
    }

    let asctime = normalized
        .split_once(' ')
        .filter(|(weekday, _)| is_weekday_name(weekday))
        .and_then(|(_, date)| NaiveDateTime::parse_from_str(date, ASCTIME_DATE).ok());
    match asctime {
        Some(naive) => {
            log::trace!("date {text:?} matched asctime");
            Ok(Utc.from_utc_datetime(&naive))
        }
        None => Err(invalid()),
    }
}

/// Renders RFC 1123 in GMT.
pub fn format_http_date(timestamp: &Timestamp) -> String {
    timestamp.format(RFC1123_OUT).to_string()
}

fn is_weekday_name(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|byte| byte.is_ascii_alphabetic())
}

/// `GMT`-equivalents, the RFC 822 North American zones and `±hhmm`.
fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let hours = match zone {
        "GMT" | "UTC" | "UT" | "Z" => Some(0),
        "EDT" => Some(-4),
        "EST" | "CDT" => Some(-5),
        "CST" | "MDT" => Some(-6),
        "MST" | "PDT" => Some(-7),
        "PST" => Some(-8),
        _ => None,
    };
    if let Some(hours) = hours {
        return FixedOffset::east_opt(hours * 3600);
    }

    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateToken<'a> {
    Number(&'a str),
    Word(&'a str),
    Time(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Between,
    Digits,
    Alpha,
}

/// Splits a cookie date into digit runs, alpha runs and `h:m:s` groups.
/// Every other character acts as a separator.
fn tokenize(text: &str) -> Vec<DateToken<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut state = ScanState::Between;
    let mut start = 0;
    let mut saw_colon = false;

    for index in 0..=bytes.len() {
        let byte = bytes.get(index).copied();
        let is_digit = byte.is_some_and(|b| b.is_ascii_digit());
        let is_alpha = byte.is_some_and(|b| b.is_ascii_alphabetic());

        match state {
            ScanState::Digits if is_digit || byte == Some(b':') => {
                saw_colon |= byte == Some(b':');
                continue;
            }
            ScanState::Digits => {
                let run = &text[start..index];
                tokens.push(if saw_colon {
                    DateToken::Time(run)
                } else {
                    DateToken::Number(run)
                });
            }
            ScanState::Alpha if is_alpha => continue,
            ScanState::Alpha => tokens.push(DateToken::Word(&text[start..index])),
            ScanState::Between => {}
        }

        start = index;
        saw_colon = false;
        state = if is_digit {
            ScanState::Digits
        } else if is_alpha {
            ScanState::Alpha
        } else {
            ScanState::Between
        };
    }

    tokens
}

/// Parses an `Expires` attribute value. Field order is not fixed; each token
/// fills the first still-empty field it can belong to.
pub fn parse_cookie_date(text: &str) -> Result<Timestamp, CookieError> {
    let raw = || text.to_string();

    let mut time: Option<&str> = None;
    let mut day: Option<&str> = None;
    let mut month: Option<u32> = None;
    let mut year: Option<&str> = None;

    for date_token in tokenize(text) {
        log::trace!("cookie date token {date_token:?}");
        match date_token {
            DateToken::Time(value) if time.is_none() => time = Some(value),
            DateToken::Word(value) if month.is_none() => month = month_number(value),
            DateToken::Number(value) if day.is_none() && value.len() <= 2 => day = Some(value),
            DateToken::Number(value) if year.is_none() && (2..=4).contains(&value.len()) => {
                year = Some(value)
            }
            // weekday names, zones and repeated fields carry no information
            _ => {}
        }
    }

    let year = year
        .and_then(|value| value.parse::<i32>().ok())
        .map(normalize_year)
        .filter(|year| *year >= 1601)
        .ok_or_else(|| CookieError::InvalidExpiresYear(raw()))?;
    let month = month.ok_or_else(|| CookieError::InvalidExpiresMonth(raw()))?;
    let day = day
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|day| (1..=31).contains(day))
        .ok_or_else(|| CookieError::InvalidExpiresDay(raw()))?;

    let mut clock = time.unwrap_or_default().split(':');
    let hour = clock_field(clock.next(), 23).ok_or_else(|| CookieError::InvalidExpiresHour(raw()))?;
    let minute =
        clock_field(clock.next(), 59).ok_or_else(|| CookieError::InvalidExpiresMinute(raw()))?;
    let second =
        clock_field(clock.next(), 59).ok_or_else(|| CookieError::InvalidExpiresSecond(raw()))?;
    if clock.next().is_some() {
        return Err(CookieError::InvalidExpiresSecond(raw()));
    }

    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .ok_or_else(|| CookieError::InvalidExpiresDay(raw()))
}

/// Two-digit years: 70..=99 map to 19xx and 0..=69 to 20xx.
fn normalize_year(year: i32) -> i32 {
    match year {
        70..=99 => 1900 + year,
        0..=69 => 2000 + year,
        _ => year,
    }
}

fn clock_field(value: Option<&str>, max: u32) -> Option<u32> {
    let value = value.filter(|value| (1..=2).contains(&value.len()))?;
    value.parse::<u32>().ok().filter(|field| *field <= max)
}

fn month_number(word: &str) -> Option<u32> {
    let prefix = word.get(..3)?.to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
