//! `Set-Cookie` parsing following RFC 6265 §5.2.

use std::fmt;
use std::str::FromStr;

use crate::date::{Timestamp, format_http_date, parse_cookie_date, truncate_to_seconds};
use crate::error::CookieError;
use crate::token::{self, Pair};
use crate::value::HeaderValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            _ => Err(CookieError::UnknownSameSite(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cookie {
    pub name: String,
    /// May be empty.
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    /// Zero and negative values are kept as given; `None` means absent.
    pub max_age: Option<i64>,
    pub expires: Option<Timestamp>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            same_site: SameSite::default(),
            max_age: None,
            expires: None,
        }
    }

    pub fn builder(name: impl Into<String>, value: impl Into<String>) -> CookieBuilder {
        CookieBuilder::new(name, value)
    }
}

#[derive(Debug, Clone)]
pub struct CookieBuilder {
    cookie: Cookie,
}

impl CookieBuilder {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            cookie: Cookie::new(name, value),
        }
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.cookie.path = Some(path.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.cookie.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.cookie.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.cookie.same_site = same_site;
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.cookie.max_age = Some(seconds);
        self
    }

    /// Subsecond precision is dropped; `Expires` carries whole seconds.
    pub fn expires(mut self, expires: Timestamp) -> Self {
        self.cookie.expires = Some(truncate_to_seconds(expires));
        self
    }

    /// Fails unless the cookie reads back unchanged from its own `Set-Cookie`
    /// text. Empty domains or paths, names or values holding `;` or `=`, and
    /// expiry years before 1601 are rejected this way.
    pub fn build(self) -> Result<Cookie, CookieError> {
        let wire = serialize_set_cookie(&self.cookie);
        match parse_set_cookie(&wire) {
            Ok(parsed) if parsed == self.cookie => Ok(self.cookie),
            _ => Err(CookieError::UnrepresentableCookie(wire)),
        }
    }
}

pub fn parse_set_cookie(header: &str) -> Result<Cookie, CookieError> {
    let header = token::trim(header);
    if header.is_empty() {
        return Err(CookieError::EmptyHeader);
    }

    let (name_value, attributes) = token::split_first(header, ';');
    let (name, value) = match token::split_first(name_value, '=') {
        (name, Some(value)) => (token::trim(name), token::trim(value)),
        (_, None) => return Err(CookieError::MissingCookieValue(name_value.to_string())),
    };
    if name.is_empty() {
        return Err(CookieError::MissingCookieName(name_value.to_string()));
    }

    let mut cookie = Cookie::new(name, value);
    for attribute in token::split_list(attributes.unwrap_or_default(), ';') {
        apply_attribute(&mut cookie, token::split_pair(attribute))?;
    }
    Ok(cookie)
}

fn apply_attribute(cookie: &mut Cookie, pair: Pair<'_>) -> Result<(), CookieError> {
    let value = pair.value.unwrap_or_default();
    log::trace!("cookie {} attribute {:?}={value:?}", cookie.name, pair.name);

    match pair.name.to_ascii_lowercase().as_str() {
        "domain" if !value.is_empty() => cookie.domain = Some(value.to_string()),
        "path" if !value.is_empty() => cookie.path = Some(value.to_string()),
        "secure" => cookie.secure = true,
        "httponly" => cookie.http_only = true,
        "max-age" => {
            let seconds = value
                .parse::<i64>()
                .map_err(|_| CookieError::InvalidMaxAge(value.to_string()))?;
            cookie.max_age = Some(seconds);
        }
        "expires" => cookie.expires = Some(parse_cookie_date(value)?),
        "samesite" => cookie.same_site = value.parse()?,
        other => log::debug!("ignoring cookie attribute {other:?}"),
    }
    Ok(())
}

pub fn serialize_set_cookie(cookie: &Cookie) -> String {
    let mut out = format!("{}={}", cookie.name, cookie.value);
    if let Some(domain) = &cookie.domain {
        out.push_str("; Domain=");
        out.push_str(domain);
    }
    if let Some(path) = &cookie.path {
        out.push_str("; Path=");
        out.push_str(path);
    }
    if cookie.secure {
        out.push_str("; secure");
    }
    if cookie.http_only {
        out.push_str("; HttpOnly");
    }
    if let Some(max_age) = cookie.max_age {
        out.push_str(&format!("; max-age={max_age}"));
    }
    if let Some(expires) = &cookie.expires {
        out.push_str("; Expires=");
        out.push_str(&format_http_date(expires));
    }
    // Lax is what a missing attribute parses to
    if cookie.same_site != SameSite::Lax {
        out.push_str("; SameSite=");
        out.push_str(cookie.same_site.as_str());
    }
    out
}

impl HeaderValue for Cookie {
    type Error = CookieError;

    fn parse(wire: &str) -> Result<Self, Self::Error> {
        parse_set_cookie(wire)
    }

    fn canonical(&self) -> String {
        serialize_set_cookie(self)
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_set_cookie(self))
    }
}

impl FromStr for Cookie {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_set_cookie(s)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::{Cookie, SameSite, parse_set_cookie, serialize_set_cookie};
    use crate::error::CookieError;
    use crate::value::HeaderValue;

    #[test]
    fn parses_name_and_value_only() {
        let cookie = parse_set_cookie("user=x").unwrap();
        assert_eq!(cookie, Cookie::new("user", "x"));
        assert_eq!(cookie.max_age, None);
        assert_eq!(cookie.same_site, SameSite::Lax);
    }

    #[test]
    fn value_may_be_empty() {
        let cookie = parse_set_cookie("user=; Path=/").unwrap();
        assert_eq!(cookie.value, "");
        assert_eq!(cookie.path.as_deref(), Some("/"));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let cookie = parse_set_cookie("token=a=b==").unwrap();
        assert_eq!(cookie.value, "a=b==");
    }

    #[test]
    fn parses_every_attribute_case_insensitively() {
        let cookie = parse_set_cookie(
            "id=a3fWa; DOMAIN=example.com; path=/docs; SECURE; httpOnly; Max-Age=2592000; \
             expires=Wed, 21 Oct 2015 07:28:00 GMT; samesite=strict",
        )
        .unwrap();

        assert_eq!(cookie.domain.as_deref(), Some("example.com"));
        assert_eq!(cookie.path.as_deref(), Some("/docs"));
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.max_age, Some(2_592_000));
        assert_eq!(
            cookie.expires,
            Some(Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap())
        );
        assert_eq!(cookie.same_site, SameSite::Strict);
    }

    #[test]
    fn max_age_zero_and_negative_are_kept() {
        assert_eq!(parse_set_cookie("user=x; max-age=0").unwrap().max_age, Some(0));
        assert_eq!(parse_set_cookie("user=x; max-age=-1").unwrap().max_age, Some(-1));
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let cookie = parse_set_cookie("user=x; Priority=High; Partitioned").unwrap();
        assert_eq!(cookie, Cookie::new("user", "x"));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_matches!(parse_set_cookie("   "), Err(CookieError::EmptyHeader));
        assert_matches!(
            parse_set_cookie("novalue; Path=/"),
            Err(CookieError::MissingCookieValue(raw)) if raw == "novalue"
        );
        assert_matches!(parse_set_cookie(" =x"), Err(CookieError::MissingCookieName(_)));
        assert_matches!(
            parse_set_cookie("user=x; max-age=soon"),
            Err(CookieError::InvalidMaxAge(raw)) if raw == "soon"
        );
        assert_matches!(
            parse_set_cookie("user=x; SameSite=sometimes"),
            Err(CookieError::UnknownSameSite(raw)) if raw == "sometimes"
        );
        assert_matches!(
            parse_set_cookie("user=x; Expires=Wed, 21 Oct 1500 07:28:00 GMT"),
            Err(CookieError::InvalidExpiresYear(_))
        );
    }

    #[test]
    fn serializes_in_fixed_attribute_order() {
        let cookie = Cookie::builder("user", "x")
            .max_age(60)
            .http_only(true)
            .secure(true)
            .path("/")
            .domain("example.com")
            .build()
            .unwrap();

        assert_eq!(
            serialize_set_cookie(&cookie),
            "user=x; Domain=example.com; Path=/; secure; HttpOnly; max-age=60"
        );
    }

    #[test]
    fn serializes_expires_and_non_default_same_site() {
        let cookie = Cookie::builder("user", "x")
            .expires(Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap())
            .same_site(SameSite::None)
            .build()
            .unwrap();

        assert_eq!(
            serialize_set_cookie(&cookie),
            "user=x; Expires=Wed, 21 Oct 2015 07:28:00 GMT; SameSite=None"
        );
    }

    #[test]
    fn builder_drops_subsecond_expiry() {
        let whole = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        let cookie = Cookie::builder("user", "x")
            .expires(whole + chrono::Duration::nanoseconds(1))
            .build()
            .unwrap();

        assert_eq!(cookie.expires, Some(whole));
        assert!(cookie.matches(&cookie.canonical()).unwrap());
    }

    #[test]
    fn builder_rejects_cookies_that_do_not_read_back() {
        assert_matches!(
            Cookie::builder("a", "b").domain("").build(),
            Err(CookieError::UnrepresentableCookie(raw)) if raw == "a=b; Domain="
        );
        assert_matches!(
            Cookie::builder("a", "b").path("").build(),
            Err(CookieError::UnrepresentableCookie(_))
        );
        assert_matches!(
            Cookie::builder("a;x", "b").build(),
            Err(CookieError::UnrepresentableCookie(raw)) if raw == "a;x=b"
        );
        assert_matches!(
            Cookie::builder("a", "b; Secure").build(),
            Err(CookieError::UnrepresentableCookie(_))
        );
        assert_matches!(
            Cookie::builder("", "b").build(),
            Err(CookieError::UnrepresentableCookie(_))
        );
        assert_matches!(
            Cookie::builder("a", "b")
                .expires(Utc.with_ymd_and_hms(1500, 1, 1, 0, 0, 0).unwrap())
                .build(),
            Err(CookieError::UnrepresentableCookie(_))
        );
    }
}
