use headermatch_codec::{
    CacheControlValue, Cookie, CspPolicy, HeaderError, HeaderValue, HttpDate,
};

use crate::error::AssertError;

/// Which grammar a header's values are compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    ContentSecurityPolicy,
    CacheControl,
    SetCookie,
    Date,
    /// Compared as trimmed text.
    Text,
}

impl HeaderKind {
    pub fn for_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "content-security-policy" | "content-security-policy-report-only" => {
                HeaderKind::ContentSecurityPolicy
            }
            "cache-control" => HeaderKind::CacheControl,
            "set-cookie" => HeaderKind::SetCookie,
            "date" | "expires" | "last-modified" | "if-modified-since" => HeaderKind::Date,
            _ => HeaderKind::Text,
        }
    }

    /// Parses `expected` with this kind's grammar and matches `actual` against it.
    /// A malformed `expected` is an [`AssertError::Expectation`], a malformed
    /// `actual` an [`AssertError::Header`].
    pub fn matches(&self, expected: &str, actual: &str) -> Result<bool, AssertError> {
        match self {
            HeaderKind::ContentSecurityPolicy => structural::<CspPolicy>(expected, actual),
            HeaderKind::CacheControl => structural::<CacheControlValue>(expected, actual),
            HeaderKind::SetCookie => structural::<Cookie>(expected, actual),
            HeaderKind::Date => structural::<HttpDate>(expected, actual),
            HeaderKind::Text => Ok(expected.trim() == actual.trim()),
        }
    }
}

fn structural<V>(expected: &str, actual: &str) -> Result<bool, AssertError>
where
    V: HeaderValue,
    HeaderError: From<V::Error>,
{
    let expected =
        V::parse(expected).map_err(|err| AssertError::Expectation(HeaderError::from(err)))?;
    Ok(expected.matches(actual).map_err(HeaderError::from)?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use headermatch_codec::{CacheControlError, HeaderError};

    use super::HeaderKind;
    use crate::error::AssertError;

    #[test]
    fn selects_kind_case_insensitively() {
        assert_eq!(
            HeaderKind::for_name("Content-Security-Policy"),
            HeaderKind::ContentSecurityPolicy
        );
        assert_eq!(
            HeaderKind::for_name("content-security-policy-report-only"),
            HeaderKind::ContentSecurityPolicy
        );
        assert_eq!(HeaderKind::for_name("CACHE-CONTROL"), HeaderKind::CacheControl);
        assert_eq!(HeaderKind::for_name("Set-Cookie"), HeaderKind::SetCookie);
        assert_eq!(HeaderKind::for_name("Last-Modified"), HeaderKind::Date);
        assert_eq!(HeaderKind::for_name("X-Frame-Options"), HeaderKind::Text);
    }

    #[test]
    fn compares_each_kind_structurally() {
        assert!(
            HeaderKind::ContentSecurityPolicy
                .matches("script-src 'self' https:;", "script-src https: 'self'")
                .unwrap()
        );
        assert!(
            HeaderKind::CacheControl
                .matches("no-store, max-age=0", "max-age=0,no-store")
                .unwrap()
        );
        assert!(
            HeaderKind::Date
                .matches(
                    "Sun, 06 Nov 1994 08:49:37 GMT",
                    "Sun Nov  6 08:49:37 1994"
                )
                .unwrap()
        );
        assert!(HeaderKind::Text.matches("DENY", " DENY ").unwrap());
        assert!(!HeaderKind::Text.matches("DENY", "deny").unwrap());
    }

    #[test]
    fn separates_bad_expectations_from_bad_actual_values() {
        assert_matches!(
            HeaderKind::CacheControl.matches("max-age=soon", "max-age=60"),
            Err(AssertError::Expectation(HeaderError::CacheControl(
                CacheControlError::InvalidCacheControlInteger { .. }
            )))
        );
        assert_matches!(
            HeaderKind::CacheControl.matches("max-age=60", "max-age=soon"),
            Err(AssertError::Header(HeaderError::CacheControl(_)))
        );
        assert_matches!(
            HeaderKind::SetCookie.matches("=x", "a=1"),
            Err(AssertError::Expectation(HeaderError::Cookie(_)))
        );
    }
}
