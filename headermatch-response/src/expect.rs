use headermatch_codec::{Cookie, HeaderError, HeaderValue};

use crate::error::AssertError;
use crate::kind::HeaderKind;
use crate::response::HttpResponse;

pub fn expect_status(response: &impl HttpResponse, expected: u16) -> Result<(), AssertError> {
    let actual = response.status();
    if actual != expected {
        return Err(AssertError::Status { expected, actual });
    }
    Ok(())
}

/// Checks that some value of `name` means the same as `expected`, using the
/// grammar [`HeaderKind::for_name`] picks for the header.
///
/// A malformed actual value fails the check even if a later value would match.
pub fn expect_header(
    response: &impl HttpResponse,
    name: &str,
    expected: &str,
) -> Result<(), AssertError> {
    let kind = HeaderKind::for_name(name);
    let actual = response.header(name);
    if actual.is_empty() {
        return Err(AssertError::MissingHeader(name.to_string()));
    }

    for value in &actual {
        if kind.matches(expected, value)? {
            log::debug!("{name} matched {value:?} as {kind:?}");
            return Ok(());
        }
    }

    Err(AssertError::Mismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        actual: actual.join(", "),
    })
}

/// Like [`expect_header`], with an already-built expected value.
pub fn expect_value<V>(
    response: &impl HttpResponse,
    name: &str,
    expected: &V,
) -> Result<(), AssertError>
where
    V: HeaderValue,
    HeaderError: From<V::Error>,
{
    let actual = response.header(name);
    if actual.is_empty() {
        return Err(AssertError::MissingHeader(name.to_string()));
    }

    for value in &actual {
        if expected.matches(value).map_err(HeaderError::from)? {
            return Ok(());
        }
    }

    Err(AssertError::Mismatch {
        name: name.to_string(),
        expected: expected.canonical(),
        actual: actual.join(", "),
    })
}

/// Checks that one of the response's cookies equals `expected` attribute for attribute.
pub fn expect_cookie(response: &impl HttpResponse, expected: &Cookie) -> Result<(), AssertError> {
    let cookies = response.cookies().map_err(HeaderError::from)?;
    if cookies.iter().any(|cookie| cookie == expected) {
        return Ok(());
    }
    log::debug!(
        "cookie {} not among {} set-cookie headers",
        expected.name,
        cookies.len()
    );
    Err(AssertError::MissingCookie(expected.canonical()))
}
