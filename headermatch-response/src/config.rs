use std::collections::BTreeMap;
use std::path::Path;

use headermatch_codec::{Cookie, HeaderError, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::AssertError;
use crate::expect::{expect_cookie, expect_header, expect_status};
use crate::response::HttpResponse;

/// Expected response headers kept in a TOML file.
///
/// ```toml
/// status = 200
///
/// [headers]
/// cache-control = "no-store"
/// content-security-policy = "default-src 'self';"
///
/// [[cookies]]
/// set_cookie = "session=abc; Path=/; Secure; HttpOnly"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExpectationFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub headers: BTreeMap<String, String>,
    pub cookies: Vec<CookieExpectation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CookieExpectation {
    pub set_cookie: String,
}

impl ExpectationFile {
    pub fn load(path: &Path) -> Result<Self, AssertError> {
        let raw =
            std::fs::read_to_string(path).map_err(|err| AssertError::Config(err.to_string()))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AssertError> {
        toml::from_str(raw).map_err(|err| AssertError::Config(err.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), AssertError> {
        let contents =
            toml::to_string_pretty(self).map_err(|err| AssertError::Config(err.to_string()))?;
        std::fs::write(path, contents).map_err(|err| AssertError::Config(err.to_string()))
    }

    /// Checks status, then headers in name order, then cookies. Stops at the
    /// first failure.
    pub fn verify(&self, response: &impl HttpResponse) -> Result<(), AssertError> {
        if let Some(status) = self.status {
            expect_status(response, status)?;
        }
        for (name, expected) in &self.headers {
            expect_header(response, name, expected)?;
        }
        for cookie in &self.cookies {
            let expected = Cookie::parse(&cookie.set_cookie)
                .map_err(|err| AssertError::Expectation(HeaderError::from(err)))?;
            expect_cookie(response, &expected)?;
        }
        log::debug!(
            "verified {} headers and {} cookies",
            self.headers.len(),
            self.cookies.len()
        );
        Ok(())
    }
}
