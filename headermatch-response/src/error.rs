use headermatch_codec::HeaderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssertError {
    #[error("expected status {expected}, got {actual}")]
    Status { expected: u16, actual: u16 },
    #[error("missing header: {0}")]
    MissingHeader(String),
    #[error("header {name} mismatch: expected {expected:?}, got {actual:?}")]
    Mismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("no set-cookie header matches {0:?}")]
    MissingCookie(String),
    /// The header value under test did not parse.
    #[error("malformed header value: {0}")]
    Header(#[from] HeaderError),
    /// The expected value did not parse.
    #[error("malformed expectation: {0}")]
    Expectation(HeaderError),
    #[error("expectation file error: {0}")]
    Config(String),
}
