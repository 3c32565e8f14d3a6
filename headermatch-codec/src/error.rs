use thiserror::Error;

use crate::csp::Directive;

pub const ACCEPTED_DATE_FORMATS: &str = "EEE, dd MMM yyyy HH:mm:ss zzz | EEEE, dd-MMM-yy HH:mm:ss zzz | EEE MMM d HH:mm:ss yyyy";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("invalid date format: {0:?} (accepted: {ACCEPTED_DATE_FORMATS})")]
    InvalidDateFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    #[error("empty set-cookie header")]
    EmptyHeader,
    #[error("missing cookie name: {0:?}")]
    MissingCookieName(String),
    #[error("missing cookie value: {0:?}")]
    MissingCookieValue(String),
    #[error("invalid max-age: {0:?}")]
    InvalidMaxAge(String),
    #[error("unknown samesite value: {0:?}")]
    UnknownSameSite(String),
    #[error("invalid expires year: {0:?}")]
    InvalidExpiresYear(String),
    #[error("invalid expires month: {0:?}")]
    InvalidExpiresMonth(String),
    #[error("invalid expires day: {0:?}")]
    InvalidExpiresDay(String),
    #[error("invalid expires hour: {0:?}")]
    InvalidExpiresHour(String),
    #[error("invalid expires minute: {0:?}")]
    InvalidExpiresMinute(String),
    #[error("invalid expires second: {0:?}")]
    InvalidExpiresSecond(String),
    #[error("cookie does not read back from {0:?}")]
    UnrepresentableCookie(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheControlError {
    #[error("invalid integer for {directive}: {value:?}")]
    InvalidCacheControlInteger { directive: String, value: String },
}

/// Failures while reading a policy from wire text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CspError {
    #[error("unknown directive: {0:?}")]
    UnknownDirective(String),
    #[error("empty directive name")]
    EmptyDirectiveName,
    #[error("invalid source expression: {0:?}")]
    InvalidSourceSyntax(String),
}

/// Failures while assembling an expected policy through [`crate::CspPolicyBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("frame-ancestors only accepts host or scheme sources, got {0}")]
    InvalidFrameAncestorSource(String),
    #[error("{directive} does not accept {source_text}")]
    SourceNotAllowed {
        directive: Directive,
        source_text: String,
    },
    #[error("{0} requires at least one source")]
    EmptySourceList(Directive),
    #[error("invalid source: {0}")]
    InvalidSource(#[from] CspError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error(transparent)]
    Date(#[from] DateError),
    #[error(transparent)]
    Cookie(#[from] CookieError),
    #[error(transparent)]
    CacheControl(#[from] CacheControlError),
    #[error(transparent)]
    Csp(#[from] CspError),
}
