mod cache_control;
mod cookie;
pub mod csp;
mod date;
mod error;
pub mod token;
mod value;

pub use cache_control::{
    CacheControlBuilder, CacheControlValue, Visibility, parse_cache_control,
    serialize_cache_control,
};
pub use cookie::{Cookie, CookieBuilder, SameSite, parse_set_cookie, serialize_set_cookie};
pub use csp::{
    CspPolicy, CspPolicyBuilder, Directive, HashAlgorithm, HostSource, Keyword, Port,
    SandboxToken, Source, SourceList, parse_policy, serialize_policy,
};
pub use date::{HttpDate, Timestamp, format_http_date, parse_cookie_date, parse_http_date};
pub use error::{
    ACCEPTED_DATE_FORMATS, CacheControlError, CookieError, CspError, DateError, HeaderError,
    PolicyError,
};
pub use value::HeaderValue;
