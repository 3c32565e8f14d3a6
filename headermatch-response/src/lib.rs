mod config;
mod error;
mod expect;
mod kind;
mod response;

pub use config::{CookieExpectation, ExpectationFile};
pub use error::AssertError;
pub use expect::{expect_cookie, expect_header, expect_status, expect_value};
pub use kind::HeaderKind;
pub use response::HttpResponse;
