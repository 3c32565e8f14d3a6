//! Content-Security-Policy (CSP level 2) header values.

mod directive;
mod policy;
mod source;

pub use directive::Directive;
pub use policy::{CspPolicy, CspPolicyBuilder, SourceList, parse_policy, serialize_policy};
pub use source::{HashAlgorithm, HostSource, Keyword, Port, SandboxToken, Source};
