use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use sha2::Digest;

use crate::error::CspError;
use crate::token;

const BASE64_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const BASE64URL_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    SelfOrigin,
    None,
    UnsafeEval,
    UnsafeInline,
}

impl Keyword {
    const ALL: [Keyword; 4] = [
        Keyword::SelfOrigin,
        Keyword::None,
        Keyword::UnsafeEval,
        Keyword::UnsafeInline,
    ];

    /// The keyword without its surrounding quotes.
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::SelfOrigin => "self",
            Keyword::None => "none",
            Keyword::UnsafeEval => "unsafe-eval",
            Keyword::UnsafeInline => "unsafe-inline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    fn digest(&self, content: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => sha2::Sha256::digest(content).to_vec(),
            HashAlgorithm::Sha384 => sha2::Sha384::digest(content).to_vec(),
            HashAlgorithm::Sha512 => sha2::Sha512::digest(content).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxToken {
    AllowForms,
    AllowPointerLock,
    AllowPopups,
    AllowSameOrigin,
    AllowScripts,
    AllowTopNavigation,
}

impl SandboxToken {
    pub const ALL: [SandboxToken; 6] = [
        SandboxToken::AllowForms,
        SandboxToken::AllowPointerLock,
        SandboxToken::AllowPopups,
        SandboxToken::AllowSameOrigin,
        SandboxToken::AllowScripts,
        SandboxToken::AllowTopNavigation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SandboxToken::AllowForms => "allow-forms",
            SandboxToken::AllowPointerLock => "allow-pointer-lock",
            SandboxToken::AllowPopups => "allow-popups",
            SandboxToken::AllowSameOrigin => "allow-same-origin",
            SandboxToken::AllowScripts => "allow-scripts",
            SandboxToken::AllowTopNavigation => "allow-top-navigation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Number(u16),
    /// `:*`
    Any,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Number(port) => write!(f, "{port}"),
            Port::Any => f.write_str("*"),
        }
    }
}

/// `[scheme://]host[:port][/path]`. Scheme and host are stored lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostSource {
    scheme: Option<String>,
    host: String,
    port: Option<Port>,
    path: Option<String>,
}

impl HostSource {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            scheme: None,
            host: host.into().to_ascii_lowercase(),
            port: None,
            path: None,
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into().to_ascii_lowercase());
        self
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.port = Some(port);
        self
    }

    /// `path` should start with `/`.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<Port> {
        self.port
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl fmt::Display for HostSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = &self.port {
            write!(f, ":{port}")?;
        }
        if let Some(path) = &self.path {
            f.write_str(path)?;
        }
        Ok(())
    }
}

/// One permitted value inside a directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Keyword(Keyword),
    /// Scheme name without the trailing `:`.
    Scheme(String),
    Nonce(String),
    Hash {
        algorithm: HashAlgorithm,
        digest: String,
    },
    Host(HostSource),
    /// A bare `*`.
    Wildcard,
    MediaType(String),
    Uri(String),
    Sandbox(SandboxToken),
}

impl Source {
    pub const SELF: Source = Source::Keyword(Keyword::SelfOrigin);
    pub const NONE: Source = Source::Keyword(Keyword::None);
    pub const UNSAFE_EVAL: Source = Source::Keyword(Keyword::UnsafeEval);
    pub const UNSAFE_INLINE: Source = Source::Keyword(Keyword::UnsafeInline);

    pub fn scheme(scheme: &str) -> Result<Self, CspError> {
        let name = scheme.strip_suffix(':').unwrap_or(scheme);
        parse_scheme_source(&format!("{name}:"))
            .ok_or_else(|| CspError::InvalidSourceSyntax(scheme.to_string()))
    }

    /// A host source, e.g. `https://*.example.com:443/static/`.
    pub fn host(text: &str) -> Result<Self, CspError> {
        parse_host_source(text)
            .map(Source::Host)
            .ok_or_else(|| CspError::InvalidSourceSyntax(text.to_string()))
    }

    pub fn nonce(value: &str) -> Result<Self, CspError> {
        if is_base64_value(value) {
            Ok(Source::Nonce(value.to_string()))
        } else {
            Err(CspError::InvalidSourceSyntax(value.to_string()))
        }
    }

    pub fn hash(algorithm: HashAlgorithm, digest: &str) -> Result<Self, CspError> {
        let decoded = BASE64_ANY_PADDING
            .decode(digest)
            .or_else(|_| BASE64URL_ANY_PADDING.decode(digest))
            .map_err(|_| CspError::InvalidSourceSyntax(digest.to_string()))?;
        if decoded.len() != algorithm.digest_len() {
            return Err(CspError::InvalidSourceSyntax(digest.to_string()));
        }
        Ok(Source::Hash {
            algorithm,
            digest: digest.to_string(),
        })
    }

    /// The hash source that allows exactly `content` as an inline script or style.
    pub fn hash_of(algorithm: HashAlgorithm, content: &[u8]) -> Self {
        Source::Hash {
            algorithm,
            digest: STANDARD.encode(algorithm.digest(content)),
        }
    }

    pub fn media_type(text: &str) -> Result<Self, CspError> {
        parse_media_type(text)
    }

    pub fn uri(text: &str) -> Result<Self, CspError> {
        parse_uri(text)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Keyword(keyword) => write!(f, "'{}'", keyword.name()),
            Source::Scheme(scheme) => write!(f, "{scheme}:"),
            Source::Nonce(value) => write!(f, "'nonce-{value}'"),
            Source::Hash { algorithm, digest } => write!(f, "'{}-{digest}'", algorithm.name()),
            Source::Host(host) => write!(f, "{host}"),
            Source::Wildcard => f.write_str("*"),
            Source::MediaType(media_type) => f.write_str(media_type),
            Source::Uri(uri) => f.write_str(uri),
            Source::Sandbox(token) => f.write_str(token.name()),
        }
    }
}

/// Parses a source expression as it appears in fetch directives.
impl FromStr for Source {
    type Err = CspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_source_expression(s)
    }
}

pub(crate) fn parse_source_expression(text: &str) -> Result<Source, CspError> {
    let invalid = || CspError::InvalidSourceSyntax(text.to_string());
    log::trace!("csp source {text:?}");

    if text == "*" {
        return Ok(Source::Wildcard);
    }

    if text.starts_with('\'') {
        if !token::is_quoted(text, '\'') {
            return Err(invalid());
        }
        return parse_quoted(token::unquote(text, '\'')).ok_or_else(invalid);
    }

    if let Some(source) = parse_scheme_source(text) {
        return Ok(source);
    }

    parse_host_source(text).map(Source::Host).ok_or_else(invalid)
}

fn parse_quoted(inner: &str) -> Option<Source> {
    if let Some(keyword) = Keyword::ALL
        .into_iter()
        .find(|keyword| keyword.name().eq_ignore_ascii_case(inner))
    {
        return Some(Source::Keyword(keyword));
    }

    let (prefix, value) = inner.split_once('-')?;
    if prefix.eq_ignore_ascii_case("nonce") {
        return Source::nonce(value).ok();
    }
    let algorithm = HashAlgorithm::ALL
        .into_iter()
        .find(|algorithm| algorithm.name().eq_ignore_ascii_case(prefix))?;
    Source::hash(algorithm, value).ok()
}

/// `scheme ":"` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn parse_scheme_source(text: &str) -> Option<Source> {
    let scheme = text.strip_suffix(':')?;
    is_scheme(scheme).then(|| Source::Scheme(scheme.to_ascii_lowercase()))
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn parse_host_source(text: &str) -> Option<HostSource> {
    let (scheme, rest) = match text.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => (Some(scheme), rest),
        Some(_) => return None,
        None => (None, text),
    };

    let host_end = rest.find([':', '/']).unwrap_or(rest.len());
    let host = &rest[..host_end];
    if !is_host_pattern(host) {
        return None;
    }
    let mut source = HostSource::new(host);
    if let Some(scheme) = scheme {
        source = source.with_scheme(scheme);
    }

    let mut rest = &rest[host_end..];
    if let Some(after_colon) = rest.strip_prefix(':') {
        let port_end = after_colon.find('/').unwrap_or(after_colon.len());
        let port = match &after_colon[..port_end] {
            "*" => Port::Any,
            digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                Port::Number(digits.parse().ok()?)
            }
            _ => return None,
        };
        source = source.with_port(port);
        rest = &after_colon[port_end..];
    }

    if !rest.is_empty() {
        if !rest.starts_with('/') || rest.contains([',', ';', ' ', '\t']) {
            return None;
        }
        source = source.with_path(rest);
    }

    Some(source)
}

/// `"*" / [ "*." ] 1*host-char *( "." 1*host-char )`
fn is_host_pattern(host: &str) -> bool {
    if host == "*" {
        return true;
    }
    let labels = host.strip_prefix("*.").unwrap_or(host);
    !labels.is_empty()
        && labels.split('.').all(|label| {
            !label.is_empty() && label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
        })
}

/// `1*( ALPHA / DIGIT / "+" / "/" / "-" / "_" ) *2"="`
fn is_base64_value(value: &str) -> bool {
    let body = value.trim_end_matches('=');
    value.len() - body.len() <= 2
        && !body.is_empty()
        && body
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '/' | '-' | '_'))
}

pub(crate) fn parse_media_type(text: &str) -> Result<Source, CspError> {
    let is_token = |part: &str| {
        !part.is_empty()
            && part.chars().all(|ch| {
                ch.is_ascii_alphanumeric()
                    || matches!(ch, '!' | '#' | '$' | '&' | '^' | '_' | '.' | '+' | '-')
            })
    };
    match text.split_once('/') {
        Some((kind, subtype)) if is_token(kind) && is_token(subtype) => {
            Ok(Source::MediaType(text.to_ascii_lowercase()))
        }
        _ => Err(CspError::InvalidSourceSyntax(text.to_string())),
    }
}

/// Absolute URIs and references relative to the protected resource.
pub(crate) fn parse_uri(text: &str) -> Result<Source, CspError> {
    let invalid = || CspError::InvalidSourceSyntax(text.to_string());
    if text.is_empty() || text.contains([',', ';']) {
        return Err(invalid());
    }
    match url::Url::parse(text) {
        Ok(_) => Ok(Source::Uri(text.to_string())),
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse("http://localhost/")
            .and_then(|base| base.join(text))
            .map(|_| Source::Uri(text.to_string()))
            .map_err(|_| invalid()),
        Err(_) => Err(invalid()),
    }
}

pub(crate) fn parse_sandbox_token(text: &str) -> Result<Source, CspError> {
    SandboxToken::ALL
        .into_iter()
        .find(|token| token.name().eq_ignore_ascii_case(text))
        .map(Source::Sandbox)
        .ok_or_else(|| CspError::InvalidSourceSyntax(text.to_string()))
}

pub(crate) fn reject_value(text: &str) -> Result<Source, CspError> {
    Err(CspError::InvalidSourceSyntax(text.to_string()))
}
