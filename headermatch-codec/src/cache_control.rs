//! `Cache-Control` response directives (RFC 7234 §5.2.2).

use std::fmt;
use std::str::FromStr;

use crate::error::CacheControlError;
use crate::token::{self, Pair};
use crate::value::HeaderValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }
}

/// Absent directives are `None`/`false` and are not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CacheControlValue {
    pub visibility: Option<Visibility>,
    pub no_cache: bool,
    pub no_store: bool,
    pub no_transform: bool,
    pub must_revalidate: bool,
    pub proxy_revalidate: bool,
    pub max_age: Option<i64>,
    pub s_maxage: Option<i64>,
}

impl CacheControlValue {
    pub fn builder() -> CacheControlBuilder {
        CacheControlBuilder::default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheControlBuilder {
    value: CacheControlValue,
}

impl CacheControlBuilder {
    pub fn private(mut self) -> Self {
        self.value.visibility = Some(Visibility::Private);
        self
    }

    pub fn public(mut self) -> Self {
        self.value.visibility = Some(Visibility::Public);
        self
    }

    pub fn no_cache(mut self) -> Self {
        self.value.no_cache = true;
        self
    }

    pub fn no_store(mut self) -> Self {
        self.value.no_store = true;
        self
    }

    pub fn no_transform(mut self) -> Self {
        self.value.no_transform = true;
        self
    }

    pub fn must_revalidate(mut self) -> Self {
        self.value.must_revalidate = true;
        self
    }

    pub fn proxy_revalidate(mut self) -> Self {
        self.value.proxy_revalidate = true;
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.value.max_age = Some(seconds);
        self
    }

    pub fn s_maxage(mut self, seconds: i64) -> Self {
        self.value.s_maxage = Some(seconds);
        self
    }

    pub fn build(self) -> CacheControlValue {
        self.value
    }
}

#[derive(Debug, Clone, Copy)]
enum DirectiveMatcher {
    Visibility,
    Flag(&'static str, fn(CacheControlBuilder) -> CacheControlBuilder),
    Seconds(&'static str, fn(CacheControlBuilder, i64) -> CacheControlBuilder),
}

/// Tried in order; the first matcher that recognises a directive consumes it.
/// Directives no matcher recognises are skipped.
const MATCHERS: [DirectiveMatcher; 8] = [
    DirectiveMatcher::Visibility,
    DirectiveMatcher::Flag("no-cache", CacheControlBuilder::no_cache),
    DirectiveMatcher::Flag("no-store", CacheControlBuilder::no_store),
    DirectiveMatcher::Flag("no-transform", CacheControlBuilder::no_transform),
    DirectiveMatcher::Flag("must-revalidate", CacheControlBuilder::must_revalidate),
    DirectiveMatcher::Flag("proxy-revalidate", CacheControlBuilder::proxy_revalidate),
    DirectiveMatcher::Seconds("max-age", CacheControlBuilder::max_age),
    DirectiveMatcher::Seconds("s-maxage", CacheControlBuilder::s_maxage),
];

impl DirectiveMatcher {
    fn apply(
        self,
        builder: CacheControlBuilder,
        pair: Pair<'_>,
    ) -> Result<Option<CacheControlBuilder>, CacheControlError> {
        let matched = match self {
            DirectiveMatcher::Visibility if flag(pair, "private") => Some(builder.private()),
            DirectiveMatcher::Visibility if flag(pair, "public") => Some(builder.public()),
            DirectiveMatcher::Visibility => None,
            DirectiveMatcher::Flag(name, set) if flag(pair, name) => {
                if let Some(fields) = pair.value {
                    log::debug!("cache-control {name} field list {fields:?} not kept");
                }
                Some(set(builder))
            }
            DirectiveMatcher::Flag(..) => None,
            DirectiveMatcher::Seconds(name, set) => {
                seconds(pair, name)?.map(|value| set(builder, value))
            }
        };
        Ok(matched)
    }
}

fn flag(pair: Pair<'_>, name: &str) -> bool {
    pair.name.eq_ignore_ascii_case(name)
}

fn seconds(pair: Pair<'_>, name: &str) -> Result<Option<i64>, CacheControlError> {
    if !pair.name.eq_ignore_ascii_case(name) {
        return Ok(None);
    }
    let raw = pair.value.unwrap_or_default();
    token::unquote(raw, '"')
        .parse::<i64>()
        .map(Some)
        .map_err(|_| CacheControlError::InvalidCacheControlInteger {
            directive: name.to_string(),
            value: raw.to_string(),
        })
}

pub fn parse_cache_control(header: &str) -> Result<CacheControlValue, CacheControlError> {
    let mut builder = CacheControlValue::builder();

    'directives: for directive in token::split_list(header, ',') {
        let pair = token::split_pair(directive);
        for matcher in MATCHERS {
            if let Some(next) = matcher.apply(builder, pair)? {
                log::trace!("cache-control directive {directive:?}");
                builder = next;
                continue 'directives;
            }
        }
        log::debug!("ignoring cache-control directive {directive:?}");
    }

    Ok(builder.build())
}

pub fn serialize_cache_control(value: &CacheControlValue) -> String {
    let mut directives: Vec<String> = Vec::new();
    if let Some(visibility) = value.visibility {
        directives.push(visibility.as_str().to_string());
    }
    for (enabled, name) in [
        (value.no_cache, "no-cache"),
        (value.no_store, "no-store"),
        (value.no_transform, "no-transform"),
        (value.must_revalidate, "must-revalidate"),
        (value.proxy_revalidate, "proxy-revalidate"),
    ] {
        if enabled {
            directives.push(name.to_string());
        }
    }
    if let Some(max_age) = value.max_age {
        directives.push(format!("max-age={max_age}"));
    }
    if let Some(s_maxage) = value.s_maxage {
        directives.push(format!("s-maxage={s_maxage}"));
    }
    directives.join(", ")
}

impl HeaderValue for CacheControlValue {
    type Error = CacheControlError;

    fn parse(wire: &str) -> Result<Self, Self::Error> {
        parse_cache_control(wire)
    }

    fn canonical(&self) -> String {
        serialize_cache_control(self)
    }
}

impl fmt::Display for CacheControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_cache_control(self))
    }
}

impl FromStr for CacheControlValue {
    type Err = CacheControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cache_control(s)
    }
}
