use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::directive::Directive;
use super::source::{SandboxToken, Source};
use crate::error::{CspError, PolicyError};
use crate::token;
use crate::value::HeaderValue;

/// The sources of one directive. Duplicates are dropped on insert and
/// first-seen order is kept for rendering, but equality ignores order.
#[derive(Debug, Clone, Default, Eq)]
pub struct SourceList {
    sources: Vec<Source>,
}

impl SourceList {
    pub fn insert(&mut self, source: Source) -> bool {
        if self.sources.contains(&source) {
            return false;
        }
        self.sources.push(source);
        true
    }

    pub fn contains(&self, source: &Source) -> bool {
        self.sources.contains(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl PartialEq for SourceList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|source| other.contains(source))
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

/// An immutable Content-Security-Policy. Build expected policies with
/// [`CspPolicy::builder`], read actual ones with [`parse_policy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspPolicy {
    directives: BTreeMap<Directive, SourceList>,
}

impl CspPolicy {
    pub fn builder() -> CspPolicyBuilder {
        CspPolicyBuilder::default()
    }

    pub fn sources(&self, directive: Directive) -> Option<&SourceList> {
        self.directives.get(&directive)
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.directives.contains_key(&directive)
    }

    /// Present directives in declaration order.
    pub fn directives(&self) -> impl Iterator<Item = Directive> + '_ {
        self.directives.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

type Validator = fn(Directive, &Source) -> Result<(), PolicyError>;

/// Accumulates directives; adding to an existing directive extends its list.
/// The first validation failure is kept and reported by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct CspPolicyBuilder {
    directives: BTreeMap<Directive, SourceList>,
    error: Option<PolicyError>,
}

impl CspPolicyBuilder {
    pub fn base_uri(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::BaseUri, sources, fetch_source)
    }

    pub fn default_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::DefaultSrc, sources, fetch_source)
    }

    pub fn script_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::ScriptSrc, sources, fetch_source)
    }

    pub fn style_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::StyleSrc, sources, fetch_source)
    }

    pub fn object_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::ObjectSrc, sources, fetch_source)
    }

    pub fn media_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::MediaSrc, sources, fetch_source)
    }

    pub fn img_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::ImgSrc, sources, fetch_source)
    }

    pub fn font_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::FontSrc, sources, fetch_source)
    }

    pub fn connect_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::ConnectSrc, sources, fetch_source)
    }

    pub fn child_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::ChildSrc, sources, fetch_source)
    }

    pub fn form_action(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::FormAction, sources, fetch_source)
    }

    /// Only host, wildcard and scheme sources are accepted.
    pub fn frame_ancestors(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::FrameAncestors, sources, frame_ancestor_source)
    }

    pub fn plugin_types(self, media_types: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::PluginTypes, media_types, media_type_source)
    }

    pub fn report_uri(self, uris: impl IntoIterator<Item = Source>) -> Self {
        self.add(Directive::ReportUri, uris, uri_source)
    }

    pub fn sandbox(self, tokens: impl IntoIterator<Item = SandboxToken>) -> Self {
        self.add(
            Directive::Sandbox,
            tokens.into_iter().map(Source::Sandbox),
            sandbox_source,
        )
    }

    pub fn block_all_mixed_content(self) -> Self {
        self.add(Directive::BlockAllMixedContent, std::iter::empty(), reject_source)
    }

    pub fn build(self) -> Result<CspPolicy, PolicyError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(CspPolicy {
                directives: self.directives,
            }),
        }
    }

    fn add(
        mut self,
        directive: Directive,
        sources: impl IntoIterator<Item = Source>,
        validate: Validator,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let sources: Vec<Source> = sources.into_iter().collect();
        if sources.is_empty() && !directive.is_flag() {
            self.error = Some(PolicyError::EmptySourceList(directive));
            return self;
        }
        if let Some(error) = sources
            .iter()
            .find_map(|source| check_source(directive, source, validate).err())
        {
            self.error = Some(error);
            return self;
        }

        let list = self.directives.entry(directive).or_default();
        for source in sources {
            list.insert(source);
        }
        self
    }
}

/// Runs the directive-specific validator, then requires that the source
/// reads back unchanged from its own rendering so built policies round-trip.
fn check_source(
    directive: Directive,
    source: &Source,
    validate: Validator,
) -> Result<(), PolicyError> {
    validate(directive, source)?;
    let reparsed = (directive.source_parser())(&source.to_string())?;
    if reparsed != *source {
        return Err(PolicyError::InvalidSource(CspError::InvalidSourceSyntax(
            source.to_string(),
        )));
    }
    Ok(())
}

fn not_allowed(directive: Directive, source: &Source) -> PolicyError {
    PolicyError::SourceNotAllowed {
        directive,
        source_text: source.to_string(),
    }
}

fn fetch_source(directive: Directive, source: &Source) -> Result<(), PolicyError> {
    match source {
        Source::Keyword(_)
        | Source::Scheme(_)
        | Source::Nonce(_)
        | Source::Hash { .. }
        | Source::Host(_)
        | Source::Wildcard => Ok(()),
        _ => Err(not_allowed(directive, source)),
    }
}

fn frame_ancestor_source(_: Directive, source: &Source) -> Result<(), PolicyError> {
    match source {
        Source::Host(_) | Source::Wildcard | Source::Scheme(_) => Ok(()),
        _ => Err(PolicyError::InvalidFrameAncestorSource(source.to_string())),
    }
}

fn media_type_source(directive: Directive, source: &Source) -> Result<(), PolicyError> {
    match source {
        Source::MediaType(_) => Ok(()),
        _ => Err(not_allowed(directive, source)),
    }
}

fn uri_source(directive: Directive, source: &Source) -> Result<(), PolicyError> {
    match source {
        Source::Uri(_) => Ok(()),
        _ => Err(not_allowed(directive, source)),
    }
}

fn sandbox_source(directive: Directive, source: &Source) -> Result<(), PolicyError> {
    match source {
        Source::Sandbox(_) => Ok(()),
        _ => Err(not_allowed(directive, source)),
    }
}

fn reject_source(directive: Directive, source: &Source) -> Result<(), PolicyError> {
    Err(not_allowed(directive, source))
}

pub fn parse_policy(header: &str) -> Result<CspPolicy, CspError> {
    let mut directives = BTreeMap::new();

    for segment in token::split_list(header, ';') {
        let (name, value) = token::split_first_whitespace(segment);
        let directive: Directive = name.parse()?;
        let parse_source = directive.source_parser();

        let mut sources = SourceList::default();
        for text in value.split_whitespace() {
            sources.insert(parse_source(text)?);
        }
        // an empty sandbox applies every restriction
        if sources.is_empty() && !directive.is_flag() && directive != Directive::Sandbox {
            return Err(CspError::InvalidSourceSyntax(segment.to_string()));
        }

        if directives.contains_key(&directive) {
            log::debug!("ignoring repeated csp directive {directive}");
            continue;
        }
        directives.insert(directive, sources);
    }

    Ok(CspPolicy { directives })
}

pub fn serialize_policy(policy: &CspPolicy) -> String {
    policy
        .directives
        .iter()
        .map(|(directive, sources)| {
            let mut rendered = directive.name().to_string();
            for source in sources {
                rendered.push(' ');
                rendered.push_str(&source.to_string());
            }
            rendered.push(';');
            rendered
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl HeaderValue for CspPolicy {
    type Error = CspError;

    fn parse(wire: &str) -> Result<Self, Self::Error> {
        parse_policy(wire)
    }

    fn canonical(&self) -> String {
        serialize_policy(self)
    }
}

impl fmt::Display for CspPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_policy(self))
    }
}

impl FromStr for CspPolicy {
    type Err = CspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_policy(s)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::{CspPolicy, SourceList, parse_policy, serialize_policy};
    use crate::csp::{Directive, HostSource, SandboxToken, Source};
    use crate::error::{CspError, PolicyError};

    #[test]
    fn source_list_equality_ignores_order() {
        let mut first = SourceList::default();
        first.insert(Source::SELF);
        first.insert(Source::NONE);
        let mut second = SourceList::default();
        second.insert(Source::NONE);
        second.insert(Source::SELF);
        assert!(!second.insert(Source::SELF));

        assert_eq!(first, second);
        second.insert(Source::Wildcard);
        assert_ne!(first, second);
    }

    #[test]
    fn serializes_in_declaration_order() {
        let policy = CspPolicy::builder()
            .style_src([Source::SELF])
            .base_uri([Source::NONE])
            .build()
            .unwrap();

        assert_eq!(serialize_policy(&policy), "base-uri 'none'; style-src 'self';");
    }

    #[test]
    fn repeated_adds_extend_and_dedup() {
        let policy = CspPolicy::builder()
            .script_src([Source::SELF])
            .script_src([Source::SELF, Source::UNSAFE_EVAL])
            .build()
            .unwrap();

        assert_eq!(serialize_policy(&policy), "script-src 'self' 'unsafe-eval';");
        assert_eq!(policy.sources(Directive::ScriptSrc).unwrap().len(), 2);
    }

    #[test]
    fn frame_ancestors_rejects_keywords() {
        let result = CspPolicy::builder().frame_ancestors([Source::SELF]).build();
        assert_matches!(result, Err(PolicyError::InvalidFrameAncestorSource(raw)) if raw == "'self'");
    }

    #[test]
    fn frame_ancestors_accepts_hosts_and_schemes() {
        let policy = CspPolicy::builder()
            .frame_ancestors([
                Source::Host(HostSource::new("example.com").with_scheme("https")),
                Source::scheme("https").unwrap(),
            ])
            .build()
            .unwrap();

        assert_eq!(
            serialize_policy(&policy),
            "frame-ancestors https://example.com https:;"
        );
    }

    #[test]
    fn first_builder_error_is_kept() {
        let result = CspPolicy::builder()
            .default_src(Vec::new())
            .frame_ancestors([Source::SELF])
            .build();
        assert_matches!(result, Err(PolicyError::EmptySourceList(Directive::DefaultSrc)));
    }

    #[test]
    fn rejects_sources_of_the_wrong_kind() {
        let result = CspPolicy::builder()
            .script_src([Source::Sandbox(SandboxToken::AllowScripts)])
            .build();
        assert_matches!(
            result,
            Err(PolicyError::SourceNotAllowed { directive: Directive::ScriptSrc, .. })
        );
    }

    #[test]
    fn rejects_hand_built_sources_that_do_not_round_trip() {
        let result = CspPolicy::builder()
            .img_src([Source::Nonce("not base64!".to_string())])
            .build();
        assert_matches!(result, Err(PolicyError::InvalidSource(CspError::InvalidSourceSyntax(_))));
    }

    #[test]
    fn parses_flags_sandbox_and_plugin_types() {
        let policy = parse_policy(
            "sandbox allow-forms allow-scripts; plugin-types application/pdf; block-all-mixed-content; report-uri /csp",
        )
        .unwrap();

        let expected = CspPolicy::builder()
            .block_all_mixed_content()
            .report_uri([Source::uri("/csp").unwrap()])
            .plugin_types([Source::media_type("application/pdf").unwrap()])
            .sandbox([SandboxToken::AllowScripts, SandboxToken::AllowForms])
            .build()
            .unwrap();

        assert_eq!(policy, expected);
        assert_eq!(
            serialize_policy(&expected),
            "plugin-types application/pdf; report-uri /csp; sandbox allow-scripts allow-forms; block-all-mixed-content;"
        );
    }

    #[test]
    fn source_directives_need_a_value() {
        assert_matches!(
            parse_policy("default-src;"),
            Err(CspError::InvalidSourceSyntax(raw)) if raw == "default-src"
        );
        assert_matches!(
            parse_policy("default-src 'self'; img-src"),
            Err(CspError::InvalidSourceSyntax(raw)) if raw == "img-src"
        );
        let policy = parse_policy("sandbox; block-all-mixed-content").unwrap();
        assert!(policy.sources(Directive::Sandbox).unwrap().is_empty());
    }

    #[test]
    fn any_whitespace_separates_name_from_sources() {
        let policy = parse_policy("default-src\n'self'\t'none'").unwrap();
        assert_eq!(policy.sources(Directive::DefaultSrc).unwrap().len(), 2);
        assert_matches!(
            parse_policy("default-src 'self';\n'none'"),
            Err(CspError::EmptyDirectiveName)
        );
    }

    #[test]
    fn mixed_content_flag_takes_no_value() {
        assert_matches!(
            parse_policy("block-all-mixed-content 'self'"),
            Err(CspError::InvalidSourceSyntax(raw)) if raw == "'self'"
        );
    }

    #[test]
    fn parse_keeps_first_seen_order_and_first_directive() {
        let policy = parse_policy("img-src b.com a.com; img-src c.com").unwrap();
        assert_eq!(serialize_policy(&policy), "img-src b.com a.com;");
    }

    #[test]
    fn parse_tolerates_extra_whitespace_and_trailing_semicolons() {
        let policy = parse_policy("  DEFAULT-SRC\t'self'   https:  ;; ").unwrap();
        assert_eq!(serialize_policy(&policy), "default-src 'self' https:;");
    }

    #[test]
    fn empty_header_is_the_empty_policy() {
        assert!(parse_policy("").unwrap().is_empty());
        assert_eq!(serialize_policy(&CspPolicy::default()), "");
    }
}
