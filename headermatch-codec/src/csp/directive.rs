use std::fmt;
use std::str::FromStr;

use super::source::{self, Source};
use crate::error::CspError;

/// Policy directives. Declaration order is the order policies serialize in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    BaseUri,
    DefaultSrc,
    ScriptSrc,
    StyleSrc,
    ObjectSrc,
    MediaSrc,
    ImgSrc,
    FontSrc,
    ConnectSrc,
    ChildSrc,
    FormAction,
    FrameAncestors,
    PluginTypes,
    ReportUri,
    Sandbox,
    BlockAllMixedContent,
}

pub(crate) type SourceParser = fn(&str) -> Result<Source, CspError>;

impl Directive {
    pub const ALL: [Directive; 16] = [
        Directive::BaseUri,
        Directive::DefaultSrc,
        Directive::ScriptSrc,
        Directive::StyleSrc,
        Directive::ObjectSrc,
        Directive::MediaSrc,
        Directive::ImgSrc,
        Directive::FontSrc,
        Directive::ConnectSrc,
        Directive::ChildSrc,
        Directive::FormAction,
        Directive::FrameAncestors,
        Directive::PluginTypes,
        Directive::ReportUri,
        Directive::Sandbox,
        Directive::BlockAllMixedContent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Directive::BaseUri => "base-uri",
            Directive::DefaultSrc => "default-src",
            Directive::ScriptSrc => "script-src",
            Directive::StyleSrc => "style-src",
            Directive::ObjectSrc => "object-src",
            Directive::MediaSrc => "media-src",
            Directive::ImgSrc => "img-src",
            Directive::FontSrc => "font-src",
            Directive::ConnectSrc => "connect-src",
            Directive::ChildSrc => "child-src",
            Directive::FormAction => "form-action",
            Directive::FrameAncestors => "frame-ancestors",
            Directive::PluginTypes => "plugin-types",
            Directive::ReportUri => "report-uri",
            Directive::Sandbox => "sandbox",
            Directive::BlockAllMixedContent => "block-all-mixed-content",
        }
    }

    /// The grammar this directive's value tokens are read with.
    pub(crate) fn source_parser(&self) -> SourceParser {
        match self {
            Directive::PluginTypes => source::parse_media_type,
            Directive::ReportUri => source::parse_uri,
            Directive::Sandbox => source::parse_sandbox_token,
            Directive::BlockAllMixedContent => source::reject_value,
            _ => source::parse_source_expression,
        }
    }

    /// `block-all-mixed-content` is a bare flag and carries no sources.
    pub fn is_flag(&self) -> bool {
        matches!(self, Directive::BlockAllMixedContent)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Directive {
    type Err = CspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CspError::EmptyDirectiveName);
        }
        Directive::ALL
            .into_iter()
            .find(|directive| directive.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CspError::UnknownDirective(s.to_string()))
    }
}
