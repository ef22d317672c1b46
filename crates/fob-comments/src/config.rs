//! Configuration for comment parsing and resolution.

use std::collections::BTreeSet;
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_BLOCK_TAGS: &[&str] = &[
    "@author",
    "@callback",
    "@category",
    "@defaultValue",
    "@deprecated",
    "@enum",
    "@example",
    "@group",
    "@module",
    "@param",
    "@privateRemarks",
    "@prop",
    "@property",
    "@remarks",
    "@return",
    "@returns",
    "@see",
    "@since",
    "@template",
    "@throws",
    "@type",
    "@typedef",
    "@typeParam",
];

const DEFAULT_INLINE_TAGS: &[&str] = &["@inheritDoc", "@label", "@link", "@linkcode", "@linkplain"];

const DEFAULT_MODIFIER_TAGS: &[&str] = &[
    "@alpha",
    "@beta",
    "@event",
    "@eventProperty",
    "@experimental",
    "@hidden",
    "@ignore",
    "@internal",
    "@override",
    "@packageDocumentation",
    "@private",
    "@protected",
    "@public",
    "@readonly",
    "@sealed",
    "@virtual",
];

/// Tag vocabularies recognized by the comment parser.
///
/// The resolver passes this through to the parser untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentParserConfig {
    /// Tags that start a new block section.
    #[serde(default)]
    pub block_tags: BTreeSet<String>,
    /// Tags allowed inside `{@tag ...}`.
    #[serde(default)]
    pub inline_tags: BTreeSet<String>,
    /// Contentless marker tags.
    #[serde(default)]
    pub modifier_tags: BTreeSet<String>,
}

impl Default for CommentParserConfig {
    fn default() -> Self {
        fn set(tags: &[&str]) -> BTreeSet<String> {
            tags.iter().map(|tag| tag.to_string()).collect()
        }
        Self {
            block_tags: set(DEFAULT_BLOCK_TAGS),
            inline_tags: set(DEFAULT_INLINE_TAGS),
            modifier_tags: set(DEFAULT_MODIFIER_TAGS),
        }
    }
}

impl CommentParserConfig {
    /// Config that recognizes no tags at all.
    pub fn empty() -> Self {
        Self {
            block_tags: BTreeSet::new(),
            inline_tags: BTreeSet::new(),
            modifier_tags: BTreeSet::new(),
        }
    }

    pub fn with_block_tag(mut self, tag: impl Into<String>) -> Self {
        self.block_tags.insert(tag.into());
        self
    }

    pub fn with_inline_tag(mut self, tag: impl Into<String>) -> Self {
        self.inline_tags.insert(tag.into());
        self
    }

    pub fn with_modifier_tag(mut self, tag: impl Into<String>) -> Self {
        self.modifier_tags.insert(tag.into());
        self
    }
}

/// What the resolver does with `//` comments, which the parser cannot read yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCommentPolicy {
    /// Report a warning through the diagnostics sink and resolve to no comment.
    #[default]
    Warn,
    /// Fail the request with [`CommentError::UnsupportedCommentStyle`](crate::CommentError::UnsupportedCommentStyle).
    Reject,
}

/// Options for [`CommentResolver`](crate::CommentResolver).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    #[serde(default)]
    pub line_comments: LineCommentPolicy,
}

/// Parser vocabulary and resolver options loaded together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSettings {
    #[serde(default)]
    pub parser: CommentParserConfig,
    #[serde(default)]
    pub resolver: ResolverOptions,
}

impl CommentSettings {
    /// Load settings from multiple sources.
    /// Priority: environment variables > config file > defaults
    ///
    /// Environment variables use the `FOB_COMMENTS_` prefix with `__` between
    /// nested keys, e.g. `FOB_COMMENTS_RESOLVER__LINE_COMMENTS=reject`.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_path {
            tracing::debug!("Loading comment settings from: {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        figment = figment.merge(Env::prefixed("FOB_COMMENTS_").split("__"));

        Ok(figment.extract()?)
    }
}
