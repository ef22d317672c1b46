use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Modifier marking a comment as documentation for a whole module.
pub const PACKAGE_DOCUMENTATION: &str = "@packageDocumentation";

/// Tag naming the module a comment documents.
pub const MODULE_TAG: &str = "@module";

/// A structured documentation comment.
///
/// A `Comment` owns all of its data, so `clone()` yields a deep copy that shares
/// nothing with the original. The resolver relies on this: the cached instance is
/// never handed out, every caller receives its own clone and may mutate it freely.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Content before the first block tag.
    #[serde(default)]
    pub summary: Vec<CommentDisplayPart>,
    /// Block tags in source order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub block_tags: Vec<CommentTag>,
    /// Contentless marker tags, e.g. `@internal` or `@packageDocumentation`.
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub modifier_tags: BTreeSet<String>,
}

impl Comment {
    /// Creates a comment holding only summary content.
    pub fn new(summary: Vec<CommentDisplayPart>) -> Self {
        Self {
            summary,
            ..Self::default()
        }
    }

    /// Returns `true` when the comment carries the given modifier (e.g. `@internal`).
    pub fn has_modifier(&self, tag: &str) -> bool {
        self.modifier_tags.contains(tag)
    }

    /// Removes a modifier, returning whether it was present.
    pub fn remove_modifier(&mut self, tag: &str) -> bool {
        self.modifier_tags.remove(tag)
    }

    /// First block tag with the given name.
    pub fn get_tag(&self, tag: &str) -> Option<&CommentTag> {
        self.block_tags.iter().find(|t| t.tag == tag)
    }

    /// All block tags with the given name.
    pub fn get_tags<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a CommentTag> + 'a {
        self.block_tags.iter().filter(move |t| t.tag == tag)
    }

    /// Block tag with the given name that documents `identifier`,
    /// e.g. `get_identified_tag("options", "@param")`.
    pub fn get_identified_tag(&self, identifier: &str, tag: &str) -> Option<&CommentTag> {
        self.block_tags
            .iter()
            .find(|t| t.tag == tag && t.name.as_deref() == Some(identifier))
    }

    /// Returns `true` if the comment documents a whole module rather than a
    /// declaration inside one.
    pub fn is_module_scoped(&self) -> bool {
        self.has_modifier(PACKAGE_DOCUMENTATION)
            || self.has_modifier(MODULE_TAG)
            || self.get_tag(MODULE_TAG).is_some()
    }

    /// Returns `true` if the comment does not contain any meaningful data.
    pub fn is_empty(&self) -> bool {
        self.summary.iter().all(CommentDisplayPart::is_blank)
            && self.block_tags.is_empty()
            && self.modifier_tags.is_empty()
    }

    /// Summary rendered as plain text.
    pub fn summary_text(&self) -> String {
        display_parts_to_string(&self.summary)
    }
}

/// A block tag such as `@param name description` or `@returns value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentTag {
    /// Tag name including the leading `@`.
    pub tag: String,
    /// Identifier documented by the tag, for tags like `@param` or `@typedef`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tag body.
    #[serde(default)]
    pub content: Vec<CommentDisplayPart>,
}

impl CommentTag {
    pub fn new(tag: impl Into<String>, content: Vec<CommentDisplayPart>) -> Self {
        Self {
            tag: tag.into(),
            name: None,
            content,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Tag body rendered as plain text.
    pub fn content_text(&self) -> String {
        display_parts_to_string(&self.content)
    }
}

/// One piece of comment content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommentDisplayPart {
    Text { text: String },
    Code { text: String },
    /// An inline tag such as `{@link Foo}`; `tag` includes the leading `@`.
    InlineTag { tag: String, text: String },
}

impl CommentDisplayPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self::Code { text: text.into() }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Text { text } => text.trim().is_empty(),
            Self::Code { .. } | Self::InlineTag { .. } => false,
        }
    }
}

/// Renders display parts the way they appeared in source, minus comment syntax.
pub fn display_parts_to_string(parts: &[CommentDisplayPart]) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            CommentDisplayPart::Text { text } | CommentDisplayPart::Code { text } => {
                out.push_str(text)
            }
            CommentDisplayPart::InlineTag { tag, text } if text.is_empty() => {
                out.push_str(&format!("{{{tag}}}"))
            }
            CommentDisplayPart::InlineTag { tag, text } => {
                out.push_str(&format!("{{{tag} {text}}}"))
            }
        }
    }
    out
}
