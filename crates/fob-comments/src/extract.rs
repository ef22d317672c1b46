//! Per-entity comments sliced out of one shared JSDoc block.
//!
//! A single `/** ... */` block can declare several entities at once:
//!
//! ```text
//! /**
//!  * @typedef {Object} Point
//!  * @property {number} x - The X coordinate
//!  * @property {number} y - The Y coordinate
//!  */
//! ```
//!
//! Each of `Point`, `x` and `y` resolves through the same cached parse of the
//! whole block; only the tag that documents the requested entity is returned.

use std::sync::Arc;

use crate::config::CommentParserConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{CommentError, Result};
use crate::jsdoc::{JsDocDeclaration, JsDocNodeKind};
use crate::model::Comment;
use crate::parser::CommentParser;
use crate::resolver::CommentResolver;
use crate::source::{CommentRange, DiscoveredComment};

const ENUM_TAG: &str = "@enum";

impl<P: CommentParser> CommentResolver<P> {
    /// Resolves the comment for an entity declared inside a JSDoc block.
    ///
    /// Enum members all share the content of the `@enum` tag. A `@template`
    /// tag that lists several type parameters and also carries a comment is
    /// ambiguous: every parameter it lists resolves to nothing, and the tag is
    /// reported once per resolver.
    pub fn resolve_jsdoc(
        &self,
        declaration: JsDocDeclaration<'_>,
        config: &CommentParserConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Option<Comment>> {
        let Some(block) = declaration.enclosing_comment() else {
            let err = CommentError::DetachedJsDoc {
                location: declaration.location(),
            };
            tracing::error!(%err, "JSDoc declaration without comment block");
            return Err(err);
        };

        let node = block.node();
        let discovered = DiscoveredComment::new(
            Arc::clone(declaration.tree().unit()),
            CommentRange::block(node.start, node.end),
        );
        let Some(parent) = self.resolve_discovered(&discovered, config, diagnostics)? else {
            return Ok(None);
        };

        let target = match declaration.parent() {
            Some(tag)
                if declaration.kind() == JsDocNodeKind::TypeParameter
                    && tag.kind() == JsDocNodeKind::TemplateTag =>
            {
                tag
            }
            _ => declaration,
        };

        if target.kind() == JsDocNodeKind::EnumTag {
            let content = parent
                .get_tag(ENUM_TAG)
                .map(|tag| tag.content.clone())
                .unwrap_or_default();
            return Ok(Some(Comment::new(content)));
        }

        let target_node = target.node();
        let name = if target.kind() == JsDocNodeKind::TemplateTag {
            let described = target_node
                .comment
                .as_deref()
                .is_some_and(|comment| !comment.trim().is_empty());
            if described && target_node.type_parameters.len() > 1 {
                let unit = declaration.tree().unit().id();
                if self.first_template_report(unit, target_node.start) {
                    diagnostics.warn(
                        "multiple type parameters defined in a single @template tag with a comment are not supported",
                        Some(&target.location()),
                    );
                }
                return Ok(None);
            }
            target_node
                .type_parameters
                .first()
                .or(target_node.name.as_ref())
        } else {
            target_node.name.as_ref()
        };

        let (Some(name), Some(tag)) = (name, target.tag_name()) else {
            return Ok(None);
        };

        match parent.get_identified_tag(name, tag) {
            Some(found) => Ok(Some(Comment::new(found.content.clone()))),
            None => {
                let err = CommentError::MissingJsDocTag {
                    name: name.clone(),
                    tag: tag.to_string(),
                    location: target.location(),
                };
                tracing::error!(%err, "parsed JSDoc block lacks the declared tag");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCollector;
    use crate::jsdoc::{JsDocNode, JsDocTree};
    use crate::source::SourceUnit;

    const TYPEDEF: &str = "/**\n * @typedef {Object} Point\n * @property {number} x - The X coordinate\n * @property {number} y - The Y coordinate\n */";

    #[test]
    fn property_tags_share_one_parse() {
        let unit = SourceUnit::new("point.js", TYPEDEF);
        let mut builder = JsDocTree::builder(unit);
        let block = builder.comment(0, TYPEDEF.len() as u32);
        let typedef = builder.child(
            block,
            JsDocNode::new(JsDocNodeKind::TypedefTag, 4, 30).named("Point"),
        );
        let x = builder.child(
            typedef,
            JsDocNode::new(JsDocNodeKind::PropertyTag, 33, 73).named("x"),
        );
        let y = builder.child(
            typedef,
            JsDocNode::new(JsDocNodeKind::PropertyTag, 76, 116).named("y"),
        );
        let tree = builder.build();

        let resolver = CommentResolver::new(Default::default());
        let config = CommentParserConfig::default();
        let diagnostics = DiagnosticCollector::new();
        let resolve = |id| {
            resolver
                .resolve_jsdoc(tree.declaration(id), &config, &diagnostics)
                .unwrap()
                .unwrap()
        };

        assert_eq!(resolve(x).summary_text(), "The X coordinate");
        assert_eq!(resolve(y).summary_text(), "The Y coordinate");
        assert!(resolve(typedef).summary.is_empty());

        let stats = resolver.cache().stats();
        assert_eq!((stats.misses, stats.hits), (1, 2));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn nameless_declaration_resolves_to_nothing() {
        let unit = SourceUnit::new("cb.js", "/** @callback */");
        let mut builder = JsDocTree::builder(unit);
        let block = builder.comment(0, 16);
        let callback = builder.child(block, JsDocNode::new(JsDocNodeKind::CallbackTag, 4, 13));
        let tree = builder.build();

        let diagnostics = DiagnosticCollector::new();
        let result = CommentResolver::new(Default::default())
            .resolve_jsdoc(
                tree.declaration(callback),
                &CommentParserConfig::default(),
                &diagnostics,
            )
            .unwrap();
        assert!(result.is_none());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn ambiguous_template_reported_again_after_forget() {
        let source = "/** @template K, V pair */";
        let unit = SourceUnit::new("pair.js", source);
        let mut builder = JsDocTree::builder(unit.clone());
        let block = builder.comment(0, source.len() as u32);
        let template = builder.child(
            block,
            JsDocNode::new(JsDocNodeKind::TemplateTag, 4, 23)
                .with_type_parameters(["K", "V"])
                .with_comment("pair"),
        );
        let tree = builder.build();

        let resolver = CommentResolver::new(Default::default());
        let config = CommentParserConfig::default();
        let diagnostics = DiagnosticCollector::new();
        let resolve = || {
            resolver
                .resolve_jsdoc(tree.declaration(template), &config, &diagnostics)
                .unwrap()
        };

        assert!(resolve().is_none());
        assert!(resolve().is_none());
        assert_eq!(diagnostics.take_all().len(), 1);

        resolver.forget_unit(&unit);
        assert!(resolve().is_none());
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn detached_declaration_is_an_error() {
        let unit = SourceUnit::new("a.js", "/** @param x */");
        let mut builder = JsDocTree::builder(unit);
        let orphan = builder.comment(0, 15);
        let tree = builder.build();

        let err = CommentResolver::new(Default::default())
            .resolve_jsdoc(
                tree.declaration(orphan),
                &CommentParserConfig::default(),
                &DiagnosticCollector::new(),
            )
            .unwrap_err();
        assert!(matches!(err, CommentError::DetachedJsDoc { .. }));
    }
}
