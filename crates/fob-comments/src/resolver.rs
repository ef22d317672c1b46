//! Resolution of comments for symbols and signatures.

use dashmap::DashSet;

use crate::cache::CommentCache;
use crate::config::{CommentParserConfig, LineCommentPolicy, ResolverOptions};
use crate::diagnostics::Diagnostics;
use crate::discovery::{CommentDiscovery, DocSymbol, ReflectionKind};
use crate::error::{CommentError, Result};
use crate::model::Comment;
use crate::parser::{CommentParser, JsDocParser};
use crate::source::{CommentKind, DiscoveredComment, SourceId, SourceUnit};

/// Ties discovery, parsing and the parse-once cache together.
///
/// Every comment handed out is a clone owned by the caller; mutating it never
/// affects later resolutions. The resolver can be shared between threads as
/// long as its parser can.
#[derive(Debug)]
pub struct CommentResolver<P = JsDocParser> {
    cache: CommentCache,
    parser: P,
    options: ResolverOptions,
    /// Ambiguous `@template` tags already reported, by `(unit, tag start)`.
    reported_templates: DashSet<(SourceId, u32)>,
}

impl Default for CommentResolver {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

impl CommentResolver {
    /// Resolver with the default JSDoc parser.
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_parser(JsDocParser, options)
    }
}

impl<P: CommentParser> CommentResolver<P> {
    pub fn with_parser(parser: P, options: ResolverOptions) -> Self {
        Self {
            cache: CommentCache::new(),
            parser,
            options,
            reported_templates: DashSet::new(),
        }
    }

    pub fn cache(&self) -> &CommentCache {
        &self.cache
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Drops every cached comment of `unit`. Call once the unit is discarded.
    pub fn forget_unit(&self, unit: &SourceUnit) -> bool {
        let id = unit.id();
        self.reported_templates.retain(|(reported, _)| *reported != id);
        self.cache.evict(id)
    }

    /// True the first time the template tag at `start` is reported.
    pub(crate) fn first_template_report(&self, unit: SourceId, start: u32) -> bool {
        self.reported_templates.insert((unit, start))
    }

    /// Resolves the comment documenting `symbol`.
    ///
    /// Symbols declared by a JSDoc tag are delegated to
    /// [`resolve_jsdoc`](Self::resolve_jsdoc). Module-level comments are only
    /// kept for source units and declaration comments only for everything
    /// else. A property without a comment of its own falls back to the
    /// `@param` tag of the constructor that declares it.
    pub fn resolve_symbol<D>(
        &self,
        discovery: &D,
        symbol: &D::Symbol,
        kind: ReflectionKind,
        config: &CommentParserConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Option<Comment>>
    where
        D: CommentDiscovery + ?Sized,
    {
        if let Some(declaration) = symbol.jsdoc_declaration() {
            return self.resolve_jsdoc(declaration, config, diagnostics);
        }

        let mut comment = None;
        if let Some(discovered) = discovery.discover_comment(symbol, kind, diagnostics) {
            comment = self
                .resolve_discovered(&discovered, config, diagnostics)?
                .filter(|comment| applies_to(comment, symbol.is_source_unit(), &discovered));
        }

        if comment.is_none() && kind == ReflectionKind::Property {
            if let Some((signature, parameter)) = discovery.constructor_parameter(symbol) {
                return self.resolve_parameter(
                    discovery,
                    signature,
                    &parameter,
                    config,
                    diagnostics,
                );
            }
        }

        Ok(comment)
    }

    /// Resolves the comment of a call signature. No module filtering applies.
    pub fn resolve_signature<D>(
        &self,
        discovery: &D,
        signature: &D::Signature,
        config: &CommentParserConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Option<Comment>>
    where
        D: CommentDiscovery + ?Sized,
    {
        match discovery.discover_signature_comment(signature) {
            Some(discovered) => self.resolve_discovered(&discovered, config, diagnostics),
            None => Ok(None),
        }
    }

    /// Parses (or fetches from the cache) a discovered comment.
    ///
    /// Block comments are parsed at most once per `(unit, start)` and always
    /// yield a comment. Line comments follow [`ResolverOptions::line_comments`]
    /// and are never cached.
    pub fn resolve_discovered(
        &self,
        discovered: &DiscoveredComment,
        config: &CommentParserConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Option<Comment>> {
        let location = discovered.location();
        let DiscoveredComment { unit, range } = discovered;

        match range.kind {
            CommentKind::Block => {
                let comment = self.cache.get_or_parse(unit.id(), range.start, || {
                    unit.slice(range.start, range.end).inspect_err(|err| {
                        tracing::error!(%location, %err, "discovered comment range is invalid");
                    })?;
                    tracing::debug!(%location, "parsing comment");

                    let tokens = self
                        .parser
                        .lex_block_comment(unit.text(), range.start, range.end);
                    let mut warn = |message: &str| diagnostics.warn(message, Some(&location));
                    Ok::<_, CommentError>(self.parser.parse_comment(tokens, config, &mut warn))
                })?;
                Ok(Some(comment))
            }
            CommentKind::Line => match self.options.line_comments {
                LineCommentPolicy::Warn => {
                    diagnostics.warn(
                        "line comments are not supported yet, the comment is ignored",
                        Some(&location),
                    );
                    Ok(None)
                }
                LineCommentPolicy::Reject => Err(CommentError::UnsupportedCommentStyle {
                    kind: range.kind,
                    location,
                }),
            },
        }
    }

    fn resolve_parameter<D>(
        &self,
        discovery: &D,
        signature: &D::Signature,
        parameter: &str,
        config: &CommentParserConfig,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Option<Comment>>
    where
        D: CommentDiscovery + ?Sized,
    {
        let signature_comment = self.resolve_signature(discovery, signature, config, diagnostics)?;
        Ok(signature_comment.and_then(|comment| {
            comment
                .get_identified_tag(parameter, "@param")
                .map(|tag| Comment::new(tag.content.clone()))
        }))
    }
}

/// A module comment belongs to the source unit; any other comment belongs to
/// the declaration it precedes.
fn applies_to(comment: &Comment, source_unit: bool, discovered: &DiscoveredComment) -> bool {
    let applies = comment.is_module_scoped() == source_unit;
    if !applies {
        tracing::debug!(
            location = %discovered.location(),
            source_unit,
            "discarding comment that documents a different declaration"
        );
    }
    applies
}
