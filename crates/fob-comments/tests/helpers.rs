//! Shared fixtures: an in-memory discovery host and a parser that counts parses.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fob_comments::lexer::Token;
use fob_comments::{
    Comment, CommentDiscovery, CommentParser, CommentParserConfig, CommentRange, Diagnostics,
    DiscoveredComment, DocSymbol, JsDocDeclaration, JsDocNodeId, JsDocParser, JsDocTree,
    ReflectionKind, SourceUnit,
};

/// Wraps [`JsDocParser`] and records how often a comment was parsed.
#[derive(Debug, Default)]
pub struct CountingParser {
    parses: AtomicUsize,
}

impl CountingParser {
    pub fn parses(&self) -> usize {
        self.parses.load(Ordering::SeqCst)
    }
}

impl CommentParser for CountingParser {
    fn lex_block_comment(&self, text: &str, start: u32, end: u32) -> Vec<Token> {
        JsDocParser.lex_block_comment(text, start, end)
    }

    fn parse_comment(
        &self,
        tokens: Vec<Token>,
        config: &CommentParserConfig,
        warn: &mut dyn FnMut(&str),
    ) -> Comment {
        self.parses.fetch_add(1, Ordering::SeqCst);
        JsDocParser.parse_comment(tokens, config, warn)
    }
}

/// A symbol whose comment location is fixed up front.
#[derive(Debug, Clone, Default)]
pub struct FakeSymbol {
    pub name: String,
    pub source_unit: bool,
    pub comment: Option<DiscoveredComment>,
    pub jsdoc: Option<(Arc<JsDocTree>, JsDocNodeId)>,
    /// Index of the constructor signature and the parameter name.
    pub constructor_parameter: Option<(usize, String)>,
}

impl FakeSymbol {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn module(name: &str) -> Self {
        Self {
            source_unit: true,
            ..Self::named(name)
        }
    }

    pub fn with_comment(mut self, unit: &Arc<SourceUnit>, range: CommentRange) -> Self {
        self.comment = Some(DiscoveredComment::new(Arc::clone(unit), range));
        self
    }

    pub fn declared_by(mut self, tree: &Arc<JsDocTree>, id: JsDocNodeId) -> Self {
        self.jsdoc = Some((Arc::clone(tree), id));
        self
    }
}

impl DocSymbol for FakeSymbol {
    fn is_source_unit(&self) -> bool {
        self.source_unit
    }

    fn jsdoc_declaration(&self) -> Option<JsDocDeclaration<'_>> {
        self.jsdoc.as_ref().map(|(tree, id)| tree.declaration(*id))
    }
}

/// Discovery host backed by the comments stored on each [`FakeSymbol`].
#[derive(Debug, Default)]
pub struct FakeHost {
    pub signatures: Vec<FakeSymbol>,
}

impl CommentDiscovery for FakeHost {
    type Symbol = FakeSymbol;
    type Signature = FakeSymbol;

    fn discover_comment(
        &self,
        symbol: &FakeSymbol,
        _kind: ReflectionKind,
        _diagnostics: &dyn Diagnostics,
    ) -> Option<DiscoveredComment> {
        symbol.comment.clone()
    }

    fn discover_signature_comment(&self, signature: &FakeSymbol) -> Option<DiscoveredComment> {
        signature.comment.clone()
    }

    fn constructor_parameter(&self, symbol: &FakeSymbol) -> Option<(&FakeSymbol, String)> {
        let (index, name) = symbol.constructor_parameter.as_ref()?;
        Some((self.signatures.get(*index)?, name.clone()))
    }
}

/// Installs a test-writer subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Range of the first occurrence of `comment` in the unit's text.
pub fn block_range(unit: &SourceUnit, comment: &str) -> CommentRange {
    let start = unit
        .text()
        .find(comment)
        .unwrap_or_else(|| panic!("comment {comment:?} not in source"));
    CommentRange::block(start as u32, (start + comment.len()) as u32)
}
