#![deny(clippy::all)]

//! Doc comment resolution for the Fob documentation pipeline.
//!
//! This crate provides:
//! - A parse-once cache of structured comments keyed by source unit and offset.
//! - A resolver that decides which comment documents a symbol, a signature or
//!   an entity declared inside a shared JSDoc block.
//! - A JSDoc / TSDoc block comment lexer and tag parser.
//! - An OXC-backed discovery host for JavaScript / TypeScript modules
//!   (feature `oxc`, enabled by default).
//!
//! The crate emits `tracing` events and never installs a subscriber.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod error;
mod extract;
pub mod jsdoc;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod source;

pub use cache::{CacheStats, CommentCache};
pub use config::{CommentParserConfig, CommentSettings, LineCommentPolicy, ResolverOptions};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Diagnostics, Severity, TracingDiagnostics};
pub use discovery::{CommentDiscovery, DocSymbol, ReflectionKind};
pub use error::{CommentError, Result};
pub use jsdoc::{JsDocDeclaration, JsDocNode, JsDocNodeId, JsDocNodeKind, JsDocTree};
pub use model::{Comment, CommentDisplayPart, CommentTag};
pub use parser::{CommentParser, JsDocParser};
pub use resolver::CommentResolver;
pub use source::{
    CommentKind, CommentRange, DiscoveredComment, SourceId, SourceLocation, SourceUnit,
};

#[cfg(feature = "oxc")]
pub use discovery::oxc::{CommentStyle, IndexedSymbol, ModuleIndex};
