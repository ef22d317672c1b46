use std::path::PathBuf;

use thiserror::Error;

use crate::source::{CommentKind, SourceLocation};

/// Result type alias for comment resolution.
pub type Result<T> = std::result::Result<T, CommentError>;

/// Errors surfaced by comment resolution.
///
/// Expected "no comment" outcomes are never errors; they resolve to `Ok(None)`.
/// Apart from [`CommentError::UnsupportedCommentStyle`], [`CommentError::Parse`]
/// and [`CommentError::Config`], every variant marks a broken internal invariant
/// and is scoped to the single request that hit it.
#[derive(Debug, Error)]
pub enum CommentError {
    /// The discovered comment uses a style the parser cannot handle yet.
    #[error("{location}: {kind} comments are not supported yet")]
    UnsupportedCommentStyle {
        /// Style of the rejected comment.
        kind: CommentKind,
        /// Where the comment starts.
        location: SourceLocation,
    },

    /// A JSDoc declaration implies a tag that the parsed comment does not contain.
    #[error(
        "{location}: failed to find JSDoc tag {tag} for '{name}' after parsing comment, please file a bug report"
    )]
    MissingJsDocTag {
        /// Identifier the tag should document.
        name: String,
        /// Tag name including the leading `@`.
        tag: String,
        /// Location of the declaration.
        location: SourceLocation,
    },

    /// A JSDoc declaration has no enclosing comment block.
    #[error(
        "{location}: JSDoc declaration is not nested in a comment block, please file a bug report"
    )]
    DetachedJsDoc {
        /// Location of the declaration.
        location: SourceLocation,
    },

    /// A discovered range does not fit the text of its source unit.
    #[error("comment range {start}..{end} is outside of '{unit}' ({len} bytes)")]
    InvalidRange {
        /// Name of the source unit.
        unit: String,
        /// Range start offset.
        start: u32,
        /// Range end offset.
        end: u32,
        /// Length of the source text.
        len: usize,
    },

    /// A discovery host failed to parse its module.
    #[error("failed to parse source '{path}': {message}")]
    Parse {
        /// Path of the module.
        path: PathBuf,
        /// Aggregated parser error message.
        message: String,
    },

    /// Loading the comment configuration failed.
    #[error("invalid comment configuration: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl CommentError {
    /// Helper to create a parse error from multiple diagnostic strings.
    pub fn parse_error(path: PathBuf, diagnostics: &[String]) -> Self {
        let message = diagnostics.join("; ");
        Self::Parse { path, message }
    }

    /// Returns `true` for errors that indicate a bug rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingJsDocTag { .. } | Self::DetachedJsDoc { .. } | Self::InvalidRange { .. }
        )
    }
}

impl From<figment::Error> for CommentError {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}
