//! Source units and the raw comment ranges discovered inside them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{CommentError, Result};

static NEXT_SOURCE_ID: AtomicU32 = AtomicU32::new(0);

/// Process-unique identity of a [`SourceUnit`].
///
/// Two units never share an id, even when their name and text are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(u32);

impl SourceId {
    fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value of the id.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// A block of source text (usually a file) that comments are discovered in.
#[derive(Debug)]
pub struct SourceUnit {
    id: SourceId,
    name: String,
    text: String,
    line_index: LineIndex,
}

impl SourceUnit {
    /// Registers a new unit and assigns it a fresh [`SourceId`].
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Arc<Self> {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Arc::new(Self {
            id: SourceId::next(),
            name: name.into(),
            text,
            line_index,
        })
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Human-readable location of a byte offset.
    pub fn location(&self, offset: u32) -> SourceLocation {
        let (line, column) = self.line_index.line_column(offset);
        SourceLocation {
            file: self.name.clone(),
            line,
            column,
        }
    }

    /// Returns the text covered by `start..end`, validating the bounds.
    pub fn slice(&self, start: u32, end: u32) -> Result<&str> {
        let (s, e) = (start as usize, end as usize);
        if s > e || !self.text.is_char_boundary(s) || !self.text.is_char_boundary(e) {
            return Err(CommentError::InvalidRange {
                unit: self.name.clone(),
                start,
                end,
                len: self.text.len(),
            });
        }
        Ok(&self.text[s..e])
    }
}

/// File, one-based line and one-based column of a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug)]
struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(128);
        line_starts.push(0);
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((idx + 1) as u32);
            }
        }
        Self { line_starts }
    }

    fn line_column(&self, offset: u32) -> (u32, u32) {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line = idx as u32 + 1;
        let column = offset - self.line_starts[idx] + 1;
        (line, column)
    }
}

/// Syntactic style of a raw comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// `/* ... */` and `/** ... */`
    Block,
    /// `// ...`
    Line,
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentKind::Block => f.write_str("block"),
            CommentKind::Line => f.write_str("line"),
        }
    }
}

/// Where a raw comment lives inside its unit. Says nothing about its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentRange {
    pub kind: CommentKind,
    pub start: u32,
    pub end: u32,
}

impl CommentRange {
    pub fn block(start: u32, end: u32) -> Self {
        Self {
            kind: CommentKind::Block,
            start,
            end,
        }
    }

    pub fn line(start: u32, end: u32) -> Self {
        Self {
            kind: CommentKind::Line,
            start,
            end,
        }
    }
}

/// Result of discovery: the unit a comment was found in and its raw range.
#[derive(Debug, Clone)]
pub struct DiscoveredComment {
    pub unit: Arc<SourceUnit>,
    pub range: CommentRange,
}

impl DiscoveredComment {
    pub fn new(unit: Arc<SourceUnit>, range: CommentRange) -> Self {
        Self { unit, range }
    }

    /// Location of the start of the comment.
    pub fn location(&self) -> SourceLocation {
        self.unit.location(self.range.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_per_unit() {
        let a = SourceUnit::new("a.ts", "const a = 1;");
        let b = SourceUnit::new("a.ts", "const a = 1;");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn location_is_one_based() {
        let unit = SourceUnit::new("src/lib.ts", "line one\n  /** doc */\nline three");
        let location = unit.location(11);
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 3);
        assert_eq!(location.to_string(), "src/lib.ts:2:3");
    }

    #[test]
    fn slice_rejects_out_of_bounds_ranges() {
        let unit = SourceUnit::new("x.ts", "/** a */");
        assert_eq!(unit.slice(0, 8).unwrap(), "/** a */");
        assert!(matches!(
            unit.slice(0, 80),
            Err(CommentError::InvalidRange { len: 8, .. })
        ));
        assert!(unit.slice(5, 2).is_err());
    }
}
