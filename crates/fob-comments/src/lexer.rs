//! Lexer for `/** ... */` block comments.

/// Kind of a lexed comment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    NewLine,
    /// A backtick code span, backticks included.
    Code,
    /// `@name`, either in block position or right after an inline `{`.
    Tag,
    /// `{type}` directly after a block tag; the text excludes the braces.
    TypeAnnotation,
    /// `{` opening an inline tag.
    OpenBrace,
    /// `}` closing an inline tag.
    CloseBrace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the token in the source unit.
    pub pos: u32,
}

/// Lexes the block comment spanning `start..end` of `text`.
///
/// Comment delimiters and the leading `*` gutter of each line are removed.
/// A range that does not fit `text` lexes to nothing.
pub fn lex_block_comment(text: &str, start: u32, end: u32) -> Vec<Token> {
    let raw = text.get(start as usize..end as usize).unwrap_or_default();
    let (body, body_offset) = strip_delimiters(raw);
    let base = start + body_offset as u32;

    let mut lexer = BlockLexer::default();
    let mut line_start = 0usize;
    for (idx, line) in body.split('\n').enumerate() {
        if idx > 0 {
            lexer.new_line(base + line_start as u32 - 1);
        }
        let (content, skipped) = strip_gutter(line.strip_suffix('\r').unwrap_or(line));
        lexer.lex_line(content, base + (line_start + skipped) as u32);
        line_start += line.len() + 1;
    }
    lexer.finish()
}

fn strip_delimiters(raw: &str) -> (&str, usize) {
    let trimmed = raw.trim_start();
    let mut offset = raw.len() - trimmed.len();
    let mut body = trimmed;

    if body.starts_with("/**") && !body.starts_with("/**/") {
        body = &body[3..];
        offset += 3;
    } else if let Some(rest) = body.strip_prefix("/*") {
        body = rest;
        offset += 2;
    }

    let body = body.trim_end();
    (body.strip_suffix("*/").unwrap_or(body), offset)
}

fn strip_gutter(line: &str) -> (&str, usize) {
    let trimmed = line.trim_start();
    let skipped = line.len() - trimmed.len();
    match trimmed.strip_prefix('*') {
        Some(rest) => match rest.strip_prefix(' ') {
            Some(rest) => (rest, skipped + 2),
            None => (rest, skipped + 1),
        },
        None => (trimmed, skipped),
    }
}

#[derive(Default)]
struct BlockLexer {
    tokens: Vec<Token>,
    text: String,
    text_pos: u32,
    in_inline_tag: bool,
    expect_type: bool,
}

impl BlockLexer {
    fn lex_line(&mut self, line: &str, base: u32) {
        let mut idx = 0;
        let mut after_space = true;

        while idx < line.len() {
            let rest = &line[idx..];
            let Some(c) = rest.chars().next() else {
                break;
            };
            let pos = base + idx as u32;

            match c {
                '\\' => {
                    if let Some(escaped) = rest[1..]
                        .chars()
                        .next()
                        .filter(|next| matches!(next, '@' | '{' | '}' | '`'))
                    {
                        self.push_char(escaped, pos);
                        self.expect_type = false;
                        after_space = false;
                        idx += 1 + escaped.len_utf8();
                        continue;
                    }
                }
                '`' => {
                    if let Some(close) = rest[1..].find('`') {
                        let code = &rest[..close + 2];
                        self.emit(TokenKind::Code, code, pos);
                        self.expect_type = false;
                        after_space = false;
                        idx += code.len();
                        continue;
                    }
                }
                '{' if rest[1..].starts_with('@') => {
                    self.emit(TokenKind::OpenBrace, "{", pos);
                    self.in_inline_tag = true;
                    self.expect_type = false;
                    after_space = true;
                    idx += 1;
                    continue;
                }
                '{' if self.expect_type => {
                    if let Some(len) = balanced_braces_len(rest) {
                        self.emit(TokenKind::TypeAnnotation, &rest[1..len - 1], pos);
                        self.expect_type = false;
                        after_space = false;
                        idx += len;
                        continue;
                    }
                }
                '}' if self.in_inline_tag => {
                    self.emit(TokenKind::CloseBrace, "}", pos);
                    self.in_inline_tag = false;
                    after_space = false;
                    idx += 1;
                    continue;
                }
                '@' if after_space => {
                    let name_len = rest[1..]
                        .find(|ch: char| !ch.is_ascii_alphanumeric())
                        .unwrap_or(rest.len() - 1);
                    if rest[1..].starts_with(|ch: char| ch.is_ascii_alphabetic()) {
                        self.emit(TokenKind::Tag, &rest[..1 + name_len], pos);
                        self.expect_type = !self.in_inline_tag;
                        after_space = false;
                        idx += 1 + name_len;
                        continue;
                    }
                }
                _ => {}
            }

            self.push_char(c, pos);
            if !c.is_whitespace() {
                self.expect_type = false;
            }
            after_space = c.is_whitespace();
            idx += c.len_utf8();
        }
    }

    fn new_line(&mut self, pos: u32) {
        self.emit(TokenKind::NewLine, "\n", pos);
        self.expect_type = false;
    }

    fn push_char(&mut self, c: char, pos: u32) {
        if self.text.is_empty() {
            self.text_pos = pos;
        }
        self.text.push(c);
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens.push(Token {
                kind: TokenKind::Text,
                text: std::mem::take(&mut self.text),
                pos: self.text_pos,
            });
        }
    }

    fn emit(&mut self, kind: TokenKind, text: &str, pos: u32) {
        self.flush_text();
        self.tokens.push(Token {
            kind,
            text: text.to_string(),
            pos,
        });
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_text();
        self.tokens
    }
}

/// Length of a `{...}` group at the start of `input`, braces included.
fn balanced_braces_len(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in input.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}
