//! Turns lexed block comments into [`Comment`] values.

use std::iter::Peekable;

use crate::config::CommentParserConfig;
use crate::lexer::{Token, TokenKind, lex_block_comment};
use crate::model::{Comment, CommentDisplayPart, CommentTag};

/// Block tags whose first word names the documented entity.
const IDENTIFIED_TAGS: &[&str] = &[
    "@arg",
    "@argument",
    "@callback",
    "@param",
    "@prop",
    "@property",
    "@template",
    "@typeParam",
    "@typedef",
];

/// Lexer and tag grammar used by the resolver on a cache miss.
pub trait CommentParser {
    /// Lexes the block comment spanning `start..end` of `text`.
    fn lex_block_comment(&self, text: &str, start: u32, end: u32) -> Vec<Token>;

    /// Builds a comment from a token stream, reporting problems through `warn`.
    fn parse_comment(
        &self,
        tokens: Vec<Token>,
        config: &CommentParserConfig,
        warn: &mut dyn FnMut(&str),
    ) -> Comment;
}

/// Default parser for JSDoc / TSDoc block comments.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsDocParser;

impl CommentParser for JsDocParser {
    fn lex_block_comment(&self, text: &str, start: u32, end: u32) -> Vec<Token> {
        lex_block_comment(text, start, end)
    }

    fn parse_comment(
        &self,
        tokens: Vec<Token>,
        config: &CommentParserConfig,
        warn: &mut dyn FnMut(&str),
    ) -> Comment {
        parse_comment(tokens, config, warn)
    }
}

/// Parse a lexed block comment into structured data.
///
/// Content before the first block tag becomes the summary. Modifier tags are
/// recorded wherever they appear and do not end the current section. Unknown
/// block tags still start a section but are reported through `warn`.
pub fn parse_comment(
    tokens: Vec<Token>,
    config: &CommentParserConfig,
    warn: &mut dyn FnMut(&str),
) -> Comment {
    let mut comment = Comment::default();
    let mut current: Option<CommentTag> = None;
    let mut parts = Vec::new();
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        match token.kind {
            TokenKind::Text | TokenKind::NewLine => push_text(&mut parts, &token.text),
            TokenKind::Code => parts.push(CommentDisplayPart::Code { text: token.text }),
            TokenKind::TypeAnnotation => {}
            TokenKind::Tag => {
                if config.modifier_tags.contains(&token.text) {
                    comment.modifier_tags.insert(token.text);
                    continue;
                }
                if !config.block_tags.contains(&token.text) {
                    warn(&format!("Encountered an unknown block tag {}", token.text));
                }
                finish_section(&mut comment, current.take(), std::mem::take(&mut parts));
                current = Some(CommentTag::new(token.text, Vec::new()));
            }
            TokenKind::OpenBrace => match tokens.next_if(|next| next.kind == TokenKind::Tag) {
                Some(tag) => parts.push(inline_tag(tag.text, &mut tokens, config, warn)),
                None => push_text(&mut parts, &token.text),
            },
            TokenKind::CloseBrace => push_text(&mut parts, &token.text),
        }
    }

    finish_section(&mut comment, current, parts);
    comment
}

fn inline_tag<I>(
    tag: String,
    tokens: &mut Peekable<I>,
    config: &CommentParserConfig,
    warn: &mut dyn FnMut(&str),
) -> CommentDisplayPart
where
    I: Iterator<Item = Token>,
{
    if !config.inline_tags.contains(&tag) {
        warn(&format!("Encountered an unknown inline tag {tag}"));
    }

    let mut text = String::new();
    let mut closed = false;
    for token in tokens.by_ref() {
        match token.kind {
            TokenKind::CloseBrace => {
                closed = true;
                break;
            }
            TokenKind::NewLine => text.push(' '),
            _ => text.push_str(&token.text),
        }
    }
    if !closed {
        warn(&format!("Inline tag {tag} is not closed"));
    }

    CommentDisplayPart::InlineTag {
        tag,
        text: text.trim().to_string(),
    }
}

fn push_text(parts: &mut Vec<CommentDisplayPart>, text: &str) {
    if let Some(CommentDisplayPart::Text { text: last }) = parts.last_mut() {
        last.push_str(text);
    } else {
        parts.push(CommentDisplayPart::text(text));
    }
}

fn finish_section(
    comment: &mut Comment,
    tag: Option<CommentTag>,
    parts: Vec<CommentDisplayPart>,
) {
    let mut parts = trim_parts(parts);
    match tag {
        None => comment.summary = parts,
        Some(mut tag) => {
            if IDENTIFIED_TAGS.contains(&tag.tag.as_str()) {
                tag.name = split_identifier(&tag.tag, &mut parts);
            }
            tag.content = parts;
            comment.block_tags.push(tag);
        }
    }
}

/// Drops surrounding whitespace and empty text parts.
fn trim_parts(parts: Vec<CommentDisplayPart>) -> Vec<CommentDisplayPart> {
    let mut parts: Vec<_> = parts
        .into_iter()
        .filter(|part| !matches!(part, CommentDisplayPart::Text { text } if text.is_empty()))
        .collect();

    if let Some(CommentDisplayPart::Text { text }) = parts.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(CommentDisplayPart::Text { text }) = parts.last_mut() {
        *text = text.trim_end().to_string();
    }
    parts.retain(|part| !matches!(part, CommentDisplayPart::Text { text } if text.is_empty()));
    parts
}

/// Splits the documented identifier off the front of a tag's content.
///
/// Handles `name`, `[name]`, `[name=default]`, a `- ` separator before the
/// description, and `T, U` lists on `@template` (the first name is returned).
fn split_identifier(tag: &str, parts: &mut Vec<CommentDisplayPart>) -> Option<String> {
    let Some(CommentDisplayPart::Text { text }) = parts.first_mut() else {
        return None;
    };

    let (name, rest) = if tag == "@template" || tag == "@typeParam" {
        split_type_parameter_list(text)
    } else {
        split_name(text)
    };
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix('-') {
        Some(after) if after.is_empty() || after.starts_with(char::is_whitespace) => {
            after.trim_start()
        }
        _ => rest,
    };

    let name = name.filter(|name| !name.is_empty());
    *text = rest.to_string();
    if text.is_empty() {
        parts.remove(0);
    }
    name
}

fn split_name(text: &str) -> (Option<String>, &str) {
    if let Some(bracketed) = text.strip_prefix('[') {
        if let Some(close) = bracketed.find(']') {
            let inner = &bracketed[..close];
            let name = inner.split('=').next().unwrap_or_default().trim();
            return (Some(name.to_string()), &bracketed[close + 1..]);
        }
    }

    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    (Some(text[..end].to_string()), &text[end..])
}

fn split_type_parameter_list(text: &str) -> (Option<String>, &str) {
    let mut first = None;
    let mut rest = text;
    loop {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ',')
            .unwrap_or(rest.len());
        if first.is_none() {
            first = Some(rest[..end].to_string());
        }
        let after = rest[end..].trim_start();
        match after.strip_prefix(',') {
            Some(next) => rest = next.trim_start(),
            None => return (first, &rest[end..]),
        }
    }
}
