//! SGML body reader
//!
//! Turns the body of an OFX 1.x document into an element tree. OFX SGML
//! has no DTD-driven tag omission beyond one rule: a tag directly followed
//! by text is a leaf element whose end tag may be omitted, while a tag
//! directly followed by another tag opens an aggregate that must be closed
//! explicitly.
//!
//! # Components
//!
//! - `Token` / `tokenize` - tags and text with their 1-based line
//! - `Element` / `build_tree` - the element tree rooted at `<OFX>`

use crate::types::{ParseError, ParseErrorKind};
use std::iter::Peekable;

/// A lexical unit of the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open { tag: String, line: usize },
    Close { tag: String, line: usize },
    Text { text: String, line: usize },
}

/// Content of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Leaf element value, trimmed
    Value(String),
    /// Aggregate children in document order
    Children(Vec<Element>),
}

/// A node of the body tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Line of the opening tag
    pub line: usize,
    pub content: Content,
}

impl Element {
    /// Leaf value, `None` for aggregates
    pub fn value(&self) -> Option<&str> {
        match &self.content {
            Content::Value(value) => Some(value),
            Content::Children(_) => None,
        }
    }

    /// Children, empty for leaves
    pub fn children(&self) -> &[Element] {
        match &self.content {
            Content::Value(_) => &[],
            Content::Children(children) => children,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.content, Content::Children(_))
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children().iter().find(|c| c.tag == tag)
    }
}

/// Split the body into tokens
///
/// `first_line` is the line number of the body's first character in the
/// whole document.
///
/// # Errors
///
/// Fails on an unterminated tag or a tag whose name is not made of ASCII
/// letters, digits, `.` or `_`.
pub fn tokenize(body: &str, first_line: usize) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut line = first_line;
    let mut rest = body;

    while !rest.is_empty() {
        let text_end = rest.find('<').unwrap_or(rest.len());
        let (text, tail) = rest.split_at(text_end);
        push_text(&mut tokens, text, line);
        line += newlines(text);
        rest = tail;

        if rest.is_empty() {
            break;
        }

        let Some(close) = rest.find('>') else {
            return Err(malformed_tag(rest, line));
        };
        let raw = &rest[..=close];
        let inner = &rest[1..close];
        let (is_close, name) = match inner.strip_prefix('/') {
            Some(name) => (true, name),
            None => (false, inner),
        };
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            return Err(malformed_tag(raw, line));
        }

        let tag = name.to_string();
        tokens.push(if is_close {
            Token::Close { tag, line }
        } else {
            Token::Open { tag, line }
        });
        line += newlines(raw);
        rest = &rest[close + 1..];
    }

    Ok(tokens)
}

fn push_text(tokens: &mut Vec<Token>, text: &str, line: usize) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    tokens.push(Token::Text {
        text: trimmed.to_string(),
        line: line + newlines(leading),
    });
}

fn newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

fn malformed_tag(text: &str, line: usize) -> ParseError {
    let text = text.lines().next().unwrap_or_default();
    ParseError::new(
        line,
        ParseErrorKind::MalformedTag {
            text: text.to_string(),
        },
    )
}

struct Frame {
    tag: String,
    line: usize,
    children: Vec<Element>,
}

/// Build the element tree from the token stream
///
/// # Errors
///
/// Fails with the offending line on stray or mismatched close tags,
/// unclosed aggregates, text outside an element, a root other than `<OFX>`,
/// or anything after the root is closed.
pub fn build_tree(tokens: Vec<Token>) -> Result<Element, ParseError> {
    let mut tokens = tokens.into_iter().peekable();
    let mut stack: Vec<Frame> = Vec::new();

    while let Some(token) = tokens.next() {
        match token {
            Token::Open { tag, line } => {
                if stack.is_empty() && tag != "OFX" {
                    return Err(ParseError::new(line, ParseErrorKind::UnexpectedRoot { tag }));
                }
                match take_leaf_value(&mut tokens, &tag) {
                    Some(value) => {
                        let Some(parent) = stack.last_mut() else {
                            return Err(ParseError::new(
                                line,
                                ParseErrorKind::ExpectedAggregate { tag },
                            ));
                        };
                        parent.children.push(Element {
                            tag,
                            line,
                            content: Content::Value(value),
                        });
                    }
                    None => stack.push(Frame {
                        tag,
                        line,
                        children: Vec::new(),
                    }),
                }
            }
            Token::Close { tag, line } => {
                let Some(frame) = stack.pop() else {
                    return Err(ParseError::new(
                        line,
                        ParseErrorKind::MismatchedClose {
                            expected: None,
                            found: tag,
                        },
                    ));
                };
                if frame.tag != tag {
                    return Err(ParseError::new(
                        line,
                        ParseErrorKind::MismatchedClose {
                            expected: Some(frame.tag),
                            found: tag,
                        },
                    ));
                }

                let element = Element {
                    tag: frame.tag,
                    line: frame.line,
                    content: Content::Children(frame.children),
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => {
                        if let Some(extra) = tokens.next() {
                            return Err(ParseError::new(
                                token_line(&extra),
                                ParseErrorKind::TrailingContent,
                            ));
                        }
                        return Ok(element);
                    }
                }
            }
            Token::Text { text, line } => {
                return Err(ParseError::new(line, ParseErrorKind::UnexpectedText { text }));
            }
        }
    }

    match stack.pop() {
        Some(frame) => Err(ParseError::new(
            frame.line,
            ParseErrorKind::Unclosed { tag: frame.tag },
        )),
        None => Err(ParseError::new(1, ParseErrorKind::MissingBody)),
    }
}

/// Consume the value of a leaf element, and its optional end tag
fn take_leaf_value<I>(tokens: &mut Peekable<I>, tag: &str) -> Option<String>
where
    I: Iterator<Item = Token>,
{
    let value = match tokens.peek() {
        Some(Token::Text { text, .. }) => text.clone(),
        _ => return None,
    };
    tokens.next();

    if matches!(tokens.peek(), Some(Token::Close { tag: close, .. }) if close == tag) {
        tokens.next();
    }
    Some(value)
}

fn token_line(token: &Token) -> usize {
    match token {
        Token::Open { line, .. } | Token::Close { line, .. } | Token::Text { line, .. } => *line,
    }
}
