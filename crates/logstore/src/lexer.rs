//! Query Lexer
//!
//! Splits a query string into tokens for [`crate::query::parse`]. Terms may
//! contain `-`, `+`, `.`, `!` and `=` after their first character; any
//! special character can be escaped with a backslash. Inside a range and
//! right after a comparison operator, a leading sign belongs to the value.

use crate::error::{QueryError, QueryResult};

/// One element of a wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Glob {
    Literal(char),
    /// `?`
    AnyOne,
    /// `*`
    AnyMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Unescaped text; `glob` is set when the term has unescaped wildcards
    Term { text: String, glob: Option<Vec<Glob>> },
    Phrase(String),
    LParen,
    RParen,
    Colon,
    Caret,
    Plus,
    Minus,
    Bang,
    And,
    Or,
    Not,
    /// `[` (inclusive) or `{` (exclusive)
    RangeOpen { inclusive: bool },
    /// `]` (inclusive) or `}` (exclusive)
    RangeClose { inclusive: bool },
    Cmp(CmpOp),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the token's first character
    pub position: usize,
}

fn is_term_stop(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '(' | ')' | ':' | '^' | '[' | ']' | '{' | '}' | '"' | '~' | '<' | '>'
        )
}

pub fn tokenize(query: &str) -> QueryResult<Vec<Token>> {
    let chars: Vec<char> = query.chars().collect();
    let err = |position: usize, message: &str| QueryError::new(query, position, message);

    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;
    let mut in_range = false;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let value_position =
            in_range || matches!(tokens.last(), Some(Token { kind: TokenKind::Cmp(_), .. }));
        let simple = match c {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ':' => Some(TokenKind::Colon),
            '^' => Some(TokenKind::Caret),
            '+' if !value_position => Some(TokenKind::Plus),
            '-' if !value_position => Some(TokenKind::Minus),
            '!' if !value_position => Some(TokenKind::Bang),
            '[' => Some(TokenKind::RangeOpen { inclusive: true }),
            '{' => Some(TokenKind::RangeOpen { inclusive: false }),
            ']' => Some(TokenKind::RangeClose { inclusive: true }),
            '}' => Some(TokenKind::RangeClose { inclusive: false }),
            _ => None,
        };
        if let Some(kind) = simple {
            match kind {
                TokenKind::RangeOpen { .. } => in_range = true,
                TokenKind::RangeClose { .. } => in_range = false,
                _ => {}
            }
            tokens.push(Token { kind, position: start });
            i += 1;
            continue;
        }

        match c {
            '~' => return Err(err(start, "fuzzy and proximity operators are not supported")),
            '>' | '<' => {
                let or_equal = chars.get(i + 1) == Some(&'=');
                let op = match (c, or_equal) {
                    ('>', false) => CmpOp::Gt,
                    ('>', true) => CmpOp::Ge,
                    ('<', false) => CmpOp::Lt,
                    _ => CmpOp::Le,
                };
                i += if or_equal { 2 } else { 1 };
                tokens.push(Token {
                    kind: TokenKind::Cmp(op),
                    position: start,
                });
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                i += 2;
                tokens.push(Token {
                    kind: TokenKind::And,
                    position: start,
                });
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                i += 2;
                tokens.push(Token {
                    kind: TokenKind::Or,
                    position: start,
                });
            }
            '"' => {
                i += 1;
                let mut text = String::new();
                loop {
                    match chars.get(i) {
                        None => return Err(err(start, "unterminated phrase")),
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => match chars.get(i + 1) {
                            Some(&escaped) => {
                                text.push(escaped);
                                i += 2;
                            }
                            None => return Err(err(i, "dangling escape character")),
                        },
                        Some(&other) => {
                            text.push(other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Phrase(text),
                    position: start,
                });
            }
            _ => {
                let mut text = String::new();
                let mut glob = Vec::new();
                let mut has_wildcard = false;
                while i < chars.len() && !is_term_stop(chars[i]) {
                    match chars[i] {
                        '\\' => match chars.get(i + 1) {
                            Some(&escaped) => {
                                text.push(escaped);
                                glob.push(Glob::Literal(escaped));
                                i += 2;
                            }
                            None => return Err(err(i, "dangling escape character")),
                        },
                        '*' => {
                            text.push('*');
                            glob.push(Glob::AnyMany);
                            has_wildcard = true;
                            i += 1;
                        }
                        '?' => {
                            text.push('?');
                            glob.push(Glob::AnyOne);
                            has_wildcard = true;
                            i += 1;
                        }
                        other => {
                            text.push(other);
                            glob.push(Glob::Literal(other));
                            i += 1;
                        }
                    }
                }

                let raw: String = chars[start..i].iter().collect();
                let kind = match raw.as_str() {
                    "AND" => TokenKind::And,
                    "OR" => TokenKind::Or,
                    "NOT" => TokenKind::Not,
                    _ => TokenKind::Term {
                        text,
                        glob: has_wildcard.then_some(glob),
                    },
                };
                tokens.push(Token { kind, position: start });
            }
        }
    }

    Ok(tokens)
}
