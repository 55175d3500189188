// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL lexer
//!
//! A forgiving tokenizer for partially typed SQL. It never fails: unterminated
//! strings, quoted identifiers and comments simply run to the end of input.

use crate::keywords::KeywordProvider;

/// Token classes the classifier cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    Keyword,
    Name,
    QuotedName,
    String,
    Number,
    Punctuation,
    Operator,
    /// psql-style backslash command such as `\c`
    MetaCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the input
    pub offset: usize,
}

impl Token<'_> {
    /// Whether this token is not whitespace or a comment
    pub fn is_significant(&self) -> bool {
        !matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Whether this is a keyword token equal to `word` (case-insensitive)
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punct
    }

    /// Whether this token can name a relation or column
    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TokenKind::Name | TokenKind::QuotedName)
    }

    /// Byte offset just past the token
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

/// Split `sql` into tokens, whitespace and comments included
pub fn tokenize(sql: &str) -> Vec<Token<'_>> {
    let keywords = KeywordProvider::new();
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < sql.len() {
        let rest = &sql[pos..];
        let Some(c) = rest.chars().next() else { break };

        let (kind, len) = if c.is_whitespace() {
            (TokenKind::Whitespace, take_while(rest, char::is_whitespace))
        } else if rest.starts_with("--") {
            (TokenKind::Comment, rest.find('\n').unwrap_or(rest.len()))
        } else if rest.starts_with("/*") {
            (TokenKind::Comment, rest[2..].find("*/").map_or(rest.len(), |i| i + 4))
        } else if c == '\'' {
            (TokenKind::String, quoted_len(rest, '\''))
        } else if c == '"' {
            (TokenKind::QuotedName, quoted_len(rest, '"'))
        } else if c == '$' && let Some(len) = dollar_quoted_len(rest) {
            (TokenKind::String, len)
        } else if c.is_ascii_digit() {
            (TokenKind::Number, take_while(rest, |c| c.is_ascii_alphanumeric() || c == '.'))
        } else if c == '_' || c.is_alphabetic() {
            let len = take_while(rest, |c| c == '_' || c == '$' || c.is_alphanumeric());
            let kind = if keywords.is_keyword(&rest[..len]) {
                TokenKind::Keyword
            } else {
                TokenKind::Name
            };
            (kind, len)
        } else if c == '\\' {
            (TokenKind::MetaCommand, 1 + take_while(&rest[1..], |c| c.is_alphanumeric() || c == '+'))
        } else if rest.starts_with("::") {
            (TokenKind::Operator, 2)
        } else if "(),;.[]".contains(c) {
            (TokenKind::Punctuation, 1)
        } else if is_operator_char(c) {
            (TokenKind::Operator, take_while(rest, is_operator_char))
        } else {
            (TokenKind::Operator, c.len_utf8())
        };

        tokens.push(Token {
            kind,
            text: &sql[pos..pos + len],
            offset: pos,
        });
        pos += len;
        debug_assert!(pos <= bytes.len());
    }

    tokens
}

/// Significant tokens only
pub fn significant_tokens(sql: &str) -> Vec<Token<'_>> {
    tokenize(sql).into_iter().filter(Token::is_significant).collect()
}

fn take_while(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|(_, c)| !pred(*c))
        .map_or(s.len(), |(i, _)| i)
}

fn is_operator_char(c: char) -> bool {
    "+-*/<>=~!@#%^&|`?:".contains(c)
}

/// Length of a quoted run starting at `s[0] == quote`; a doubled quote is an
/// escaped quote
fn quoted_len(s: &str, quote: char) -> usize {
    let mut chars = s.char_indices().skip(1).peekable();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            if chars.peek().is_some_and(|(_, next)| *next == quote) {
                chars.next();
            } else {
                return i + 1;
            }
        }
    }
    s.len()
}

/// Length of a `$tag$ ... $tag$` string, if `s` starts with a dollar quote
fn dollar_quoted_len(s: &str) -> Option<usize> {
    let tag_len = 1 + take_while(&s[1..], |c| c == '_' || c.is_alphanumeric());
    if !s[tag_len..].starts_with('$') {
        return None;
    }
    let tag = &s[..tag_len + 1];
    let body = &s[tag.len()..];
    Some(body.find(tag).map_or(s.len(), |i| tag.len() + i + tag.len()))
}
