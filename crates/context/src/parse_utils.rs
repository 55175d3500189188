// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Parse utilities
//!
//! Token-level helpers shared by the classifier and the engine: word
//! extraction at the cursor, statement isolation, table extraction and
//! partial identifier splitting.

use std::sync::LazyLock;

use regex::Regex;
use sqlcomplete_catalog::names::fold_identifier;

use crate::lexer::{Token, TokenKind, significant_tokens, tokenize};
use crate::suggestion::TableReference;

/// Which characters end the word before the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordBoundary {
    /// Only word characters belong to the word
    AlphanumUnderscore,
    /// Everything but parentheses, colons, commas and whitespace
    ManyPunctuations,
    /// Like [`ManyPunctuations`](Self::ManyPunctuations), also stopping at `.`
    MostPunctuations,
    /// Everything but whitespace
    AllPunctuations,
}

static ALPHANUM_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)$").expect("valid word regex"));
static MANY_PUNCTUATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^():,\s]+)$").expect("valid word regex"));
static MOST_PUNCTUATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\.():,\s]+)$").expect("valid word regex"));
static ALL_PUNCTUATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s]+)$").expect("valid word regex"));

impl WordBoundary {
    fn regex(self) -> &'static Regex {
        match self {
            WordBoundary::AlphanumUnderscore => &ALPHANUM_UNDERSCORE,
            WordBoundary::ManyPunctuations => &MANY_PUNCTUATIONS,
            WordBoundary::MostPunctuations => &MOST_PUNCTUATIONS,
            WordBoundary::AllPunctuations => &ALL_PUNCTUATIONS,
        }
    }
}

/// The word immediately before the end of `text`
///
/// Empty when `text` ends in whitespace or in a boundary character.
///
/// # Examples
///
/// ```
/// use sqlcomplete_context::parse_utils::{WordBoundary, last_word};
///
/// assert_eq!(last_word("SELECT u.na", WordBoundary::ManyPunctuations), "u.na");
/// assert_eq!(last_word("SELECT u.na", WordBoundary::MostPunctuations), "na");
/// assert_eq!(last_word("SELECT ", WordBoundary::AllPunctuations), "");
/// ```
pub fn last_word(text: &str, boundary: WordBoundary) -> &str {
    if text.is_empty() || text.ends_with(char::is_whitespace) {
        return "";
    }
    boundary.regex().find(text).map_or("", |m| m.as_str())
}

/// A possibly qualified identifier being typed at the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialIdentifier {
    /// Folded qualifier before the last `.`, e.g. `public` or `u`
    pub parent: Option<String>,
    /// The text after the last `.`, as typed
    pub name: String,
}

/// Split a typed word at its last unquoted `.`
///
/// Each qualifier part is folded the way PostgreSQL folds identifiers.
pub fn parse_partial_identifier(word: &str) -> PartialIdentifier {
    let dots = unquoted_dots(word);
    let Some(&last) = dots.last() else {
        return PartialIdentifier {
            parent: None,
            name: word.to_string(),
        };
    };

    let mut parts = Vec::with_capacity(dots.len());
    let mut start = 0;
    for &dot in &dots {
        parts.push(fold_identifier(&word[start..dot]));
        start = dot + 1;
    }

    PartialIdentifier {
        parent: Some(parts.join(".")),
        name: word[last + 1..].to_string(),
    }
}

fn unquoted_dots(word: &str) -> Vec<usize> {
    let mut in_quotes = false;
    word.char_indices()
        .filter_map(|(i, c)| {
            match c {
                '"' => in_quotes = !in_quotes,
                '.' if !in_quotes => return Some(i),
                _ => {}
            }
            None
        })
        .collect()
}

/// Byte range of the statement that contains the cursor
///
/// `cursor` is a byte offset into `sql`; statements are separated by `;`
/// tokens (semicolons inside strings, quoted names and comments do not
/// count).
pub fn statement_bounds(sql: &str, cursor: usize) -> (usize, usize) {
    let mut start = 0;
    let mut end = sql.len();
    for token in tokenize(sql) {
        if !token.is_punct(";") {
            continue;
        }
        if token.offset < cursor {
            start = token.end();
        } else {
            end = token.offset;
            break;
        }
    }
    (start, end)
}

/// Index of the last keyword (or opening parenthesis) in `tokens`
///
/// Logical operators do not count, so `WHERE a = 1 AND b = ` leads back to
/// `WHERE`.
pub fn find_prev_keyword(tokens: &[Token<'_>]) -> Option<usize> {
    const LOGICAL_OPERATORS: [&str; 4] = ["AND", "OR", "NOT", "BETWEEN"];
    tokens.iter().rposition(|token| {
        token.is_punct("(")
            || (token.kind == TokenKind::Keyword
                && !LOGICAL_OPERATORS
                    .iter()
                    .any(|op| token.text.eq_ignore_ascii_case(op)))
    })
}

/// Every relation referenced by a FROM, JOIN, INTO, UPDATE, COPY or TABLE
/// clause of `sql`, in order of appearance
///
/// Subqueries are scanned in place; the statement need not be complete.
///
/// # Examples
///
/// ```
/// use sqlcomplete_context::parse_utils::extract_tables;
///
/// let tables = extract_tables("SELECT * FROM public.users u JOIN orders ON ");
/// assert_eq!(tables.len(), 2);
/// assert_eq!(tables[0].schema.as_deref(), Some("public"));
/// assert_eq!(tables[0].alias.as_deref(), Some("u"));
/// assert_eq!(tables[1].name, "orders");
/// ```
pub fn extract_tables(sql: &str) -> Vec<TableReference> {
    let tokens = significant_tokens(sql);
    let is_insert = tokens.first().is_some_and(|t| t.is_keyword("INSERT"));

    let mut tables = Vec::new();
    let mut pos = 0;
    while pos < tokens.len() {
        if starts_table_list(&tokens[pos]) {
            pos = parse_table_list(&tokens, pos + 1, !is_insert, &mut tables);
        } else {
            pos += 1;
        }
    }
    tables
}

fn starts_table_list(token: &Token<'_>) -> bool {
    const CLAUSES: [&str; 6] = ["FROM", "JOIN", "INTO", "UPDATE", "COPY", "TABLE"];
    token.kind == TokenKind::Keyword && CLAUSES.iter().any(|c| token.text.eq_ignore_ascii_case(c))
}

/// Parse `item [, item ...]` starting at `pos`, returning the position of the
/// first token that does not belong to the list
fn parse_table_list(
    tokens: &[Token<'_>],
    mut pos: usize,
    allow_functions: bool,
    tables: &mut Vec<TableReference>,
) -> usize {
    loop {
        while tokens
            .get(pos)
            .is_some_and(|t| t.is_keyword("ONLY") || t.is_keyword("LATERAL"))
        {
            pos += 1;
        }

        let Some(first) = tokens.get(pos).filter(|t| t.is_identifier()) else {
            return pos;
        };
        let mut parts = vec![fold_identifier(first.text)];
        pos += 1;
        while tokens.get(pos).is_some_and(|t| t.is_punct("."))
            && let Some(part) = tokens.get(pos + 1).filter(|t| t.is_identifier())
        {
            parts.push(fold_identifier(part.text));
            pos += 2;
        }

        let mut is_function = false;
        if allow_functions && tokens.get(pos).is_some_and(|t| t.is_punct("(")) {
            is_function = true;
            pos = skip_parenthesized(tokens, pos);
        }

        let mut alias = None;
        if tokens.get(pos).is_some_and(|t| t.is_keyword("AS")) {
            pos += 1;
        }
        if let Some(token) = tokens.get(pos).filter(|t| t.is_identifier()) {
            alias = Some(fold_identifier(token.text));
            pos += 1;
        }

        let name = parts.pop().unwrap_or_default();
        let mut table = TableReference::new(name);
        if let Some(schema) = parts.pop() {
            table = table.with_schema(schema);
        }
        if let Some(alias) = alias {
            table = table.with_alias(alias);
        }
        if is_function {
            table = table.function();
        }
        tables.push(table);

        if tokens.get(pos).is_some_and(|t| t.is_punct(",")) {
            pos += 1;
        } else {
            return pos;
        }
    }
}

/// Position just past the parenthesis matching the one at `open`
fn skip_parenthesized(tokens: &[Token<'_>], open: usize) -> usize {
    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return open + offset + 1;
            }
        }
    }
    tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_word_boundaries() {
        assert_eq!(last_word("abc def", WordBoundary::AlphanumUnderscore), "def");
        assert_eq!(last_word("abc def,", WordBoundary::AlphanumUnderscore), "");
        assert_eq!(last_word("f(x.y", WordBoundary::ManyPunctuations), "x.y");
        assert_eq!(last_word("f(x.y", WordBoundary::MostPunctuations), "y");
        assert_eq!(last_word("a = (x.y", WordBoundary::AllPunctuations), "(x.y");
        assert_eq!(last_word("", WordBoundary::AllPunctuations), "");
        assert_eq!(last_word("SELECT \"Us", WordBoundary::MostPunctuations), "\"Us");
    }

    #[test]
    fn test_parse_partial_identifier() {
        let ident = parse_partial_identifier("u.na");
        assert_eq!(ident.parent.as_deref(), Some("u"));
        assert_eq!(ident.name, "na");

        let ident = parse_partial_identifier("\"My.Schema\".ta");
        assert_eq!(ident.parent.as_deref(), Some("My.Schema"));
        assert_eq!(ident.name, "ta");

        let ident = parse_partial_identifier("Public.");
        assert_eq!(ident.parent.as_deref(), Some("public"));
        assert_eq!(ident.name, "");

        assert_eq!(parse_partial_identifier("abc").parent, None);
    }

    #[test]
    fn test_statement_bounds() {
        let sql = "select 1; select * from t; select 2";
        let cursor = sql.find("from").unwrap();
        let (start, end) = statement_bounds(sql, cursor);
        assert_eq!(&sql[start..end], " select * from t");

        let (start, end) = statement_bounds("select ';' from t", 12);
        assert_eq!((start, end), (0, 17));
    }

    #[test]
    fn test_find_prev_keyword_skips_logical_operators() {
        let tokens = significant_tokens("SELECT * FROM t WHERE a = 1 AND b =");
        let idx = find_prev_keyword(&tokens).unwrap();
        assert_eq!(tokens[idx].text, "WHERE");

        let tokens = significant_tokens("INSERT INTO t (a,");
        let idx = find_prev_keyword(&tokens).unwrap();
        assert_eq!(tokens[idx].text, "(");

        assert_eq!(find_prev_keyword(&significant_tokens("a, b")), None);
    }

    #[test]
    fn test_extract_tables_with_aliases_and_joins() {
        let tables = extract_tables(
            "SELECT * FROM users AS u, \"Audit\".\"Events\" e LEFT JOIN orders o ON o.user_id = u.id",
        );
        assert_eq!(
            tables,
            vec![
                TableReference::new("users").with_alias("u"),
                TableReference::new("Events").with_schema("Audit").with_alias("e"),
                TableReference::new("orders").with_alias("o"),
            ]
        );
    }

    #[test]
    fn test_extract_tables_functions_and_subqueries() {
        let tables = extract_tables(
            "SELECT * FROM generate_series(1, 10) g, (SELECT id FROM orders) sub WHERE",
        );
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0], TableReference::new("generate_series").with_alias("g").function());
        assert_eq!(tables[1], TableReference::new("orders"));
    }

    #[test]
    fn test_extract_tables_insert_and_update() {
        assert_eq!(
            extract_tables("INSERT INTO users (id, name) VALUES (1, 'x')"),
            vec![TableReference::new("users")]
        );
        assert_eq!(
            extract_tables("UPDATE public.users SET name = 'x'"),
            vec![TableReference::new("users").with_schema("public")]
        );
    }
}
