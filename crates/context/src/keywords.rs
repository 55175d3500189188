// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Keywords for Completion
//!
//! Literal tables for PostgreSQL: keyword candidates with the keywords that
//! may follow them, built-in function and datatype names, and the reserved
//! words that force an identifier to be quoted.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Keyword candidates and the keywords known to follow each one
///
/// An empty follower list means "anything may follow".
const KEYWORD_TREE: &[(&str, &[&str])] = &[
    ("ACCESS", &[]),
    ("ADD", &[]),
    ("ALL", &[]),
    (
        "ALTER",
        &[
            "AGGREGATE", "COLLATION", "COLUMN", "CONVERSION", "DATABASE", "DEFAULT", "DOMAIN",
            "EVENT TRIGGER", "EXTENSION", "FOREIGN", "FUNCTION", "GROUP", "INDEX", "LANGUAGE",
            "LARGE OBJECT", "MATERIALIZED VIEW", "OPERATOR", "POLICY", "ROLE", "RULE", "SCHEMA",
            "SEQUENCE", "SERVER", "SYSTEM", "TABLE", "TABLESPACE", "TEXT SEARCH", "TRIGGER",
            "TYPE", "USER", "VIEW",
        ],
    ),
    ("AND", &[]),
    ("ANY", &[]),
    ("AS", &[]),
    ("ASC", &[]),
    ("BETWEEN", &[]),
    ("BY", &[]),
    ("CASE", &[]),
    ("CHECK", &[]),
    ("CLUSTER", &[]),
    ("COLUMN", &[]),
    ("COMMENT", &[]),
    ("CONCURRENTLY", &[]),
    ("COPY", &[]),
    (
        "CREATE",
        &[
            "ACCESS METHOD", "AGGREGATE", "CAST", "COLLATION", "CONVERSION", "DATABASE", "DOMAIN",
            "EVENT TRIGGER", "EXTENSION", "FOREIGN DATA WRAPPER", "FOREIGN TABLE", "FUNCTION",
            "GLOBAL", "GROUP", "IF NOT EXISTS", "INDEX", "LANGUAGE", "LOCAL",
            "MATERIALIZED VIEW", "OPERATOR", "OR REPLACE", "POLICY", "ROLE", "RULE", "SCHEMA",
            "SEQUENCE", "SERVER", "TABLE", "TABLESPACE", "TEMPORARY", "TEXT SEARCH", "TRIGGER",
            "TYPE", "UNIQUE", "UNLOGGED", "USER", "USER MAPPING", "VIEW",
        ],
    ),
    ("CROSS JOIN", &[]),
    ("CURRENT", &[]),
    ("DATABASE", &[]),
    ("DEFAULT", &[]),
    ("DELETE FROM", &[]),
    ("DESC", &[]),
    ("DESCRIBE", &[]),
    ("DISTINCT", &[]),
    (
        "DROP",
        &[
            "ACCESS METHOD", "AGGREGATE", "CAST", "COLLATION", "COLUMN", "CONVERSION", "DATABASE",
            "DOMAIN", "EVENT TRIGGER", "EXTENSION", "FOREIGN DATA WRAPPER", "FOREIGN TABLE",
            "FUNCTION", "GROUP", "INDEX", "LANGUAGE", "MATERIALIZED VIEW", "OPERATOR", "OWNED",
            "POLICY", "ROLE", "RULE", "SCHEMA", "SEQUENCE", "SERVER", "TABLE", "TABLESPACE",
            "TEXT SEARCH", "TRANSFORM", "TRIGGER", "TYPE", "USER", "USER MAPPING", "VIEW",
        ],
    ),
    ("ELSE", &[]),
    ("END", &[]),
    ("ESCAPE", &[]),
    ("EXCEPT", &[]),
    ("EXISTS", &[]),
    ("EXPLAIN", &[]),
    ("FALSE", &[]),
    ("FETCH", &[]),
    ("FOR", &[]),
    ("FOREIGN KEY", &[]),
    ("FROM", &[]),
    ("FULL JOIN", &[]),
    ("FUNCTION", &[]),
    ("GRANT", &[]),
    ("GROUP BY", &[]),
    ("HAVING", &[]),
    ("ILIKE", &[]),
    ("IN", &[]),
    ("INDEX", &[]),
    ("INNER JOIN", &[]),
    ("INSERT INTO", &[]),
    ("INTERSECT", &[]),
    ("INTERVAL", &[]),
    ("INTO", &[]),
    ("IS", &["DISTINCT FROM", "NOT", "NOT DISTINCT FROM", "NOT NULL", "NULL"]),
    ("JOIN", &[]),
    ("LATERAL", &[]),
    ("LEFT JOIN", &[]),
    ("LIKE", &[]),
    ("LIMIT", &[]),
    ("LOCK", &[]),
    ("NATURAL JOIN", &[]),
    ("NOT", &[]),
    ("NULL", &[]),
    ("OFFSET", &[]),
    ("ON", &[]),
    ("OR", &[]),
    ("ORDER BY", &[]),
    ("OUTER", &[]),
    ("OWNER", &[]),
    ("PRIMARY KEY", &[]),
    ("REFERENCES", &[]),
    ("REFRESH MATERIALIZED VIEW", &[]),
    ("RENAME", &[]),
    ("REPLACE", &[]),
    ("RESET", &["ALL"]),
    ("RETURNING", &[]),
    ("RETURNS", &[]),
    ("REVOKE", &[]),
    ("RIGHT JOIN", &[]),
    ("ROLLBACK", &[]),
    ("SCHEMA", &[]),
    ("SELECT", &[]),
    ("SET", &[]),
    ("SHOW", &[]),
    ("TABLE", &[]),
    ("TEMPLATE", &[]),
    ("THEN", &[]),
    ("TO", &[]),
    ("TRIGGER", &[]),
    ("TRUE", &[]),
    ("TRUNCATE", &[]),
    ("UNION", &[]),
    ("UNIQUE", &[]),
    ("UPDATE", &[]),
    ("USE", &[]),
    ("USING", &[]),
    ("VALUES", &[]),
    ("VIEW", &[]),
    ("WHEN", &[]),
    ("WHERE", &[]),
    ("WINDOW", &[]),
    ("WITH", &[]),
];

/// Built-in function names offered when no schema is typed
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "ABS", "ARRAY_AGG", "AVG", "COALESCE", "CONCAT", "COUNT", "CURRENT_DATE",
    "CURRENT_TIMESTAMP", "DATE_TRUNC", "EXTRACT", "FIRST", "FORMAT", "GREATEST", "LAST",
    "LEAST", "LENGTH", "LOWER", "MAX", "MIN", "NOW", "NULLIF", "ROUND", "STRING_AGG",
    "SUBSTRING", "SUM", "TO_CHAR", "TRIM", "UPPER",
];

/// Built-in datatype names offered when no schema is typed
pub const BUILTIN_DATATYPES: &[&str] = &[
    "BIGINT", "BIGSERIAL", "BOOLEAN", "BYTEA", "CHAR", "DATE", "DOUBLE PRECISION", "INT",
    "INTEGER", "INTERVAL", "JSON", "JSONB", "NUMERIC", "REAL", "SERIAL", "SMALLINT", "TEXT",
    "TIME", "TIMESTAMP", "TIMESTAMPTZ", "UUID", "VARCHAR",
];

/// PostgreSQL reserved words; identifiers spelled like one must be quoted
pub const RESERVED_WORDS: &[&str] = &[
    "ALL", "ANALYSE", "ANALYZE", "AND", "ANY", "ARRAY", "AS", "ASC", "ASYMMETRIC", "BOTH",
    "CASE", "CAST", "CHECK", "COLLATE", "COLUMN", "CONSTRAINT", "CREATE", "CURRENT_CATALOG",
    "CURRENT_DATE", "CURRENT_ROLE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
    "DEFAULT", "DEFERRABLE", "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "FALSE",
    "FETCH", "FOR", "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN", "INITIALLY",
    "INTERSECT", "INTO", "LATERAL", "LEADING", "LIMIT", "LOCALTIME", "LOCALTIMESTAMP", "NOT",
    "NULL", "OFFSET", "ON", "ONLY", "OR", "ORDER", "PLACING", "PRIMARY", "REFERENCES",
    "RETURNING", "SELECT", "SESSION_USER", "SOME", "SYMMETRIC", "TABLE", "THEN", "TO",
    "TRAILING", "TRUE", "UNION", "UNIQUE", "USER", "USING", "VARIADIC", "WHEN", "WHERE",
    "WINDOW", "WITH",
];

/// Words the lexer classifies as keywords beyond the reserved ones
const CLAUSE_WORDS: &[&str] = &[
    "ALTER", "BETWEEN", "BY", "COPY", "CROSS", "DATABASE", "DELETE", "DESCRIBE", "DROP",
    "EXISTS", "EXPLAIN", "FULL", "FUNCTION", "ILIKE", "INNER", "INSERT", "IS", "JOIN", "LEFT",
    "LIKE", "NATURAL", "OUTER", "REPLACE", "RIGHT", "SCHEMA", "SET", "TEMPLATE", "TRUNCATE",
    "TYPE", "UPDATE", "USE", "VALUES", "VIEW",
];

static FOLLOWERS: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| KEYWORD_TREE.iter().copied().collect());

static LEXER_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    RESERVED_WORDS
        .iter()
        .chain(CLAUSE_WORDS.iter())
        .copied()
        .collect()
});

/// Keyword lookups for completion
///
/// Pure reads over the static tables; cheap to construct.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordProvider;

impl KeywordProvider {
    pub fn new() -> Self {
        Self
    }

    /// Every keyword candidate, upper-case, in table order
    pub fn all(&self) -> impl Iterator<Item = &'static str> {
        KEYWORD_TREE.iter().map(|(keyword, _)| *keyword)
    }

    /// Keywords known to follow `last_token`, if the table narrows it
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlcomplete_context::keywords::KeywordProvider;
    ///
    /// let keywords = KeywordProvider::new();
    /// assert!(keywords.followers("create").unwrap().contains(&"TABLE"));
    /// assert!(keywords.followers("SELECT").is_none());
    /// ```
    pub fn followers(&self, last_token: &str) -> Option<&'static [&'static str]> {
        FOLLOWERS
            .get(last_token.to_uppercase().as_str())
            .copied()
            .filter(|followers| !followers.is_empty())
    }

    /// Whether the lexer should treat `word` as a keyword token
    pub fn is_keyword(&self, word: &str) -> bool {
        LEXER_KEYWORDS.contains(word.to_uppercase().as_str())
    }

    pub fn builtin_functions(&self) -> &'static [&'static str] {
        BUILTIN_FUNCTIONS
    }

    pub fn builtin_datatypes(&self) -> &'static [&'static str] {
        BUILTIN_DATATYPES
    }

    /// Words an identifier must not be spelled like unquoted
    pub fn reserved_words(&self) -> impl Iterator<Item = &'static str> {
        RESERVED_WORDS.iter().chain(BUILTIN_FUNCTIONS.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table_is_upper_case_and_unique() {
        let provider = KeywordProvider::new();
        let mut seen = HashSet::new();
        for keyword in provider.all() {
            assert_eq!(keyword, keyword.to_uppercase());
            assert!(seen.insert(keyword), "duplicate keyword {keyword}");
        }
    }

    #[test]
    fn test_followers() {
        let provider = KeywordProvider::new();
        assert!(provider.followers("drop").unwrap().contains(&"FUNCTION"));
        assert_eq!(provider.followers("RESET"), Some(&["ALL"][..]));
        assert!(provider.followers("where").is_none());
        assert!(provider.followers("no_such_word").is_none());
    }

    #[test]
    fn test_is_keyword() {
        let provider = KeywordProvider::new();
        assert!(provider.is_keyword("select"));
        assert!(provider.is_keyword("Join"));
        assert!(!provider.is_keyword("users"));
        assert!(!provider.is_keyword("name"));
    }

    #[test]
    fn test_reserved_words_include_functions() {
        let reserved: HashSet<_> = KeywordProvider::new().reserved_words().collect();
        assert!(reserved.contains("USER"));
        assert!(reserved.contains("COUNT"));
        assert!(!reserved.contains("NAME"));
    }
}
