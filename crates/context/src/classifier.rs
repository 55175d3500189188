// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Classifier
//!
//! Decides which kinds of object may appear at the cursor. The engine only
//! depends on the [`Classifier`] trait; [`LexicalClassifier`] is the built-in
//! implementation, driven by the last significant token before the word
//! being typed.
//!
//! ## Decision table
//!
//! | last token                        | suggestions                                   |
//! |-----------------------------------|-----------------------------------------------|
//! | nothing                           | keyword                                       |
//! | `SELECT` `WHERE` `HAVING`         | column, function, keyword                     |
//! | `SET` `BY` `DISTINCT` `COLUMN`    | column                                        |
//! | `FROM` / `JOIN`                   | schema, from-clause item, join                |
//! | `INTO` `UPDATE` `COPY` `DESCRIBE` | schema, table, view                           |
//! | `TRUNCATE`                        | schema, table                                 |
//! | `TABLE` `VIEW` `FUNCTION`         | schema, that object kind                      |
//! | `ON`                              | alias, join condition                         |
//! | `::` `TYPE`                       | datatype, table, schema                       |
//! | `\c` `USE` `DATABASE` `TEMPLATE`  | database                                      |
//! | `SCHEMA`                          | schema                                        |
//! | `,` `=` `AND` `OR` operators      | same as the previous keyword                  |
//! | `(`                               | depends on what precedes it                   |
//! | any other keyword                 | keyword, narrowed to its followers            |
//!
//! A qualifier typed before the word (`u.na`, `public.us`) narrows columns to
//! the tables it identifies and objects to the schema it names.

use tracing::trace;

use crate::lexer::{Token, TokenKind, significant_tokens};
use crate::parse_utils::{
    PartialIdentifier, WordBoundary, extract_tables, find_prev_keyword, last_word,
    parse_partial_identifier, statement_bounds,
};
use crate::suggestion::{ColumnContext, FunctionUsage, Suggestion, TableReference};

/// Maps SQL text at the cursor to the suggestion kinds that apply there
pub trait Classifier: Send + Sync {
    /// Ordered suggestion requests for the cursor at the end of
    /// `text_before_cursor`, a prefix of `full_sql`
    fn classify(&self, full_sql: &str, text_before_cursor: &str) -> Vec<Suggestion>;
}

/// Token-driven classifier for PostgreSQL
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalClassifier;

impl LexicalClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for LexicalClassifier {
    fn classify(&self, full_sql: &str, text_before_cursor: &str) -> Vec<Suggestion> {
        let word = last_word(text_before_cursor, WordBoundary::ManyPunctuations);

        let (prefix, identifier) = if word.is_empty() || word.starts_with('\\') {
            (text_before_cursor, None)
        } else {
            (
                &text_before_cursor[..text_before_cursor.len() - word.len()],
                Some(parse_partial_identifier(word)),
            )
        };

        let (start, end) = statement_bounds(full_sql, prefix.len());
        let before = prefix.get(start..).unwrap_or_default();
        let full = full_sql.get(start..end.max(start)).unwrap_or(before);

        let statement = Statement {
            tokens: significant_tokens(before),
            text_before: before,
            full_text: full,
            identifier,
        };

        let suggestions = match statement.tokens.len() {
            0 => vec![Suggestion::keyword(None)],
            n => statement.suggest_for(n - 1),
        };
        trace!(
            word,
            kinds = ?suggestions.iter().map(Suggestion::kind).collect::<Vec<_>>(),
            "classified cursor context"
        );
        suggestions
    }
}

/// The statement around the cursor, with the typed word split off
struct Statement<'a> {
    /// Significant tokens before the word being typed
    tokens: Vec<Token<'a>>,
    text_before: &'a str,
    full_text: &'a str,
    identifier: Option<PartialIdentifier>,
}

impl Statement<'_> {
    fn parent(&self) -> Option<&str> {
        self.identifier.as_ref().and_then(|i| i.parent.as_deref())
    }

    /// Tables of the whole statement, including text after the cursor
    fn tables(&self) -> Vec<TableReference> {
        extract_tables(self.full_text)
    }

    /// Tables referenced before the cursor
    fn tables_before(&self) -> Vec<TableReference> {
        extract_tables(self.text_before)
    }

    fn first_keyword_is(&self, word: &str) -> bool {
        self.tokens.first().is_some_and(|t| t.is_keyword(word))
    }

    /// Suggestions when `tokens[at]` is the last token that matters
    fn suggest_for(&self, at: usize) -> Vec<Suggestion> {
        let token = self.tokens[at];

        match token.kind {
            TokenKind::Keyword => self.after_keyword(at, &token.text.to_lowercase()),
            TokenKind::Punctuation | TokenKind::Operator => self.after_symbol(at, token.text),
            TokenKind::MetaCommand if matches!(token.text, "\\c" | "\\connect") => {
                vec![Suggestion::Database]
            }
            TokenKind::MetaCommand => Vec::new(),
            _ => self.after_operand(at),
        }
    }

    /// An identifier or literal ends the text: an alias, the next keyword,
    /// or more of the WHERE expression may follow
    fn after_operand(&self, at: usize) -> Vec<Suggestion> {
        let Some(prev) = find_prev_keyword(&self.tokens[..at]) else {
            return vec![Suggestion::keyword(None)];
        };
        let prev_token = self.tokens[prev];

        if prev_token.is_keyword("WHERE") || prev_token.is_keyword("HAVING") {
            self.suggest_for(prev)
        } else if prev_token.is_punct("(") && self.first_keyword_is("CREATE") {
            self.datatype_suggestions()
        } else {
            vec![Suggestion::keyword(None)]
        }
    }

    fn after_symbol(&self, at: usize, symbol: &str) -> Vec<Suggestion> {
        match symbol {
            "(" => self.after_open_paren(at),
            "::" => self.datatype_suggestions(),
            "," | "=" | "<" | ">" | "<=" | ">=" | "<>" | "!=" | "+" | "-" | "*" | "/" => {
                self.recurse_to_prev_keyword(at)
            }
            _ => vec![Suggestion::keyword(None)],
        }
    }

    fn recurse_to_prev_keyword(&self, at: usize) -> Vec<Suggestion> {
        match find_prev_keyword(&self.tokens[..at]) {
            Some(prev) => self.suggest_for(prev),
            None => Vec::new(),
        }
    }

    fn after_keyword(&self, at: usize, keyword: &str) -> Vec<Suggestion> {
        match keyword {
            "and" | "or" => self.recurse_to_prev_keyword(at),
            "select" | "where" | "having" => self.expression(keyword),
            "set" | "by" | "distinct" | "column" => {
                let tables = self.tables();
                vec![Suggestion::Column {
                    tables_in_scope: tables.len(),
                    table_refs: tables,
                    require_last_table: false,
                    context: None,
                    qualifiable: false,
                }]
            }
            "as" => Vec::new(),
            "join" | "from" | "copy" | "update" | "into" | "describe" | "truncate" => {
                self.relation_source(at, keyword)
            }
            "table" | "view" | "function" => {
                let schema = self.parent();
                let object = match keyword {
                    "table" => Suggestion::table(schema),
                    "view" => Suggestion::view(schema),
                    _ => Suggestion::function(schema, Some(FunctionUsage::Signature)),
                };
                if schema.is_some() {
                    vec![object]
                } else {
                    vec![Suggestion::schema(), object]
                }
            }
            "on" => self.join_clause(),
            "use" | "database" | "template" => vec![Suggestion::Database],
            "schema" => vec![Suggestion::schema()],
            "type" => self.datatype_suggestions(),
            _ => vec![Suggestion::keyword(Some(keyword))],
        }
    }

    /// Columns, functions and keywords, or objects under a typed qualifier
    fn expression(&self, keyword: &str) -> Vec<Suggestion> {
        match self.parent() {
            Some(parent) => {
                let tables = self.tables();
                let tables_in_scope = tables.len();
                let identified = tables
                    .into_iter()
                    .filter(|t| t.is_identified_by(parent))
                    .collect();
                vec![
                    Suggestion::Column {
                        table_refs: identified,
                        require_last_table: false,
                        context: None,
                        qualifiable: false,
                        tables_in_scope,
                    },
                    Suggestion::table(Some(parent)),
                    Suggestion::view(Some(parent)),
                    Suggestion::function(Some(parent), None),
                ]
            }
            None => vec![
                Suggestion::column(self.tables()),
                Suggestion::function(None, None),
                Suggestion::keyword(Some(keyword)),
            ],
        }
    }

    /// After FROM, JOIN and the other keywords that introduce a relation
    fn relation_source(&self, at: usize, keyword: &str) -> Vec<Suggestion> {
        let schema = self.parent();
        let is_join = keyword == "join";
        let mut suggestions = Vec::new();

        if schema.is_none() {
            suggestions.push(Suggestion::schema());
        }

        if keyword == "from" || is_join {
            suggestions.push(Suggestion::from_clause_item(schema, self.tables_before()));
        } else if keyword == "truncate" {
            suggestions.push(Suggestion::table(schema));
        } else {
            suggestions.push(Suggestion::table(schema));
            suggestions.push(Suggestion::view(schema));
        }

        if is_join && self.allows_join(at) {
            let tables = self.tables_before();
            if !tables.is_empty() {
                suggestions.push(Suggestion::join(tables, schema));
            }
        }

        suggestions
    }

    /// Whole join clauses make no sense after CROSS or NATURAL JOIN
    fn allows_join(&self, at: usize) -> bool {
        at.checked_sub(1)
            .and_then(|prev| self.tokens.get(prev))
            .is_none_or(|t| !t.is_keyword("CROSS") && !t.is_keyword("NATURAL"))
    }

    fn join_clause(&self) -> Vec<Suggestion> {
        let tables = self.tables_before();

        match self.parent() {
            Some(parent) => {
                let identified: Vec<TableReference> = tables
                    .iter()
                    .filter(|t| t.is_identified_by(parent))
                    .cloned()
                    .collect();
                let last = identified.last().cloned();
                let mut suggestions = vec![
                    Suggestion::Column {
                        table_refs: identified,
                        require_last_table: false,
                        context: None,
                        qualifiable: false,
                        tables_in_scope: tables.len(),
                    },
                    Suggestion::table(Some(parent)),
                    Suggestion::view(Some(parent)),
                    Suggestion::function(Some(parent), None),
                ];
                if last.is_some() {
                    suggestions.push(Suggestion::join_condition(tables, last));
                }
                suggestions
            }
            None => {
                let aliases = tables.iter().map(TableReference::ref_name).collect();
                vec![
                    Suggestion::Alias { aliases },
                    Suggestion::join_condition(tables, None),
                ]
            }
        }
    }

    fn after_open_paren(&self, at: usize) -> Vec<Suggestion> {
        let before = at.checked_sub(1).map(|i| self.tokens[i]);

        if let Some(prev) = find_prev_keyword(&self.tokens[..at])
            && (self.tokens[prev].is_keyword("WHERE") || self.tokens[prev].is_keyword("HAVING"))
        {
            // WHERE EXISTS ( opens a subquery
            if before.is_some_and(|t| t.is_keyword("EXISTS")) {
                return vec![Suggestion::keyword(None)];
            }
            return self.suggest_for(prev);
        }

        if let Some(prev) = before {
            if prev.is_keyword("USING") {
                let tables = self.tables_before();
                return vec![Suggestion::Column {
                    tables_in_scope: tables.len(),
                    table_refs: tables,
                    require_last_table: true,
                    context: None,
                    qualifiable: false,
                }];
            }
            if prev.is_keyword("EXISTS") {
                return vec![Suggestion::keyword(None)];
            }
            let into_before = at
                .checked_sub(2)
                .is_some_and(|i| self.tokens[..=i].iter().rev().take(3).any(|t| t.is_keyword("INTO")));
            if prev.is_identifier() && into_before {
                return vec![Suggestion::Column {
                    table_refs: self.tables_before().into_iter().take(1).collect(),
                    require_last_table: false,
                    context: Some(ColumnContext::Insert),
                    qualifiable: false,
                    tables_in_scope: 1,
                }];
            }
        }

        // `SELECT (` with whitespace before the parenthesis starts a subquery
        let paren = self.tokens[at];
        let spaced = self.text_before[..paren.offset]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        if self.first_keyword_is("SELECT") && spaced {
            return vec![Suggestion::keyword(None)];
        }

        self.expression("(")
    }

    fn datatype_suggestions(&self) -> Vec<Suggestion> {
        let schema = self.parent();
        let mut suggestions = vec![Suggestion::datatype(schema), Suggestion::table(schema)];
        if schema.is_none() {
            suggestions.push(Suggestion::schema());
        }
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::SuggestionKind;

    fn classify(text: &str) -> Vec<Suggestion> {
        LexicalClassifier::new().classify(text, text)
    }

    fn kinds(text: &str) -> Vec<SuggestionKind> {
        classify(text).iter().map(Suggestion::kind).collect()
    }

    #[test]
    fn test_empty_input_suggests_keywords() {
        assert_eq!(classify(""), vec![Suggestion::keyword(None)]);
        assert_eq!(classify("sel"), vec![Suggestion::keyword(None)]);
    }

    #[test]
    fn test_select_list() {
        let text = "SELECT  FROM users u";
        let suggestions = LexicalClassifier::new().classify(text, "SELECT ");
        assert_eq!(
            suggestions,
            vec![
                Suggestion::column(vec![TableReference::new("users").with_alias("u")]),
                Suggestion::function(None, None),
                Suggestion::keyword(Some("select")),
            ]
        );
    }

    #[test]
    fn test_where_with_partial_word() {
        assert_eq!(
            classify("SELECT * FROM users WHERE na"),
            vec![
                Suggestion::column(vec![TableReference::new("users")]),
                Suggestion::function(None, None),
                Suggestion::keyword(Some("WHERE")),
            ]
        );
    }

    #[test]
    fn test_where_after_condition_recurses() {
        assert_eq!(
            kinds("SELECT * FROM users WHERE id = 1 AND "),
            vec![SuggestionKind::Column, SuggestionKind::Function, SuggestionKind::Keyword]
        );
        assert_eq!(
            kinds("SELECT * FROM users WHERE id = "),
            vec![SuggestionKind::Column, SuggestionKind::Function, SuggestionKind::Keyword]
        );
    }

    #[test]
    fn test_qualified_column() {
        let text = "SELECT u. FROM users u JOIN orders o ON o.user_id = u.id";
        let suggestions = LexicalClassifier::new().classify(text, "SELECT u.");
        assert_eq!(
            suggestions[0],
            Suggestion::Column {
                table_refs: vec![TableReference::new("users").with_alias("u")],
                require_last_table: false,
                context: None,
                qualifiable: false,
                tables_in_scope: 2,
            }
        );
        assert_eq!(suggestions[1], Suggestion::table(Some("u")));
    }

    #[test]
    fn test_from_clause() {
        assert_eq!(
            classify("SELECT * FROM "),
            vec![Suggestion::schema(), Suggestion::from_clause_item(None, vec![])]
        );
        assert_eq!(
            classify("SELECT * FROM public.us"),
            vec![Suggestion::from_clause_item(Some("public"), vec![])]
        );
    }

    #[test]
    fn test_join_suggests_join_clauses() {
        let users = TableReference::new("users").with_alias("u");
        assert_eq!(
            classify("SELECT * FROM users u JOIN "),
            vec![
                Suggestion::schema(),
                Suggestion::from_clause_item(None, vec![users.clone()]),
                Suggestion::join(vec![users], None),
            ]
        );
        assert_eq!(
            kinds("SELECT * FROM users u NATURAL JOIN "),
            vec![SuggestionKind::Schema, SuggestionKind::FromClauseItem]
        );
    }

    #[test]
    fn test_on_suggests_aliases_and_conditions() {
        let suggestions = classify("SELECT * FROM users u JOIN orders o ON ");
        assert_eq!(
            suggestions[0],
            Suggestion::Alias {
                aliases: vec!["u".into(), "o".into()]
            }
        );
        assert_eq!(suggestions[1].kind(), SuggestionKind::JoinCondition);

        let suggestions = classify("SELECT * FROM users u JOIN orders o ON o.user_id = u.");
        assert_eq!(
            suggestions.last(),
            Some(&Suggestion::join_condition(
                vec![
                    TableReference::new("users").with_alias("u"),
                    TableReference::new("orders").with_alias("o"),
                ],
                Some(TableReference::new("users").with_alias("u")),
            ))
        );
    }

    #[test]
    fn test_using_requires_last_table() {
        let suggestions = classify("SELECT * FROM users JOIN orders USING (");
        assert!(matches!(
            &suggestions[..],
            [Suggestion::Column { require_last_table: true, table_refs, .. }] if table_refs.len() == 2
        ));
    }

    #[test]
    fn test_insert_column_list() {
        assert_eq!(
            classify("INSERT INTO users (id, "),
            vec![Suggestion::Column {
                table_refs: vec![TableReference::new("users")],
                require_last_table: false,
                context: Some(ColumnContext::Insert),
                qualifiable: false,
                tables_in_scope: 1,
            }]
        );
    }

    #[test]
    fn test_subquery_paren_and_exists() {
        assert_eq!(classify("SELECT * FROM t WHERE EXISTS ("), vec![Suggestion::keyword(None)]);
        assert_eq!(classify("SELECT ("), vec![Suggestion::keyword(None)]);
        assert_eq!(
            kinds("SELECT count("),
            vec![SuggestionKind::Column, SuggestionKind::Function, SuggestionKind::Keyword]
        );
    }

    #[test]
    fn test_datatypes() {
        assert_eq!(
            kinds("SELECT x::"),
            vec![SuggestionKind::Datatype, SuggestionKind::Table, SuggestionKind::Schema]
        );
        assert_eq!(
            kinds("CREATE TABLE t (id "),
            vec![SuggestionKind::Datatype, SuggestionKind::Table, SuggestionKind::Schema]
        );
    }

    #[test]
    fn test_databases_and_schemas() {
        assert_eq!(classify("\\c "), vec![Suggestion::Database]);
        assert_eq!(classify("USE "), vec![Suggestion::Database]);
        assert_eq!(classify("DROP SCHEMA "), vec![Suggestion::schema()]);
        assert_eq!(
            classify("DROP FUNCTION "),
            vec![
                Suggestion::schema(),
                Suggestion::function(None, Some(FunctionUsage::Signature)),
            ]
        );
    }

    #[test]
    fn test_keyword_followers_and_alias() {
        assert_eq!(classify("CREATE "), vec![Suggestion::keyword(Some("CREATE"))]);
        assert_eq!(classify("SELECT * FROM users "), vec![Suggestion::keyword(None)]);
        assert!(classify("SELECT id AS ").is_empty());
    }

    #[test]
    fn test_statement_isolation() {
        let text = "SELECT * FROM orders; SELECT * FROM users WHERE ";
        let suggestions = classify(text);
        assert_eq!(
            suggestions[0],
            Suggestion::column(vec![TableReference::new("users")])
        );
    }

    #[test]
    fn test_update_set() {
        assert_eq!(
            classify("UPDATE users SET "),
            vec![Suggestion::Column {
                table_refs: vec![TableReference::new("users")],
                require_last_table: false,
                context: None,
                qualifiable: false,
                tables_in_scope: 1,
            }]
        );
    }
}
