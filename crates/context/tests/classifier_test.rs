// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Classification of realistic editing sessions

use sqlcomplete_context::{
    Classifier, LexicalClassifier, Suggestion, SuggestionKind, TableReference,
};

/// Split `sql` at the `|` cursor marker and classify it
fn classify_at_marker(sql: &str) -> Vec<Suggestion> {
    let cursor = sql.find('|').expect("cursor marker");
    let full = sql.replacen('|', "", 1);
    LexicalClassifier::new().classify(&full, &full[..cursor])
}

fn kinds(suggestions: &[Suggestion]) -> Vec<SuggestionKind> {
    suggestions.iter().map(Suggestion::kind).collect()
}

#[test]
fn test_columns_see_tables_after_the_cursor() {
    let suggestions = classify_at_marker("SELECT | FROM users u JOIN orders o ON o.user_id = u.id");
    assert_eq!(
        suggestions[0],
        Suggestion::column(vec![
            TableReference::new("users").with_alias("u"),
            TableReference::new("orders").with_alias("o"),
        ])
    );
}

#[test]
fn test_cursor_in_middle_statement() {
    let suggestions =
        classify_at_marker("SELECT 1 FROM a; SELECT * FROM users WHERE |; SELECT 2 FROM b");
    assert_eq!(
        suggestions[0],
        Suggestion::column(vec![TableReference::new("users")])
    );
}

#[test]
fn test_quoted_schema_qualifier() {
    let suggestions = classify_at_marker("SELECT * FROM \"Audit\".|");
    assert_eq!(
        suggestions,
        vec![Suggestion::from_clause_item(Some("Audit"), vec![])]
    );
}

#[test]
fn test_mixed_case_alias_qualifier() {
    let suggestions = classify_at_marker("SELECT U.| FROM users u");
    match &suggestions[0] {
        Suggestion::Column { table_refs, .. } => {
            assert_eq!(table_refs, &vec![TableReference::new("users").with_alias("u")]);
        }
        other => panic!("expected column suggestion, got {other:?}"),
    }
}

#[test]
fn test_truncate_offers_tables_only() {
    assert_eq!(
        kinds(&classify_at_marker("TRUNCATE |")),
        vec![SuggestionKind::Schema, SuggestionKind::Table]
    );
}

#[test]
fn test_insert_into_offers_tables_and_views() {
    assert_eq!(
        kinds(&classify_at_marker("INSERT INTO |")),
        vec![SuggestionKind::Schema, SuggestionKind::Table, SuggestionKind::View]
    );
}

#[test]
fn test_order_by_offers_columns() {
    assert_eq!(
        kinds(&classify_at_marker("SELECT * FROM users ORDER BY |")),
        vec![SuggestionKind::Column]
    );
}

#[test]
fn test_comments_are_ignored() {
    let suggestions = classify_at_marker("SELECT * -- pick columns\nFROM |");
    assert_eq!(
        kinds(&suggestions),
        vec![SuggestionKind::Schema, SuggestionKind::FromClauseItem]
    );
}
