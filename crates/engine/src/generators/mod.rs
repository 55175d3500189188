// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Candidate generators
//!
//! One generator per suggestion kind. Generators read the metadata store
//! (already populated by the loader) and return batches of candidates; the
//! matcher decides which of them fit the typed word.
//!
//! ## Generator Types
//!
//! - **relations**: tables, views and FROM clause items
//! - **columns**: columns of the tables in scope, including `*` expansion
//! - **functions**: catalog functions with argument lists, plus built-ins
//! - **joins**: whole `JOIN ... ON ...` clauses and `ON` conditions
//! - **simple**: schemas, datatypes, databases, keywords and aliases

mod columns;
mod functions;
mod joins;
mod relations;
mod simple;

use regex::Regex;
use sqlcomplete_catalog::{
    ArgListStyle, FunctionMetadata, MetadataStore, generate_alias, normalize_ref, unescape,
};
use sqlcomplete_context::{KeywordProvider, Suggestion, TableReference};

use crate::candidate::{Candidate, Category, MatchMode};
use crate::config::CompletionConfig;

/// Output of a generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// Candidates to match against the typed word
    Candidates {
        mode: MatchMode,
        category: Category,
        candidates: Vec<Candidate>,
    },
    /// `*` expanded to an explicit column list; bypasses matching
    Expansion {
        text: String,
        /// Characters before the cursor the list replaces
        replace: usize,
    },
}

impl Generated {
    pub fn fuzzy(category: Category, candidates: Vec<Candidate>) -> Self {
        Generated::Candidates {
            mode: MatchMode::Fuzzy,
            category,
            candidates,
        }
    }

    pub fn strict(category: Category, candidates: Vec<Candidate>) -> Self {
        Generated::Candidates {
            mode: MatchMode::Strict,
            category,
            candidates,
        }
    }
}

/// Everything a generator may read
pub struct GeneratorContext<'a> {
    pub store: &'a MetadataStore,
    pub config: &'a CompletionConfig,
    /// Compiled `insert_col_skip_patterns`
    pub skip_patterns: &'a [Regex],
    pub keywords: KeywordProvider,
    /// The whitespace-delimited word before the cursor
    pub word_before_cursor: &'a str,
}

/// Produce candidates for one suggestion
pub fn generate(suggestion: &Suggestion, ctx: &GeneratorContext<'_>) -> Vec<Generated> {
    match suggestion {
        Suggestion::Table { schema, table_refs } => {
            vec![relations::table_matches(schema.as_deref(), table_refs, false, ctx)]
        }
        Suggestion::View { schema, table_refs } => {
            vec![relations::view_matches(schema.as_deref(), table_refs, false, ctx)]
        }
        Suggestion::FromClauseItem { schema, table_refs } => {
            relations::from_clause_item_matches(schema.as_deref(), table_refs, ctx)
        }
        Suggestion::Column {
            table_refs,
            require_last_table,
            context,
            qualifiable,
            tables_in_scope,
        } => vec![columns::column_matches(
            table_refs,
            *require_last_table,
            *context,
            *qualifiable,
            *tables_in_scope,
            ctx,
        )],
        Suggestion::Function {
            schema,
            table_refs,
            usage,
        } => functions::function_matches(schema.as_deref(), table_refs, *usage, false, ctx),
        Suggestion::Schema { quoted } => vec![simple::schema_matches(*quoted, ctx)],
        Suggestion::Datatype { schema } => simple::datatype_matches(schema.as_deref(), ctx),
        Suggestion::Database => vec![simple::database_matches(ctx)],
        Suggestion::Keyword { last_token } => vec![simple::keyword_matches(last_token.as_deref(), ctx)],
        Suggestion::Alias { aliases } => vec![simple::alias_matches(aliases)],
        Suggestion::Join { table_refs, schema } => {
            vec![joins::join_matches(table_refs, schema.as_deref(), ctx)]
        }
        Suggestion::JoinCondition { table_refs, parent } => {
            vec![joins::join_condition_matches(table_refs, parent.as_ref(), ctx)]
        }
    }
}

/// A table, view, function overload or datatype found in the store
struct SchemaObject<'a> {
    /// Normalized name
    name: String,
    /// Schema prefix to insert, if the object needs one
    schema: Option<String>,
    function: Option<&'a FunctionMetadata>,
}

/// Build the candidate for a schema object
///
/// The object's bare name and its generated alias are the synonyms, so
/// `oi` finds `public.order_items`. Unqualified objects win ties over
/// qualified ones.
fn object_candidate(
    object: &SchemaObject<'_>,
    alias: Option<&str>,
    arg_style: Option<ArgListStyle>,
    store: &MetadataStore,
) -> Candidate {
    let prefix = object
        .schema
        .as_ref()
        .map(|schema| format!("{schema}."))
        .unwrap_or_default();
    let (suffix, display_suffix) = match (arg_style, object.function) {
        (Some(ArgListStyle::Call), Some(func)) => (
            store.arg_list(ArgListStyle::Call, func),
            store.arg_list(ArgListStyle::CallDisplay, func),
        ),
        (Some(style), Some(func)) => {
            let rendered = store.arg_list(style, func);
            (rendered.clone(), rendered)
        }
        _ => (String::new(), String::new()),
    };
    let alias = alias.map(|a| format!(" {a}")).unwrap_or_default();
    let name = &object.name;

    Candidate::new(format!("{prefix}{name}{suffix}{alias}"))
        .with_display(format!("{prefix}{name}{display_suffix}{alias}"))
        .with_alias_synonym(name)
        .with_secondary_priority(if object.schema.is_some() { 0 } else { 1 })
}

/// Alias for `name` (a normalized relation name) that no reference in
/// `table_refs` uses yet
///
/// With `generate` the alias is derived from the name (`order_items` → `oi`),
/// otherwise the name itself is the starting point. Clashes get a numeric
/// suffix: `oi2`, `oi3`, ...
pub(crate) fn unique_alias(name: &str, table_refs: &[TableReference], generate: bool) -> String {
    let taken: Vec<String> = table_refs.iter().map(TableReference::ref_key).collect();
    let base = if generate {
        generate_alias(&unescape(name))
    } else {
        name.to_string()
    };
    if !taken.contains(&normalize_ref(&base)) {
        return base;
    }

    let mut n = 2;
    loop {
        let candidate = match base.strip_prefix('"').and_then(|b| b.strip_suffix('"')) {
            Some(inner) => format!("\"{inner}{n}\""),
            None => format!("{base}{n}"),
        };
        if !taken.contains(&normalize_ref(&candidate)) {
            return candidate;
        }
        n += 1;
    }
}

/// Whether `pg_`-prefixed objects should be hidden
fn hide_pg_objects(schema: Option<&str>, ctx: &GeneratorContext<'_>) -> bool {
    schema.is_none() && !ctx.word_before_cursor.starts_with("pg_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_alias() {
        let refs = vec![
            TableReference::new("orders").with_alias("o"),
            TableReference::new("users"),
        ];
        assert_eq!(unique_alias("order_items", &refs, true), "oi");
        assert_eq!(unique_alias("orders", &refs, true), "o2");
        assert_eq!(unique_alias("users", &refs, false), "users2");
        assert_eq!(unique_alias("products", &refs, false), "products");
    }

    #[test]
    fn test_unique_alias_quoted() {
        let refs = vec![TableReference::new("Events")];
        assert_eq!(unique_alias("\"Events\"", &refs, false), "\"Events2\"");
        assert_eq!(unique_alias("\"Events\"", &refs, true), "E");
    }
}
