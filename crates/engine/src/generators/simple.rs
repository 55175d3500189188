// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Schemas, datatypes, databases, keywords and table aliases

use sqlcomplete_catalog::{ObjectKind, unescape};

use super::{GeneratorContext, Generated, SchemaObject, hide_pg_objects, object_candidate};
use crate::candidate::{Candidate, Category};
use crate::config::KeywordCasing;

/// Schema names; `pg_` schemas stay hidden unless the word starts with `pg_`
pub(super) fn schema_matches(quoted: bool, ctx: &GeneratorContext<'_>) -> Generated {
    let hide_pg = hide_pg_objects(None, ctx);
    let candidates = ctx
        .store
        .schema_names()
        .into_iter()
        .filter(|name| !(hide_pg && name.starts_with("pg_")))
        .map(|name| {
            if quoted {
                Candidate::new(format!("'{}'", unescape(&name)))
            } else {
                Candidate::new(name)
            }
        })
        .collect();
    Generated::fuzzy(Category::Schema, candidates)
}

/// User-defined datatypes, plus built-in type names when no schema is typed
pub(super) fn datatype_matches(schema: Option<&str>, ctx: &GeneratorContext<'_>) -> Vec<Generated> {
    let store = ctx.store;
    let candidates = store
        .schemas_for(ObjectKind::Datatypes, schema)
        .into_iter()
        .flat_map(|key| {
            let qualifier = store.qualifier_for(&key, schema);
            store
                .datatype_names(&key)
                .into_iter()
                .map(move |name| SchemaObject {
                    name,
                    schema: qualifier.clone(),
                    function: None,
                })
        })
        .map(|object| object_candidate(&object, None, None, store))
        .collect();

    let mut generated = vec![Generated::fuzzy(Category::Datatype, candidates)];
    if schema.is_none() {
        let builtins = ctx
            .keywords
            .builtin_datatypes()
            .iter()
            .map(|name| Candidate::new(*name))
            .collect();
        generated.push(Generated::strict(Category::Datatype, builtins));
    }
    generated
}

pub(super) fn database_matches(ctx: &GeneratorContext<'_>) -> Generated {
    let candidates = ctx.store.databases().iter().map(Candidate::new).collect();
    Generated::fuzzy(Category::Database, candidates)
}

/// Keywords, narrowed to the known followers of `last_token` when there are
/// any
///
/// Without narrowing, keywords reported by the server join the built-in
/// list.
pub(super) fn keyword_matches(last_token: Option<&str>, ctx: &GeneratorContext<'_>) -> Generated {
    let mut keywords: Vec<String> = match last_token.and_then(|t| ctx.keywords.followers(t)) {
        Some(followers) => followers.iter().map(|k| k.to_string()).collect(),
        None => {
            let mut all: Vec<String> = ctx.keywords.all().map(str::to_string).collect();
            for keyword in ctx.store.keywords() {
                if !all.contains(keyword) {
                    all.push(keyword.clone());
                }
            }
            all
        }
    };

    let lower = match ctx.config.keyword_casing {
        KeywordCasing::Upper => false,
        KeywordCasing::Lower => true,
        KeywordCasing::Auto => ctx
            .word_before_cursor
            .chars()
            .last()
            .is_some_and(char::is_lowercase),
    };
    if lower {
        for keyword in &mut keywords {
            *keyword = keyword.to_lowercase();
        }
    }

    let candidates = keywords.into_iter().map(Candidate::new).collect();
    Generated::strict(Category::Keyword, candidates)
}

pub(super) fn alias_matches(aliases: &[String]) -> Generated {
    let candidates = aliases.iter().map(Candidate::new).collect();
    Generated::fuzzy(Category::TableAlias, candidates)
}
