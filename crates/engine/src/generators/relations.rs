// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Tables, views and FROM clause items

use sqlcomplete_catalog::{ObjectKind, RelationKind};
use sqlcomplete_context::{FunctionUsage, TableReference};

use super::functions::function_matches;
use super::{GeneratorContext, Generated, SchemaObject, hide_pg_objects, object_candidate, unique_alias};
use crate::candidate::Category;

pub(super) fn table_matches(
    schema: Option<&str>,
    table_refs: &[TableReference],
    alias: bool,
    ctx: &GeneratorContext<'_>,
) -> Generated {
    relation_matches(RelationKind::Tables, schema, table_refs, alias, ctx)
}

pub(super) fn view_matches(
    schema: Option<&str>,
    table_refs: &[TableReference],
    alias: bool,
    ctx: &GeneratorContext<'_>,
) -> Generated {
    relation_matches(RelationKind::Views, schema, table_refs, alias, ctx)
}

/// Tables, views and set-returning functions, aliased when configured
pub(super) fn from_clause_item_matches(
    schema: Option<&str>,
    table_refs: &[TableReference],
    ctx: &GeneratorContext<'_>,
) -> Vec<Generated> {
    let alias = ctx.config.generate_aliases;
    let mut generated = vec![
        table_matches(schema, table_refs, alias, ctx),
        view_matches(schema, table_refs, alias, ctx),
    ];
    generated.extend(function_matches(
        schema,
        table_refs,
        Some(FunctionUsage::From),
        alias,
        ctx,
    ));
    generated
}

fn relation_matches(
    kind: RelationKind,
    schema: Option<&str>,
    table_refs: &[TableReference],
    alias: bool,
    ctx: &GeneratorContext<'_>,
) -> Generated {
    let store = ctx.store;
    let hide_pg = hide_pg_objects(schema, ctx);

    let candidates = store
        .schemas_for(ObjectKind::from(kind), schema)
        .into_iter()
        .flat_map(|key| {
            let qualifier = store.qualifier_for(&key, schema);
            store
                .relation_names(kind, &key)
                .into_iter()
                .map(move |name| SchemaObject {
                    name,
                    schema: qualifier.clone(),
                    function: None,
                })
        })
        .filter(|object| !(hide_pg && object.name.starts_with("pg_")))
        .map(|object| {
            let alias = alias.then(|| unique_alias(&object.name, table_refs, ctx.config.generate_aliases));
            object_candidate(&object, alias.as_deref(), None, store)
        })
        .collect();

    let category = match kind {
        RelationKind::Tables => Category::Table,
        RelationKind::Views => Category::View,
    };
    Generated::fuzzy(category, candidates)
}
