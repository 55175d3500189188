// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Function candidates

use sqlcomplete_catalog::{ArgListStyle, FunctionMetadata, ObjectKind};
use sqlcomplete_context::{FunctionUsage, TableReference};

use super::{GeneratorContext, Generated, SchemaObject, object_candidate, unique_alias};
use crate::candidate::{Candidate, Category};

/// Catalog functions, plus built-in names when nothing narrows the context
///
/// In a FROM clause aggregates and window functions are left out; extension
/// functions are never offered. Overloads that render identically collapse
/// into one candidate.
pub(super) fn function_matches(
    schema: Option<&str>,
    table_refs: &[TableReference],
    usage: Option<FunctionUsage>,
    alias: bool,
    ctx: &GeneratorContext<'_>,
) -> Vec<Generated> {
    let store = ctx.store;
    let keep = |func: &FunctionMetadata| match usage {
        Some(FunctionUsage::From) => !func.is_aggregate && !func.is_window && !func.is_extension,
        _ => !func.is_extension,
    };
    let alias = alias && usage == Some(FunctionUsage::From);
    let arg_style = match usage {
        Some(FunctionUsage::Signature) => Some(ArgListStyle::Signature),
        Some(FunctionUsage::Special) => None,
        Some(FunctionUsage::From) | None => Some(ArgListStyle::Call),
    };

    let mut candidates: Vec<Candidate> = Vec::new();
    for key in store.schemas_for(ObjectKind::Functions, schema) {
        let qualifier = store.qualifier_for(&key, schema);
        for name in store.function_names(&key) {
            for func in store.functions_named(&key, &name) {
                if !keep(func.as_ref()) {
                    continue;
                }
                let object = SchemaObject {
                    name: name.clone(),
                    schema: qualifier.clone(),
                    function: Some(func.as_ref()),
                };
                let alias = alias.then(|| unique_alias(&name, table_refs, ctx.config.generate_aliases));
                let candidate = object_candidate(&object, alias.as_deref(), arg_style, store);
                let duplicate = candidates
                    .iter()
                    .any(|c| c.completion == candidate.completion && c.display == candidate.display);
                if !duplicate {
                    candidates.push(candidate);
                }
            }
        }
    }

    let mut generated = vec![Generated::fuzzy(Category::Function, candidates)];
    if schema.is_none() && usage.is_none() {
        let builtins = ctx
            .keywords
            .builtin_functions()
            .iter()
            .map(|name| Candidate::new(*name))
            .collect();
        generated.push(Generated::strict(Category::Function, builtins));
    }
    generated
}
