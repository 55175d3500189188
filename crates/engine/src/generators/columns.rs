// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Column candidates and `*` expansion

use std::collections::HashSet;

use sqlcomplete_catalog::{ColumnMetadata, MetadataStore, NameNormalizer, RelationKind};
use sqlcomplete_context::{ColumnContext, TableReference, WordBoundary, last_word};

use super::{GeneratorContext, Generated};
use crate::candidate::{Candidate, Category};
use crate::catalog_integration::reference_schemas;
use crate::config::{AsteriskColumnOrder, QualifyColumns};

/// A referenced relation resolved against the store
#[derive(Debug, Clone)]
pub(super) struct ScopedTable {
    /// Normalized schema
    pub schema: String,
    /// Normalized relation or function name
    pub name: String,
    /// How the query refers to it: the alias, else the quoted-if-needed name
    pub reference: String,
    pub columns: Vec<ColumnMetadata>,
}

/// The text a query uses to refer to `table`
pub(super) fn reference_text(table: &TableReference, names: &NameNormalizer) -> String {
    match &table.alias {
        Some(alias) => names.escape(alias),
        None => names.escape(&table.name),
    }
}

/// Resolve references to their columns, in reference order
///
/// Unqualified references resolve in the first search path schema that has
/// them. Function references yield the output columns of every overload.
/// References that resolve to nothing are left out.
pub(super) fn scoped_columns(table_refs: &[TableReference], store: &MetadataStore) -> Vec<ScopedTable> {
    let names = store.names();
    let mut scoped: Vec<ScopedTable> = Vec::new();

    for table in table_refs {
        let name = names.normalize(&table.name);
        let reference = reference_text(table, names);

        for schema in reference_schemas(table, store) {
            let columns: Vec<ColumnMetadata> = if table.is_function {
                store
                    .functions_named(&schema, &name)
                    .iter()
                    .flat_map(|func| func.fields())
                    .collect()
            } else {
                RelationKind::ALL
                    .iter()
                    .filter_map(|kind| store.columns_of(*kind, &schema, &name))
                    .find(|columns| !columns.is_empty())
                    .map(|columns| columns.values().cloned().collect())
                    .unwrap_or_default()
            };
            if columns.is_empty() {
                continue;
            }

            match scoped
                .iter_mut()
                .find(|t| t.schema == schema && t.name == name && t.reference == reference)
            {
                Some(existing) => existing.columns.extend(columns),
                None => scoped.push(ScopedTable {
                    schema,
                    name: name.clone(),
                    reference: reference.clone(),
                    columns,
                }),
            }
            break;
        }
    }
    scoped
}

pub(super) fn column_matches(
    table_refs: &[TableReference],
    require_last_table: bool,
    context: Option<ColumnContext>,
    qualifiable: bool,
    tables_in_scope: usize,
    ctx: &GeneratorContext<'_>,
) -> Generated {
    let mut scoped = scoped_columns(table_refs, ctx.store);

    let qualify = qualifiable
        && match ctx.config.qualify_columns {
            QualifyColumns::Always => true,
            QualifyColumns::Never => false,
            QualifyColumns::IfMoreThanOneTable => table_refs.len() > 1,
        };
    let column_text = |name: &str, reference: &str| {
        if qualify {
            format!("{reference}.{name}")
        } else {
            name.to_string()
        }
    };

    if require_last_table {
        // `a JOIN b USING (`: columns of the last table that another table shares
        let last_ref = table_refs
            .last()
            .map(|t| reference_text(t, ctx.store.names()))
            .unwrap_or_default();
        let shared: HashSet<String> = scoped
            .iter()
            .filter(|t| t.reference != last_ref)
            .flat_map(|t| t.columns.iter().map(|c| c.name.clone()))
            .collect();
        scoped.retain(|t| t.reference == last_ref);
        for table in &mut scoped {
            table.columns.retain(|c| shared.contains(&c.name));
        }
    }

    let word = ctx.word_before_cursor;
    let last = last_word(word, WordBoundary::MostPunctuations);
    if last == "*" {
        if context == Some(ColumnContext::Insert) {
            for table in &mut scoped {
                table
                    .columns
                    .retain(|c| !has_skipped_default(c, ctx.skip_patterns));
            }
        }
        if ctx.config.asterisk_column_order == AsteriskColumnOrder::Alphabetic {
            for table in &mut scoped {
                table.columns.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }

        // `x.*` is replaced whole; its columns carry the qualifier only
        // when other tables are in scope
        let qualified_star = last_word(word, WordBoundary::ManyPunctuations);
        let (qualify, replace) = if qualified_star.len() > 1 && qualified_star.ends_with(".*") {
            (tables_in_scope > 1, qualified_star.chars().count())
        } else {
            (qualify, 1)
        };
        let text = scoped
            .iter()
            .flat_map(|t| {
                t.columns.iter().map(|c| {
                    if qualify {
                        format!("{}.{}", t.reference, c.name)
                    } else {
                        c.name.clone()
                    }
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        return Generated::Expansion { text, replace };
    }

    let candidates = scoped
        .iter()
        .flat_map(|t| {
            t.columns.iter().map(|c| {
                Candidate::new(column_text(&c.name, &t.reference)).with_alias_synonym(&c.name)
            })
        })
        .collect();
    Generated::fuzzy(Category::Column, candidates)
}

/// Whether a column's default matches one of the skip patterns at its start
fn has_skipped_default(column: &ColumnMetadata, patterns: &[regex::Regex]) -> bool {
    let Some(default) = column.default_expression.as_deref() else {
        return false;
    };
    column.has_default
        && patterns
            .iter()
            .any(|p| p.find(default).is_some_and(|m| m.start() == 0))
}
