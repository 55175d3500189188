// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Join clauses and join conditions inferred from foreign keys and shared
//! column names

use std::collections::{HashMap, HashSet};

use sqlcomplete_catalog::{ForeignKey, NameNormalizer, generate_alias, normalize_ref};
use sqlcomplete_context::TableReference;

use super::columns::{ScopedTable, reference_text, scoped_columns};
use super::{GeneratorContext, Generated, unique_alias};
use crate::candidate::{Candidate, Category};

/// Integer column types; same-typed name matches on them are likely real keys
const KEY_TYPES: [&str; 3] = ["integer", "bigint", "smallint"];

/// A column named by normalized schema, table and column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ColumnPath {
    schema: String,
    table: String,
    column: String,
}

impl ColumnPath {
    fn new(schema: &str, table: &str, column: &str) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    fn parent_of(fk: &ForeignKey, names: &NameNormalizer) -> Self {
        Self {
            schema: names.normalize(&fk.parent_schema),
            table: names.normalize(&fk.parent_table),
            column: names.normalize(&fk.parent_column),
        }
    }

    fn child_of(fk: &ForeignKey, names: &NameNormalizer) -> Self {
        Self {
            schema: names.normalize(&fk.child_schema),
            table: names.normalize(&fk.child_table),
            column: names.normalize(&fk.child_column),
        }
    }
}

/// Whole `<table> ON <condition>` clauses for tables linked by a foreign key
/// to a table already in the query
///
/// Keys of tables introduced earlier in the FROM list rank higher, and a
/// table not yet in the query outranks one that is.
pub(super) fn join_matches(
    table_refs: &[TableReference],
    schema: Option<&str>,
    ctx: &GeneratorContext<'_>,
) -> Generated {
    let store = ctx.store;
    let names = store.names();
    let generate_aliases = ctx.config.generate_aliases;
    let scoped = scoped_columns(table_refs, store);

    let ref_key = |t: &TableReference| normalize_ref(&reference_text(t, names));
    let qualified: HashMap<String, bool> = table_refs
        .iter()
        .map(|t| (ref_key(t), t.schema.is_some()))
        .collect();
    let last = table_refs.len().saturating_sub(1);
    let ref_priority: HashMap<String, i64> = table_refs
        .iter()
        .enumerate()
        .map(|(i, t)| (ref_key(t), (last - i) as i64))
        .collect();
    let refs: HashSet<String> = table_refs.iter().map(ref_key).collect();
    let other_tables: HashSet<(&str, &str)> = scoped
        .iter()
        .take(scoped.len().saturating_sub(1))
        .map(|t| (t.schema.as_str(), t.name.as_str()))
        .collect();
    let typed_schema = schema.map(|s| names.normalize(s));

    let mut candidates = Vec::new();
    for right_table in &scoped {
        let right_ref = &right_table.reference;
        let right_key = normalize_ref(right_ref);
        for right_column in &right_table.columns {
            for fk in &right_column.foreign_keys {
                let right = ColumnPath::new(&right_table.schema, &right_table.name, &right_column.name);
                let child = ColumnPath::child_of(fk, names);
                let parent = ColumnPath::parent_of(fk, names);
                let left = if parent == right { child } else { parent };

                if typed_schema.as_ref().is_some_and(|s| *s != left.schema) {
                    continue;
                }

                let (lt, lc, rc) = (&left.table, &left.column, &right.column);
                let mut join = if generate_aliases || refs.contains(&normalize_ref(lt)) {
                    let alias = unique_alias(lt, table_refs, generate_aliases);
                    format!("{lt} {alias} ON {alias}.{lc} = {right_ref}.{rc}")
                } else {
                    format!("{lt} ON {lt}.{lc} = {right_ref}.{rc}")
                };
                let short = generate_alias(lt);
                let synonyms = [
                    join.clone(),
                    format!("{short} ON {short}.{lc} = {right_ref}.{rc}"),
                ];

                // Qualify when the query qualified the joined-to table in the
                // same schema, or when the new table lives elsewhere than
                // `public`
                let right_qualified = qualified.get(&right_key).copied().unwrap_or(false);
                if typed_schema.is_none()
                    && ((right_qualified && left.schema == right.schema)
                        || (left.schema != right.schema && left.schema != "public"))
                {
                    join = format!("{}.{join}", left.schema);
                }

                let earliness = ref_priority.get(&right_key).copied().unwrap_or(0);
                let fresh = !other_tables.contains(&(left.schema.as_str(), left.table.as_str()));
                candidates.push(
                    Candidate::new(join)
                        .with_synonyms(synonyms)
                        .with_priority(earliness * 2 + i64::from(fresh)),
                );
            }
        }
    }
    Generated::fuzzy(Category::Join, candidates)
}

/// `ON` conditions between the left table and the other tables in scope
///
/// The left table is `parent` when the user typed `ON x.`, else the most
/// recently joined table. Foreign-key conditions rank above name matches.
/// Any column whose name appears in another table is a name match; sharing
/// the datatype too ranks it higher, most of all for integer keys.
pub(super) fn join_condition_matches(
    table_refs: &[TableReference],
    parent: Option<&TableReference>,
    ctx: &GeneratorContext<'_>,
) -> Generated {
    let names = ctx.store.names();
    let scoped = scoped_columns(table_refs, ctx.store);
    let empty = || Generated::fuzzy(Category::Join, Vec::new());

    let Some(left_source) = parent.or(table_refs.last()) else {
        return empty();
    };
    let left_ref = reference_text(left_source, names);
    let Some(left) = scoped.iter().rev().find(|t| t.reference == left_ref) else {
        return empty();
    };

    let ref_priority: HashMap<String, i64> = table_refs
        .iter()
        .enumerate()
        .map(|(i, t)| (reference_text(t, names), i as i64))
        .collect();
    let prefix = if parent.is_some() {
        String::new()
    } else {
        format!("{}.", left.reference)
    };

    let mut conditions = ConditionSet::default();
    let mut add = |left_column: &str, right_column: &str, right: &ScopedTable, priority: i64, category| {
        let text = format!("{prefix}{left_column} = {}.{right_column}", right.reference);
        let position = ref_priority.get(&right.reference).copied().unwrap_or(0);
        conditions.push(text, priority + position, category);
    };

    // Foreign keys from the left table to any other table in scope
    let by_column: HashMap<ColumnPath, Vec<&ScopedTable>> = scoped
        .iter()
        .filter(|t| t.reference != left_ref)
        .flat_map(|t| {
            t.columns
                .iter()
                .map(move |c| (ColumnPath::new(&t.schema, &t.name, &c.name), t))
        })
        .fold(HashMap::new(), |mut map, (path, table)| {
            map.entry(path).or_insert_with(Vec::new).push(table);
            map
        });
    for left_column in &left.columns {
        for fk in &left_column.foreign_keys {
            let here = ColumnPath::new(&left.schema, &left.name, &left_column.name);
            let child = ColumnPath::child_of(fk, names);
            let parent = ColumnPath::parent_of(fk, names);
            let (near, far) = if here == child { (child, parent) } else { (parent, child) };
            for &right in by_column.get(&far).into_iter().flatten() {
                add(&near.column, &far.column, right, 2000, Category::FkJoin);
            }
        }
    }

    // Columns sharing a name with the left table
    for left_column in &left.columns {
        for right in scoped.iter().filter(|t| t.reference != left.reference) {
            let Some(right_column) = right.columns.iter().find(|c| c.name == left_column.name) else {
                continue;
            };
            let priority = if right_column.datatype != left_column.datatype {
                0
            } else if KEY_TYPES.contains(&left_column.datatype.as_str()) {
                1000
            } else {
                100
            };
            add(&left_column.name, &right_column.name, right, priority, Category::NameJoin);
        }
    }

    Generated::fuzzy(Category::Join, conditions.into_candidates())
}

/// Join conditions in insertion order, first occurrence wins
#[derive(Default)]
struct ConditionSet {
    seen: HashSet<String>,
    candidates: Vec<Candidate>,
}

impl ConditionSet {
    fn push(&mut self, text: String, priority: i64, category: Category) {
        if self.seen.insert(text.clone()) {
            self.candidates.push(
                Candidate::new(text)
                    .with_priority(priority)
                    .with_category(category),
            );
        }
    }

    fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}
