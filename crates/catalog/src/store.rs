// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata store
//!
//! Session-scoped cache of schema metadata. The store is created empty,
//! filled incrementally from catalog rows, and read by the completion
//! generators. Every name is normalized once on insertion and the same way on
//! lookup, so `Users`, `"Users"` and `users` never get confused.
//!
//! The four object maps share one shape: schema key → object key → payload.
//! Schemas must be registered before objects can be inserted into them; rows
//! naming an unknown schema or relation are dropped.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::args::{ArgListStyle, ArgListTemplates};
use crate::metadata::{
    ColumnMetadata, ColumnRow, DatatypeRow, ForeignKey, FunctionMetadata, RelationKind,
    RelationRow,
};
use crate::names::{NameNormalizer, unescape};

/// Column map of one relation, in catalog order
pub type ColumnMap = IndexMap<String, ColumnMetadata>;

type SchemaMap<T> = IndexMap<String, IndexMap<String, T>>;

/// Options fixed for the lifetime of a store
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Restrict unqualified lookups to the search path
    pub search_path_filter: bool,
    /// Templates used to pre-render function argument lists
    pub arg_templates: ArgListTemplates,
}

/// Object kinds that carry a schema dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Tables,
    Views,
    Functions,
    Datatypes,
}

impl From<RelationKind> for ObjectKind {
    fn from(kind: RelationKind) -> Self {
        match kind {
            RelationKind::Tables => ObjectKind::Tables,
            RelationKind::Views => ObjectKind::Views,
        }
    }
}

/// Session cache of tables, views, functions and datatypes
#[derive(Debug, Default)]
pub struct MetadataStore {
    names: NameNormalizer,
    options: StoreOptions,
    tables: SchemaMap<ColumnMap>,
    views: SchemaMap<ColumnMap>,
    functions: SchemaMap<Vec<Arc<FunctionMetadata>>>,
    datatypes: SchemaMap<()>,
    search_path: Vec<String>,
    databases: Vec<String>,
    keywords: Vec<String>,
    arg_lists: HashMap<ArgListStyle, HashMap<Arc<FunctionMetadata>, String>>,
    version: u64,
}

impl MetadataStore {
    /// Create an empty store
    ///
    /// # Arguments
    ///
    /// * `names` - Normalizer carrying the built-in reserved words
    /// * `options` - Search path filtering and argument list templates
    pub fn new(names: NameNormalizer, options: StoreOptions) -> Self {
        Self {
            names,
            options,
            ..Default::default()
        }
    }

    /// Name normalizer used for every key in this store
    pub fn names(&self) -> &NameNormalizer {
        &self.names
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Mutation counter, bumped by every call that changes the store
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    /// Register schemas in all four maps
    ///
    /// Idempotent: registering a known schema keeps its contents.
    pub fn register_schemas<I, S>(&mut self, schemas: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = false;
        for schema in schemas {
            let key = self.names.normalize(schema.as_ref());
            if self.tables.contains_key(&key) {
                continue;
            }
            self.tables.insert(key.clone(), IndexMap::new());
            self.views.entry(key.clone()).or_default();
            self.functions.entry(key.clone()).or_default();
            self.datatypes.entry(key).or_default();
            added = true;
        }
        if added {
            self.bump();
        }
    }

    /// Add relations with empty column maps, replacing existing entries
    pub fn extend_relations(&mut self, kind: RelationKind, rows: impl IntoIterator<Item = RelationRow>) {
        let names = &self.names;
        let map = match kind {
            RelationKind::Tables => &mut self.tables,
            RelationKind::Views => &mut self.views,
        };
        for row in rows {
            let schema = names.normalize(&row.schema);
            match map.get_mut(&schema) {
                Some(relations) => {
                    relations.insert(names.normalize(&row.name), ColumnMap::new());
                }
                None => trace!(%kind, %schema, relation = %row.name, "dropping relation in unknown schema"),
            }
        }
        self.bump();
    }

    /// Append columns to known relations, in row order
    pub fn extend_columns(&mut self, kind: RelationKind, rows: impl IntoIterator<Item = ColumnRow>) {
        let names = &self.names;
        let map = match kind {
            RelationKind::Tables => &mut self.tables,
            RelationKind::Views => &mut self.views,
        };
        for row in rows {
            let schema = names.normalize(&row.schema);
            let relation = names.normalize(&row.relation);
            let Some(columns) = map
                .get_mut(&schema)
                .and_then(|relations| relations.get_mut(&relation))
            else {
                trace!(%kind, %schema, %relation, "dropping column of unknown relation");
                continue;
            };

            let name = names.normalize(&row.column);
            let mut column = ColumnMetadata::new(name.clone(), row.datatype);
            column.has_default = row.has_default;
            column.default_expression = row.default;
            columns.insert(name, column);
        }
        self.bump();
    }

    /// Append function overloads and rebuild every argument list cache
    pub fn extend_functions(&mut self, rows: impl IntoIterator<Item = FunctionMetadata>) {
        for func in rows {
            let schema = self.names.normalize(&func.schema);
            let name = self.names.normalize(&func.name);
            match self.functions.get_mut(&schema) {
                Some(functions) => functions.entry(name).or_default().push(Arc::new(func)),
                None => trace!(%schema, function = %name, "dropping function in unknown schema"),
            }
        }
        self.rebuild_arg_lists();
        self.bump();
    }

    fn rebuild_arg_lists(&mut self) {
        let templates = &self.options.arg_templates;
        let mut arg_lists: HashMap<ArgListStyle, HashMap<Arc<FunctionMetadata>, String>> =
            HashMap::new();
        for style in ArgListStyle::ALL {
            let cache = arg_lists.entry(style).or_default();
            for func in self.functions.values().flat_map(|f| f.values()).flatten() {
                cache.insert(Arc::clone(func), templates.render(func, style));
            }
        }
        debug!(
            functions = arg_lists.get(&ArgListStyle::Call).map_or(0, |c| c.len()),
            "rebuilt argument list caches"
        );
        self.arg_lists = arg_lists;
    }

    /// Attach foreign keys to both endpoint columns
    ///
    /// A key whose parent or child column is not in the store is dropped.
    /// Re-adding a key that is already attached has no effect.
    pub fn extend_foreignkeys(&mut self, rows: impl IntoIterator<Item = ForeignKey>) {
        for fk in rows {
            let child = self.table_column_key(&fk.child_schema, &fk.child_table, &fk.child_column);
            let parent =
                self.table_column_key(&fk.parent_schema, &fk.parent_table, &fk.parent_column);

            let both_present = self.table_column(&child).is_some() && self.table_column(&parent).is_some();
            if !both_present {
                trace!(?fk, "dropping foreign key with missing endpoint");
                continue;
            }

            let fk = Arc::new(fk);
            self.attach_foreign_key(&child, &fk);
            if parent != child {
                self.attach_foreign_key(&parent, &fk);
            }
        }
        self.bump();
    }

    fn table_column_key(&self, schema: &str, table: &str, column: &str) -> (String, String, String) {
        (
            self.names.normalize(schema),
            self.names.normalize(table),
            self.names.normalize(column),
        )
    }

    fn table_column(&self, key: &(String, String, String)) -> Option<&ColumnMetadata> {
        self.tables.get(&key.0)?.get(&key.1)?.get(&key.2)
    }

    fn attach_foreign_key(&mut self, key: &(String, String, String), fk: &Arc<ForeignKey>) {
        let column = self
            .tables
            .get_mut(&key.0)
            .and_then(|t| t.get_mut(&key.1))
            .and_then(|c| c.get_mut(&key.2));
        if let Some(column) = column {
            if !column.foreign_keys.iter().any(|existing| existing == fk) {
                column.foreign_keys.push(Arc::clone(fk));
            }
        }
    }

    /// Add user-defined datatypes
    pub fn extend_datatypes(&mut self, rows: impl IntoIterator<Item = DatatypeRow>) {
        for row in rows {
            let schema = self.names.normalize(&row.schema);
            let name = self.names.normalize(&row.name);
            match self.datatypes.get_mut(&schema) {
                Some(types) => {
                    types.insert(name, ());
                }
                None => trace!(%schema, datatype = %name, "dropping datatype in unknown schema"),
            }
        }
        self.bump();
    }

    /// Replace the active search path
    pub fn set_search_path<I, S>(&mut self, schemas: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.search_path = schemas
            .into_iter()
            .map(|s| self.names.normalize(s.as_ref()))
            .collect();
        self.bump();
    }

    /// Normalized schemas of the active search path, in order
    pub fn search_path(&self) -> &[String] {
        &self.search_path
    }

    /// Add database names (used for `\c` and `USE` completion)
    pub fn extend_database_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = self.names.escape(name.as_ref());
            if !self.databases.contains(&name) {
                self.databases.push(name);
            }
        }
        self.bump();
    }

    pub fn databases(&self) -> &[String] {
        &self.databases
    }

    /// Add keywords reported by the server
    ///
    /// They are offered as keyword candidates and treated as reserved words
    /// by the name normalizer from now on. Names already in the store are
    /// re-keyed, so a schema called `data` becomes `"data"` once `DATA` is a
    /// keyword and later lookups still find it.
    pub fn extend_keywords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reserved_changed = false;
        for word in words {
            let word = word.as_ref().to_uppercase();
            if word.is_empty() || self.keywords.contains(&word) {
                continue;
            }
            reserved_changed |= !self.names.is_reserved(&word);
            self.names.extend_reserved_words([word.as_str()]);
            self.keywords.push(word);
        }
        if reserved_changed {
            self.rekey();
        }
        self.bump();
    }

    /// Normalize every stored key again with the current reserved words
    fn rekey(&mut self) {
        let names = &self.names;
        self.tables = rekey_relations(std::mem::take(&mut self.tables), names);
        self.views = rekey_relations(std::mem::take(&mut self.views), names);
        self.functions = rekey_map(std::mem::take(&mut self.functions), names, |f| f);
        self.datatypes = rekey_map(std::mem::take(&mut self.datatypes), names, |t| t);
        for schema in &mut self.search_path {
            *schema = rekeyed(names, schema);
        }
        for database in &mut self.databases {
            *database = rekeyed(names, database);
        }
        trace!(schemas = self.tables.len(), "re-keyed store after reserved words changed");
    }

    /// Keywords reported by the server, upper-cased
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Drop everything except the name normalizer and options
    pub fn reset(&mut self) {
        let version = self.version;
        *self = Self {
            names: std::mem::take(&mut self.names),
            options: std::mem::take(&mut self.options),
            version,
            ..Default::default()
        };
        self.bump();
    }

    fn schema_keys(&self, kind: ObjectKind) -> Vec<&String> {
        match kind {
            ObjectKind::Tables => self.tables.keys().collect(),
            ObjectKind::Views => self.views.keys().collect(),
            ObjectKind::Functions => self.functions.keys().collect(),
            ObjectKind::Datatypes => self.datatypes.keys().collect(),
        }
    }

    /// Every registered schema, in registration order
    pub fn schema_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Whether `schema` (exact or already-normalized spelling) is registered
    pub fn has_schema(&self, schema: &str) -> bool {
        self.tables.contains_key(&self.names.normalize(schema))
    }

    /// Schemas to search for objects of `kind`
    ///
    /// An explicit schema yields just that schema when it is known (and
    /// nothing otherwise). Without one, the search path is used when path
    /// filtering is on, else every registered schema.
    pub fn schemas_for(&self, kind: ObjectKind, schema: Option<&str>) -> Vec<String> {
        match schema {
            Some(schema) => {
                let key = self.names.normalize(schema);
                if self.schema_keys(kind).contains(&&key) {
                    vec![key]
                } else {
                    Vec::new()
                }
            }
            None if self.options.search_path_filter => self.search_path.clone(),
            None => self.schema_keys(kind).into_iter().cloned().collect(),
        }
    }

    /// Schema to prefix an object with, if any
    ///
    /// No prefix when the user already typed a schema or when the object's
    /// schema is on the search path.
    pub fn qualifier_for(&self, object_schema: &str, typed_schema: Option<&str>) -> Option<String> {
        if typed_schema.is_some() || self.search_path.iter().any(|s| s == object_schema) {
            None
        } else {
            Some(object_schema.to_string())
        }
    }

    fn relations(&self, kind: RelationKind) -> &SchemaMap<ColumnMap> {
        match kind {
            RelationKind::Tables => &self.tables,
            RelationKind::Views => &self.views,
        }
    }

    /// Normalized relation names in one schema
    pub fn relation_names(&self, kind: RelationKind, schema: &str) -> Vec<String> {
        self.relations(kind)
            .get(schema)
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Columns of one relation; `schema` and `relation` are normalized keys
    pub fn columns_of(&self, kind: RelationKind, schema: &str, relation: &str) -> Option<&ColumnMap> {
        self.relations(kind).get(schema)?.get(relation)
    }

    /// Normalized function names in one schema
    pub fn function_names(&self, schema: &str) -> Vec<String> {
        self.functions
            .get(schema)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Overloads of one function, in insertion order
    pub fn functions_named(&self, schema: &str, name: &str) -> &[Arc<FunctionMetadata>] {
        self.functions
            .get(schema)
            .and_then(|f| f.get(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Normalized datatype names in one schema
    pub fn datatype_names(&self, schema: &str) -> Vec<String> {
        self.datatypes
            .get(schema)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Pre-rendered argument list of a function overload
    ///
    /// Falls back to rendering on the spot for metadata not in the store.
    pub fn arg_list(&self, style: ArgListStyle, func: &FunctionMetadata) -> String {
        self.arg_lists
            .get(&style)
            .and_then(|cache| cache.get(func))
            .cloned()
            .unwrap_or_else(|| self.options.arg_templates.render(func, style))
    }
}

fn rekeyed(names: &NameNormalizer, key: &str) -> String {
    names.normalize(&unescape(key))
}

fn rekey_map<T>(map: SchemaMap<T>, names: &NameNormalizer, mut payload: impl FnMut(T) -> T) -> SchemaMap<T> {
    map.into_iter()
        .map(|(schema, objects)| {
            let objects = objects
                .into_iter()
                .map(|(name, value)| (rekeyed(names, &name), payload(value)))
                .collect();
            (rekeyed(names, &schema), objects)
        })
        .collect()
}

fn rekey_relations(map: SchemaMap<ColumnMap>, names: &NameNormalizer) -> SchemaMap<ColumnMap> {
    rekey_map(map, names, |columns| {
        columns
            .into_iter()
            .map(|(name, mut column)| {
                let name = rekeyed(names, &name);
                column.name = name.clone();
                (name, column)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MetadataStore {
        let mut store = MetadataStore::new(
            NameNormalizer::with_reserved_words(["SELECT", "USER"]),
            StoreOptions::default(),
        );
        store.register_schemas(["public", "Sales"]);
        store.set_search_path(["public"]);
        store
    }

    fn with_users(store: &mut MetadataStore) {
        store.extend_relations(
            RelationKind::Tables,
            [RelationRow::new("public", "users"), RelationRow::new("public", "orders")],
        );
        store.extend_columns(
            RelationKind::Tables,
            [
                ColumnRow::new("public", "users", "id", "integer"),
                ColumnRow::new("public", "users", "name", "text"),
                ColumnRow::new("public", "orders", "id", "integer"),
                ColumnRow::new("public", "orders", "user_id", "integer"),
            ],
        );
    }

    #[test]
    fn test_register_schemas_is_idempotent() {
        let mut store = store();
        with_users(&mut store);
        let before = store.columns_of(RelationKind::Tables, "public", "users").cloned();

        store.register_schemas(["public"]);

        assert_eq!(store.schema_names(), vec!["public", "\"Sales\""]);
        assert_eq!(
            store.columns_of(RelationKind::Tables, "public", "users").cloned(),
            before
        );
    }

    #[test]
    fn test_relation_names_are_normalized() {
        let mut store = store();
        store.extend_relations(
            RelationKind::Tables,
            [RelationRow::new("Sales", "Orders"), RelationRow::new("public", "user")],
        );
        assert_eq!(
            store.relation_names(RelationKind::Tables, "\"Sales\""),
            vec!["\"Orders\""]
        );
        assert_eq!(store.relation_names(RelationKind::Tables, "public"), vec!["\"user\""]);
    }

    #[test]
    fn test_rows_for_unknown_schema_are_dropped() {
        let mut store = store();
        store.extend_relations(RelationKind::Views, [RelationRow::new("missing", "v")]);
        store.extend_columns(RelationKind::Views, [ColumnRow::new("public", "nope", "a", "int")]);
        assert!(store.relation_names(RelationKind::Views, "missing").is_empty());
        assert!(store.columns_of(RelationKind::Views, "public", "nope").is_none());
    }

    #[test]
    fn test_columns_keep_row_order_and_defaults() {
        let mut store = store();
        with_users(&mut store);
        store.extend_columns(
            RelationKind::Tables,
            [ColumnRow::new("public", "users", "created_at", "timestamp").with_default("now()")],
        );
        let columns = store.columns_of(RelationKind::Tables, "public", "users").unwrap();
        let names: Vec<_> = columns.keys().cloned().collect();
        assert_eq!(names, vec!["id", "name", "created_at"]);
        assert_eq!(
            columns["created_at"].default_expression.as_deref(),
            Some("now()")
        );
    }

    #[test]
    fn test_extend_relations_overwrites() {
        let mut store = store();
        with_users(&mut store);
        store.extend_relations(RelationKind::Tables, [RelationRow::new("public", "users")]);
        assert!(store.columns_of(RelationKind::Tables, "public", "users").unwrap().is_empty());
    }

    #[test]
    fn test_foreign_keys_attach_to_both_endpoints() {
        let mut store = store();
        with_users(&mut store);
        let fk = ForeignKey::new(("public", "users", "id"), ("public", "orders", "user_id"));
        store.extend_foreignkeys([fk.clone(), fk.clone()]);

        let parent = &store.columns_of(RelationKind::Tables, "public", "users").unwrap()["id"];
        let child = &store.columns_of(RelationKind::Tables, "public", "orders").unwrap()["user_id"];
        assert_eq!(parent.foreign_keys.len(), 1);
        assert_eq!(child.foreign_keys.len(), 1);
        assert!(Arc::ptr_eq(&parent.foreign_keys[0], &child.foreign_keys[0]));
    }

    #[test]
    fn test_foreign_key_with_missing_endpoint_is_dropped() {
        let mut store = store();
        with_users(&mut store);
        let fk = ForeignKey::new(("public", "accounts", "id"), ("public", "orders", "user_id"));
        store.extend_foreignkeys([fk]);
        let child = &store.columns_of(RelationKind::Tables, "public", "orders").unwrap()["user_id"];
        assert!(child.foreign_keys.is_empty());
    }

    #[test]
    fn test_function_overloads_accumulate() {
        let mut store = store();
        store.extend_functions([FunctionMetadata::new("public", "f").with_arg("a", "int")]);
        store.extend_functions([FunctionMetadata::new("public", "f").with_arg("a", "text")]);

        let overloads = store.functions_named("public", "f");
        assert_eq!(overloads.len(), 2);
        for func in overloads {
            assert_eq!(store.arg_list(ArgListStyle::Signature, func), format!("(a {})", func.arg_types[0]));
        }
    }

    #[test]
    fn test_schemas_for() {
        let mut store = store();
        assert_eq!(store.schemas_for(ObjectKind::Tables, None), vec!["public", "\"Sales\""]);
        assert_eq!(store.schemas_for(ObjectKind::Tables, Some("Sales")), vec!["\"Sales\""]);
        assert!(store.schemas_for(ObjectKind::Tables, Some("sales")).is_empty());

        store.options.search_path_filter = true;
        assert_eq!(store.schemas_for(ObjectKind::Functions, None), vec!["public"]);
    }

    #[test]
    fn test_qualifier_for() {
        let store = store();
        assert_eq!(store.qualifier_for("public", None), None);
        assert_eq!(store.qualifier_for("\"Sales\"", None), Some("\"Sales\"".to_string()));
        assert_eq!(store.qualifier_for("\"Sales\"", Some("Sales")), None);
    }

    #[test]
    fn test_keywords_become_reserved() {
        let mut store = store();
        assert_eq!(store.names().escape("lateral"), "lateral");
        store.extend_keywords(["lateral"]);
        assert_eq!(store.names().escape("lateral"), "\"lateral\"");
        assert_eq!(store.keywords(), ["LATERAL"]);
    }

    #[test]
    fn test_new_keywords_rekey_existing_names() {
        let mut store = store();
        store.register_schemas(["data"]);
        store.set_search_path(["data", "public"]);
        store.extend_relations(RelationKind::Tables, [RelationRow::new("data", "metrics")]);
        store.extend_columns(
            RelationKind::Tables,
            [ColumnRow::new("data", "metrics", "value", "numeric")],
        );

        store.extend_keywords(["DATA", "VALUE"]);

        assert_eq!(store.schema_names(), vec!["public", "\"Sales\"", "\"data\""]);
        assert_eq!(store.search_path(), ["\"data\"", "public"]);
        assert_eq!(store.schemas_for(ObjectKind::Tables, Some("data")), vec!["\"data\""]);
        let columns = store
            .columns_of(RelationKind::Tables, "\"data\"", "metrics")
            .unwrap();
        assert_eq!(columns["\"value\""].name, "\"value\"");

        // Rows arriving later land in the same place
        store.extend_relations(RelationKind::Tables, [RelationRow::new("data", "events")]);
        assert_eq!(
            store.relation_names(RelationKind::Tables, "\"data\""),
            vec!["metrics", "events"]
        );
    }

    #[test]
    fn test_reregistering_known_schemas_changes_nothing() {
        let mut store = store();
        let version = store.version();
        store.register_schemas(["public", "Sales"]);
        assert_eq!(store.version(), version);

        store.register_schemas(["public", "archive"]);
        assert!(store.version() > version);
    }

    #[test]
    fn test_version_and_reset() {
        let mut store = store();
        let version = store.version();
        with_users(&mut store);
        assert!(store.version() > version);

        let version = store.version();
        store.reset();
        assert!(store.version() > version);
        assert!(store.schema_names().is_empty());
        assert!(store.search_path().is_empty());
        assert_eq!(store.names().escape("user"), "\"user\"");
    }
}
