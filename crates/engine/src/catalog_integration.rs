// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog integration for completion
//!
//! Populates the [`MetadataStore`] lazily: before a generator runs, the
//! loader fetches just the metadata that suggestion reads. Every load key is
//! attempted once per store lifetime. A failed query is logged and the key
//! still counts as attempted; only [`CatalogLoader::reset`] makes it
//! eligible again.

use std::collections::HashSet;
use std::sync::Arc;

use sqlcomplete_catalog::{Catalog, CatalogResult, MetadataStore, ObjectKind, RelationKind};
use sqlcomplete_context::{Suggestion, TableReference};
use tracing::{debug, warn};

/// One unit of lazily loaded metadata
///
/// Schema fields hold normalized store keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoadKey {
    /// Search path, schema list and server keywords
    Session,
    Databases,
    Relations(RelationKind, String),
    Columns(RelationKind, String),
    Functions(String),
    ForeignKeys(String),
    Datatypes(String),
}

/// Lazy metadata loader
pub struct CatalogLoader {
    catalog: Arc<dyn Catalog>,
    attempted: HashSet<LoadKey>,
}

impl CatalogLoader {
    /// Create a new loader
    ///
    /// # Arguments
    ///
    /// * `catalog` - The catalog to fetch from
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            attempted: HashSet::new(),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.catalog.is_connected().await
    }

    /// Whether `key` has been attempted since the last reset
    pub fn is_attempted(&self, key: &LoadKey) -> bool {
        self.attempted.contains(key)
    }

    /// Forget every attempt so the next completion refetches
    pub fn reset(&mut self) {
        self.attempted.clear();
    }

    /// Load keywords, schemas and the search path
    pub async fn ensure_session(&mut self, store: &mut MetadataStore) {
        if !self.attempted.insert(LoadKey::Session) {
            return;
        }
        let keywords = self.catalog.keywords().await;
        let schemata = self.catalog.schemata().await;
        let search_path = self.catalog.search_path().await;

        // Keywords change how names are quoted, so they go in first
        if let Some(words) = loaded("keywords", keywords) {
            store.extend_keywords(words);
        }
        if let Some(schemas) = loaded("schemata", schemata) {
            store.register_schemas(schemas);
        }
        if let Some(path) = loaded("search path", search_path) {
            store.set_search_path(path);
        }
        debug!(
            schemas = store.schema_names().len(),
            search_path = ?store.search_path(),
            "Loaded session metadata"
        );
    }

    /// Load whatever the generator for `suggestion` reads
    pub async fn ensure_for(&mut self, suggestion: &Suggestion, store: &mut MetadataStore) {
        match suggestion {
            Suggestion::Table { schema, .. } => {
                for key in store.schemas_for(ObjectKind::Tables, schema.as_deref()) {
                    self.ensure_relations(RelationKind::Tables, key, store).await;
                }
            }
            Suggestion::View { schema, .. } => {
                for key in store.schemas_for(ObjectKind::Views, schema.as_deref()) {
                    self.ensure_relations(RelationKind::Views, key, store).await;
                }
            }
            Suggestion::FromClauseItem { schema, .. } => {
                for kind in [RelationKind::Tables, RelationKind::Views] {
                    for key in store.schemas_for(kind.into(), schema.as_deref()) {
                        self.ensure_relations(kind, key, store).await;
                    }
                }
                for key in store.schemas_for(ObjectKind::Functions, schema.as_deref()) {
                    self.ensure_functions(key, store).await;
                }
            }
            Suggestion::Function { schema, .. } => {
                for key in store.schemas_for(ObjectKind::Functions, schema.as_deref()) {
                    self.ensure_functions(key, store).await;
                }
            }
            Suggestion::Column { table_refs, .. } => {
                self.ensure_scoped_columns(table_refs, store).await;
            }
            Suggestion::Join { table_refs, .. } | Suggestion::JoinCondition { table_refs, .. } => {
                self.ensure_scoped_columns(table_refs, store).await;
                for key in scoped_schemas(table_refs, store) {
                    self.ensure_foreign_keys(key, store).await;
                }
            }
            Suggestion::Datatype { schema } => {
                for key in store.schemas_for(ObjectKind::Datatypes, schema.as_deref()) {
                    self.ensure_datatypes(key, store).await;
                }
            }
            Suggestion::Database => self.ensure_databases(store).await,
            Suggestion::Schema { .. } | Suggestion::Keyword { .. } | Suggestion::Alias { .. } => {}
        }
    }

    /// Columns of every table, view and function the references may name
    async fn ensure_scoped_columns(&mut self, table_refs: &[TableReference], store: &mut MetadataStore) {
        for table in table_refs {
            for key in reference_schemas(table, store) {
                if table.is_function {
                    self.ensure_functions(key, store).await;
                } else {
                    for kind in [RelationKind::Tables, RelationKind::Views] {
                        self.ensure_columns(kind, key.clone(), store).await;
                    }
                }
            }
        }
    }

    async fn ensure_relations(&mut self, kind: RelationKind, schema: String, store: &mut MetadataStore) {
        if !self.attempted.insert(LoadKey::Relations(kind, schema.clone())) {
            return;
        }
        let schemas = vec![store.names().unescape(&schema)];
        if let Some(rows) = loaded("relations", self.catalog.relations(kind, &schemas).await) {
            debug!(?kind, %schema, count = rows.len(), "Loaded relations");
            store.extend_relations(kind, rows);
        }
    }

    async fn ensure_columns(&mut self, kind: RelationKind, schema: String, store: &mut MetadataStore) {
        self.ensure_relations(kind, schema.clone(), store).await;
        if !self.attempted.insert(LoadKey::Columns(kind, schema.clone())) {
            return;
        }
        let schemas = vec![store.names().unescape(&schema)];
        if let Some(rows) = loaded("columns", self.catalog.columns(kind, &schemas).await) {
            debug!(?kind, %schema, count = rows.len(), "Loaded columns");
            store.extend_columns(kind, rows);
        }
    }

    async fn ensure_functions(&mut self, schema: String, store: &mut MetadataStore) {
        if !self.attempted.insert(LoadKey::Functions(schema.clone())) {
            return;
        }
        let schemas = vec![store.names().unescape(&schema)];
        if let Some(rows) = loaded("functions", self.catalog.functions(&schemas).await) {
            debug!(%schema, count = rows.len(), "Loaded functions");
            store.extend_functions(rows);
        }
    }

    /// Foreign keys touching `schema`
    ///
    /// Both endpoints must have their columns in the store before the keys
    /// can be attached, so table columns of every schema the rows mention
    /// are loaded first.
    async fn ensure_foreign_keys(&mut self, schema: String, store: &mut MetadataStore) {
        if !self.attempted.insert(LoadKey::ForeignKeys(schema.clone())) {
            return;
        }
        let schemas = vec![store.names().unescape(&schema)];
        let Some(rows) = loaded("foreign keys", self.catalog.foreign_keys(&schemas).await) else {
            return;
        };

        let mut endpoints: Vec<String> = Vec::new();
        for fk in &rows {
            for name in [&fk.parent_schema, &fk.child_schema] {
                let key = store.names().normalize(name);
                if !endpoints.contains(&key) {
                    endpoints.push(key);
                }
            }
        }
        for key in endpoints {
            self.ensure_columns(RelationKind::Tables, key, store).await;
        }

        debug!(%schema, count = rows.len(), "Loaded foreign keys");
        store.extend_foreignkeys(rows);
    }

    async fn ensure_datatypes(&mut self, schema: String, store: &mut MetadataStore) {
        if !self.attempted.insert(LoadKey::Datatypes(schema.clone())) {
            return;
        }
        let schemas = vec![store.names().unescape(&schema)];
        if let Some(rows) = loaded("datatypes", self.catalog.datatypes(&schemas).await) {
            store.extend_datatypes(rows);
        }
    }

    async fn ensure_databases(&mut self, store: &mut MetadataStore) {
        if !self.attempted.insert(LoadKey::Databases) {
            return;
        }
        if let Some(names) = loaded("databases", self.catalog.databases().await) {
            store.extend_database_names(names);
        }
    }
}

/// Log a failed query and swallow it
fn loaded<T>(what: &str, result: CatalogResult<T>) -> Option<T> {
    match result {
        Ok(rows) => Some(rows),
        Err(e) => {
            warn!(error = %e, "Failed to load {what}");
            None
        }
    }
}

/// Schemas a reference may resolve in: its own schema, else the search path
pub(crate) fn reference_schemas(table: &TableReference, store: &MetadataStore) -> Vec<String> {
    match &table.schema {
        Some(schema) => vec![store.names().normalize(schema)],
        None => store.search_path().to_vec(),
    }
}

fn scoped_schemas(table_refs: &[TableReference], store: &MetadataStore) -> Vec<String> {
    let mut schemas: Vec<String> = Vec::new();
    for table in table_refs {
        for key in reference_schemas(table, store) {
            if !schemas.contains(&key) {
                schemas.push(key);
            }
        }
    }
    schemas
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlcomplete_catalog::{NameNormalizer, StoreOptions};
    use sqlcomplete_test_utils::{MockCatalogBuilder, MockOperation};

    fn store() -> MetadataStore {
        MetadataStore::new(NameNormalizer::new(), StoreOptions::default())
    }

    #[tokio::test]
    async fn test_session_then_tables() {
        let catalog = Arc::new(MockCatalogBuilder::new().with_sample_schema().build());
        let mut loader = CatalogLoader::new(catalog.clone());
        let mut store = store();

        loader.ensure_session(&mut store).await;
        assert_eq!(store.search_path(), ["public"]);
        assert!(store.has_schema("Audit"));

        loader.ensure_for(&Suggestion::table(None), &mut store).await;
        assert!(store.relation_names(RelationKind::Tables, "public").contains(&"users".to_string()));
        assert_eq!(store.relation_names(RelationKind::Tables, "\"Audit\""), vec!["\"Events\""]);
        // Relation names only; columns wait for a column suggestion
        assert_eq!(catalog.calls(MockOperation::Columns), 0);
    }

    #[tokio::test]
    async fn test_each_key_loaded_once() {
        let catalog = Arc::new(MockCatalogBuilder::new().with_sample_schema().build());
        let mut loader = CatalogLoader::new(catalog.clone());
        let mut store = store();
        loader.ensure_session(&mut store).await;

        let suggestion = Suggestion::column(vec![TableReference::new("users")]);
        loader.ensure_for(&suggestion, &mut store).await;
        let calls = catalog.total_calls();
        loader.ensure_for(&suggestion, &mut store).await;
        loader.ensure_session(&mut store).await;
        assert_eq!(catalog.total_calls(), calls);

        let columns = store.columns_of(RelationKind::Tables, "public", "users").unwrap();
        assert_eq!(columns.len(), 4);
    }

    #[tokio::test]
    async fn test_failures_are_attempted_once() {
        let catalog = Arc::new(
            MockCatalogBuilder::new()
                .with_sample_schema()
                .failing(MockOperation::Functions)
                .build(),
        );
        let mut loader = CatalogLoader::new(catalog.clone());
        let mut store = store();
        loader.ensure_session(&mut store).await;

        let suggestion = Suggestion::function(None, None);
        loader.ensure_for(&suggestion, &mut store).await;
        loader.ensure_for(&suggestion, &mut store).await;

        // One query per schema, never retried
        assert_eq!(catalog.calls(MockOperation::Functions), 2);
        assert!(loader.is_attempted(&LoadKey::Functions("public".to_string())));
        assert!(store.function_names("public").is_empty());
    }

    #[tokio::test]
    async fn test_foreign_keys_load_other_endpoint() {
        let catalog = Arc::new(MockCatalogBuilder::new().with_sample_schema().build());
        let mut loader = CatalogLoader::new(catalog);
        let mut store = store();
        loader.ensure_session(&mut store).await;

        let table = TableReference::new("Events").with_schema("Audit");
        loader.ensure_for(&Suggestion::join(vec![table], None), &mut store).await;

        // Only the key touching the audit schema is fetched
        let users = store.columns_of(RelationKind::Tables, "public", "users").unwrap();
        assert_eq!(users["id"].foreign_keys.len(), 1);
        let events = store
            .columns_of(RelationKind::Tables, "\"Audit\"", "\"Events\"")
            .unwrap();
        assert_eq!(events["user_id"].foreign_keys.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_refetches() {
        let catalog = Arc::new(MockCatalogBuilder::new().with_sample_schema().build());
        let mut loader = CatalogLoader::new(catalog.clone());
        let mut store = store();

        loader.ensure_for(&Suggestion::Database, &mut store).await;
        assert_eq!(store.databases().len(), 3);
        loader.reset();
        store.reset();
        loader.ensure_for(&Suggestion::Database, &mut store).await;
        assert_eq!(catalog.calls(MockOperation::Databases), 2);
    }
}
