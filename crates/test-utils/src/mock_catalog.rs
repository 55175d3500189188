// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock catalog implementation for testing
//!
//! Serves a [`CatalogSnapshot`] like the static catalog, but counts every
//! query and can be told to fail individual queries or to report a lost
//! connection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use sqlcomplete_catalog::{
    Catalog, CatalogError, CatalogResult, CatalogSnapshot, ColumnRow, DatatypeRow, ForeignKey,
    FunctionMetadata, RelationKind, RelationRow, RelationSnapshot,
};

use crate::fixtures::sample_snapshot;

/// Catalog queries, for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    SearchPath,
    Schemata,
    Relations,
    Columns,
    Functions,
    ForeignKeys,
    Datatypes,
    Databases,
    Keywords,
}

/// In-memory mock catalog for testing
#[derive(Debug)]
pub struct MockCatalog {
    snapshot: CatalogSnapshot,
    connected: AtomicBool,
    failing: Mutex<HashSet<MockOperation>>,
    calls: Mutex<HashMap<MockOperation, usize>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(CatalogSnapshot::default())
    }
}

impl MockCatalog {
    /// Create a connected catalog serving `snapshot`
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot,
            connected: AtomicBool::new(true),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every later `operation` query fail
    pub fn fail(&self, operation: MockOperation) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(operation);
    }

    /// Undo [`fail`](Self::fail)
    pub fn recover(&self, operation: MockOperation) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&operation);
    }

    /// How many times `operation` was queried
    pub fn calls(&self, operation: MockOperation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    fn record(&self, operation: MockOperation) -> CatalogResult<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation)
            .or_default() += 1;

        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&operation);
        if failing {
            Err(CatalogError::QueryFailed(format!("injected failure: {operation:?}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl Catalog for MockCatalog {
    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn search_path(&self) -> CatalogResult<Vec<String>> {
        self.record(MockOperation::SearchPath)?;
        Ok(self.snapshot.search_path())
    }

    async fn schemata(&self) -> CatalogResult<Vec<String>> {
        self.record(MockOperation::Schemata)?;
        Ok(self.snapshot.schemata())
    }

    async fn relations(
        &self,
        kind: RelationKind,
        schemas: &[String],
    ) -> CatalogResult<Vec<RelationRow>> {
        self.record(MockOperation::Relations)?;
        Ok(self.snapshot.relations(kind, schemas))
    }

    async fn columns(&self, kind: RelationKind, schemas: &[String]) -> CatalogResult<Vec<ColumnRow>> {
        self.record(MockOperation::Columns)?;
        Ok(self.snapshot.columns(kind, schemas))
    }

    async fn functions(&self, schemas: &[String]) -> CatalogResult<Vec<FunctionMetadata>> {
        self.record(MockOperation::Functions)?;
        Ok(self.snapshot.functions(schemas))
    }

    async fn foreign_keys(&self, schemas: &[String]) -> CatalogResult<Vec<ForeignKey>> {
        self.record(MockOperation::ForeignKeys)?;
        Ok(self.snapshot.foreign_keys(schemas))
    }

    async fn datatypes(&self, schemas: &[String]) -> CatalogResult<Vec<DatatypeRow>> {
        self.record(MockOperation::Datatypes)?;
        Ok(self.snapshot.datatypes(schemas))
    }

    async fn databases(&self) -> CatalogResult<Vec<String>> {
        self.record(MockOperation::Databases)?;
        Ok(self.snapshot.databases.clone())
    }

    async fn keywords(&self) -> CatalogResult<Vec<String>> {
        self.record(MockOperation::Keywords)?;
        Ok(self.snapshot.keywords.clone())
    }
}

/// Builder for creating mock catalogs with a fluent API
#[derive(Debug, Default)]
pub struct MockCatalogBuilder {
    snapshot: CatalogSnapshot,
    failing: Vec<MockOperation>,
    disconnected: bool,
}

impl MockCatalogBuilder {
    /// Create a new builder with an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the shared sample schema
    pub fn with_sample_schema(mut self) -> Self {
        self.snapshot = sample_snapshot();
        self
    }

    pub fn search_path<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.snapshot.search_path = schemas.into_iter().map(Into::into).collect();
        self
    }

    pub fn schema(mut self, name: impl Into<String>) -> Self {
        self.snapshot.schemata.push(name.into());
        self
    }

    pub fn table(mut self, table: RelationSnapshot) -> Self {
        self.snapshot.tables.push(table);
        self
    }

    pub fn view(mut self, view: RelationSnapshot) -> Self {
        self.snapshot.views.push(view);
        self
    }

    pub fn function(mut self, function: FunctionMetadata) -> Self {
        self.snapshot.functions.push(function);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.snapshot.foreign_keys.push(foreign_key);
        self
    }

    pub fn datatype(mut self, schema: impl Into<String>, name: impl Into<String>) -> Self {
        self.snapshot.datatypes.push(DatatypeRow::new(schema, name));
        self
    }

    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.snapshot.databases.push(name.into());
        self
    }

    /// A server keyword; reserved ones change how names are quoted
    pub fn keyword(mut self, word: impl Into<String>) -> Self {
        self.snapshot.keywords.push(word.into());
        self
    }

    /// Make `operation` fail from the start
    pub fn failing(mut self, operation: MockOperation) -> Self {
        self.failing.push(operation);
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.disconnected = true;
        self
    }

    pub fn build(self) -> MockCatalog {
        let catalog = MockCatalog::new(self.snapshot);
        for operation in self.failing {
            catalog.fail(operation);
        }
        catalog.set_connected(!self.disconnected);
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_builder_and_counters() {
        let catalog = MockCatalogBuilder::new()
            .table(RelationSnapshot::new("public", "t").column("a", "integer"))
            .build();

        let public = vec!["public".to_string()];
        let rows = catalog.relations(RelationKind::Tables, &public).await.unwrap();
        assert_eq!(rows, vec![RelationRow::new("public", "t")]);
        catalog.relations(RelationKind::Views, &public).await.unwrap();

        assert_eq!(catalog.calls(MockOperation::Relations), 2);
        assert_eq!(catalog.calls(MockOperation::Columns), 0);
        assert_eq!(catalog.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let catalog = MockCatalogBuilder::new()
            .failing(MockOperation::Databases)
            .build();
        assert!(catalog.databases().await.is_err());

        catalog.recover(MockOperation::Databases);
        assert!(catalog.databases().await.is_ok());
        assert_eq!(catalog.calls(MockOperation::Databases), 2);
    }

    #[tokio::test]
    async fn test_connection_flag() {
        let catalog = MockCatalogBuilder::new().disconnected().build();
        assert!(!catalog.is_connected().await);
        catalog.set_connected(true);
        assert!(catalog.is_connected().await);
    }
}
