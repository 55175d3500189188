// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! A catalog backed by a JSON snapshot instead of a live connection. Used by
//! the command-line tool and for offline completion.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlcomplete_catalog::StaticCatalog;
//!
//! let catalog = StaticCatalog::from_path("schema.json")?;
//! let tables = catalog.relations(RelationKind::Tables, &["public".into()]).await?;
//! ```

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::metadata::{
    ColumnRow, DatatypeRow, ForeignKey, FunctionMetadata, RelationKind, RelationRow,
};
use crate::{Catalog, CatalogError, CatalogResult};

/// A column inside a relation snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    pub name: String,
    pub datatype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A table or view with its columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSnapshot {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSnapshot>,
}

impl RelationSnapshot {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column without default
    pub fn column(mut self, name: impl Into<String>, datatype: impl Into<String>) -> Self {
        self.columns.push(ColumnSnapshot {
            name: name.into(),
            datatype: datatype.into(),
            default: None,
        });
        self
    }

    /// Append a column with a default expression
    pub fn column_with_default(
        mut self,
        name: impl Into<String>,
        datatype: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        self.columns.push(ColumnSnapshot {
            name: name.into(),
            datatype: datatype.into(),
            default: Some(default.into()),
        });
        self
    }
}

/// Complete schema snapshot, the JSON document read by [`StaticCatalog`]
///
/// Every field is optional in JSON. When `schemata` is empty the schemas are
/// derived from the objects; when `search_path` is empty it defaults to
/// `["public"]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    pub search_path: Vec<String>,
    pub schemata: Vec<String>,
    pub tables: Vec<RelationSnapshot>,
    pub views: Vec<RelationSnapshot>,
    pub functions: Vec<FunctionMetadata>,
    pub foreign_keys: Vec<ForeignKey>,
    pub datatypes: Vec<DatatypeRow>,
    pub databases: Vec<String>,
    pub keywords: Vec<String>,
}

impl CatalogSnapshot {
    /// Parse a snapshot from JSON text
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn search_path(&self) -> Vec<String> {
        if self.search_path.is_empty() {
            vec!["public".to_string()]
        } else {
            self.search_path.clone()
        }
    }

    pub fn schemata(&self) -> Vec<String> {
        if !self.schemata.is_empty() {
            return self.schemata.clone();
        }
        let mut schemas: Vec<String> = Vec::new();
        let found = self
            .tables
            .iter()
            .chain(self.views.iter())
            .map(|r| &r.schema)
            .chain(self.functions.iter().map(|f| &f.schema))
            .chain(self.datatypes.iter().map(|d| &d.schema));
        for schema in found {
            if !schemas.contains(schema) {
                schemas.push(schema.clone());
            }
        }
        schemas
    }

    fn relation_list(&self, kind: RelationKind) -> &[RelationSnapshot] {
        match kind {
            RelationKind::Tables => &self.tables,
            RelationKind::Views => &self.views,
        }
    }

    pub fn relations(&self, kind: RelationKind, schemas: &[String]) -> Vec<RelationRow> {
        self.relation_list(kind)
            .iter()
            .filter(|r| schemas.contains(&r.schema))
            .map(|r| RelationRow::new(&r.schema, &r.name))
            .collect()
    }

    pub fn columns(&self, kind: RelationKind, schemas: &[String]) -> Vec<ColumnRow> {
        self.relation_list(kind)
            .iter()
            .filter(|r| schemas.contains(&r.schema))
            .flat_map(|r| {
                r.columns.iter().map(move |c| {
                    let row = ColumnRow::new(&r.schema, &r.name, &c.name, &c.datatype);
                    match &c.default {
                        Some(default) => row.with_default(default),
                        None => row,
                    }
                })
            })
            .collect()
    }

    pub fn functions(&self, schemas: &[String]) -> Vec<FunctionMetadata> {
        self.functions
            .iter()
            .filter(|f| schemas.contains(&f.schema))
            .cloned()
            .collect()
    }

    pub fn foreign_keys(&self, schemas: &[String]) -> Vec<ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(|fk| schemas.contains(&fk.child_schema) || schemas.contains(&fk.parent_schema))
            .cloned()
            .collect()
    }

    pub fn datatypes(&self, schemas: &[String]) -> Vec<DatatypeRow> {
        self.datatypes
            .iter()
            .filter(|d| schemas.contains(&d.schema))
            .cloned()
            .collect()
    }
}

/// Catalog serving a fixed [`CatalogSnapshot`]
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    snapshot: CatalogSnapshot,
}

impl StaticCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        CatalogSnapshot::from_json(json).map(Self::new)
    }

    /// Read a catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ConfigurationError` if the file cannot be read
    /// and `CatalogError::SerializationError` if it is not a valid snapshot.
    pub fn from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::ConfigurationError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn search_path(&self) -> CatalogResult<Vec<String>> {
        Ok(self.snapshot.search_path())
    }

    async fn schemata(&self) -> CatalogResult<Vec<String>> {
        Ok(self.snapshot.schemata())
    }

    async fn relations(
        &self,
        kind: RelationKind,
        schemas: &[String],
    ) -> CatalogResult<Vec<RelationRow>> {
        Ok(self.snapshot.relations(kind, schemas))
    }

    async fn columns(&self, kind: RelationKind, schemas: &[String]) -> CatalogResult<Vec<ColumnRow>> {
        Ok(self.snapshot.columns(kind, schemas))
    }

    async fn functions(&self, schemas: &[String]) -> CatalogResult<Vec<FunctionMetadata>> {
        Ok(self.snapshot.functions(schemas))
    }

    async fn foreign_keys(&self, schemas: &[String]) -> CatalogResult<Vec<ForeignKey>> {
        Ok(self.snapshot.foreign_keys(schemas))
    }

    async fn datatypes(&self, schemas: &[String]) -> CatalogResult<Vec<DatatypeRow>> {
        Ok(self.snapshot.datatypes(schemas))
    }

    async fn databases(&self) -> CatalogResult<Vec<String>> {
        Ok(self.snapshot.databases.clone())
    }

    async fn keywords(&self) -> CatalogResult<Vec<String>> {
        Ok(self.snapshot.keywords.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "tables": [
            {"schema": "public", "name": "users", "columns": [
                {"name": "id", "datatype": "integer", "default": "nextval('users_id_seq'::regclass)"},
                {"name": "name", "datatype": "text"}
            ]},
            {"schema": "sales", "name": "orders", "columns": [
                {"name": "user_id", "datatype": "integer"}
            ]}
        ],
        "foreign_keys": [{
            "parent_schema": "public", "parent_table": "users", "parent_column": "id",
            "child_schema": "sales", "child_table": "orders", "child_column": "user_id"
        }],
        "functions": [{"schema": "public", "name": "now_utc", "return_type": "timestamp"}]
    }"#;

    #[tokio::test]
    async fn test_snapshot_filters_by_schema() {
        let catalog = StaticCatalog::from_json(SNAPSHOT).unwrap();
        let public = vec!["public".to_string()];

        let tables = catalog.relations(RelationKind::Tables, &public).await.unwrap();
        assert_eq!(tables, vec![RelationRow::new("public", "users")]);

        let columns = catalog.columns(RelationKind::Tables, &public).await.unwrap();
        assert_eq!(columns.len(), 2);
        assert!(columns[0].has_default);
        assert!(!columns[1].has_default);

        let fks = catalog.foreign_keys(&public).await.unwrap();
        assert_eq!(fks.len(), 1);

        let views = catalog.relations(RelationKind::Views, &public).await.unwrap();
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_defaults() {
        let catalog = StaticCatalog::from_json(SNAPSHOT).unwrap();
        assert_eq!(catalog.search_path().await.unwrap(), vec!["public"]);
        assert_eq!(catalog.schemata().await.unwrap(), vec!["public", "sales"]);
        assert!(catalog.is_connected().await);
        assert!(catalog.keywords().await.unwrap().is_empty());
    }

    #[test]
    fn test_invalid_snapshot() {
        let err = StaticCatalog::from_json(r#"{"tables": 3}"#).unwrap_err();
        assert!(matches!(err, CatalogError::SerializationError(_)));
    }
}
