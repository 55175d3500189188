// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog trait for database schema abstraction
//!
//! The connection boundary of the completion engine. Each method runs one
//! metadata query and returns typed rows; the engine feeds them into the
//! [`MetadataStore`](crate::MetadataStore). Query text, server-version
//! handling and connection management belong to the implementation.

use crate::error::CatalogResult;
use crate::metadata::{ColumnRow, DatatypeRow, ForeignKey, FunctionMetadata, RelationKind, RelationRow};

/// Catalog trait for database schema abstraction
///
/// Schema arguments are exact catalog names (unquoted). Implementations
/// return rows for those schemas only.
///
/// # Examples
///
/// ```rust,ignore
/// use sqlcomplete_catalog::{Catalog, CatalogError, RelationKind};
///
/// async fn table_names(catalog: &impl Catalog) -> Result<Vec<String>, CatalogError> {
///     let schemas = catalog.search_path().await?;
///     let rows = catalog.relations(RelationKind::Tables, &schemas).await?;
///     Ok(rows.into_iter().map(|r| r.name).collect())
/// }
/// ```
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Whether the underlying connection is usable
    ///
    /// The engine refuses to complete (rather than returning stale or empty
    /// results) when this is `false`.
    async fn is_connected(&self) -> bool {
        true
    }

    /// The session's effective search path, in order
    async fn search_path(&self) -> CatalogResult<Vec<String>>;

    /// Every schema visible to the session
    async fn schemata(&self) -> CatalogResult<Vec<String>>;

    /// Tables or views in the given schemas
    ///
    /// # Arguments
    ///
    /// * `kind` - Which relation flavour to list
    /// * `schemas` - Exact schema names to restrict the query to
    async fn relations(&self, kind: RelationKind, schemas: &[String])
    -> CatalogResult<Vec<RelationRow>>;

    /// Columns of the tables or views in the given schemas
    ///
    /// Rows must come in column order within each relation.
    async fn columns(&self, kind: RelationKind, schemas: &[String]) -> CatalogResult<Vec<ColumnRow>>;

    /// Every function overload in the given schemas
    async fn functions(&self, schemas: &[String]) -> CatalogResult<Vec<FunctionMetadata>>;

    /// Foreign keys with either endpoint in the given schemas
    async fn foreign_keys(&self, schemas: &[String]) -> CatalogResult<Vec<ForeignKey>>;

    /// User-defined datatypes in the given schemas
    async fn datatypes(&self, schemas: &[String]) -> CatalogResult<Vec<DatatypeRow>>;

    /// Names of the databases on the server
    async fn databases(&self) -> CatalogResult<Vec<String>>;

    /// Keywords known to the server
    ///
    /// The default implementation reports none, leaving the engine with its
    /// built-in keyword list.
    async fn keywords(&self) -> CatalogResult<Vec<String>> {
        Ok(Vec::new())
    }
}
