// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqlcomplete - Catalog Layer
//!
//! Schema metadata for the completion engine:
//!
//! - **Name normalization**: quoting rules and reference comparison
//!   ([`NameNormalizer`], [`generate_alias`])
//! - **Metadata store**: the per-session cache of tables, views, functions
//!   and datatypes ([`MetadataStore`])
//! - **Catalogs**: the async connection boundary ([`Catalog`]) with a static
//!   JSON implementation and a live PostgreSQL one (feature `postgresql`)
//!
//! ## Usage
//!
//! ```rust
//! use sqlcomplete_catalog::{
//!     ColumnRow, MetadataStore, NameNormalizer, RelationKind, RelationRow, StoreOptions,
//! };
//!
//! let mut store = MetadataStore::new(NameNormalizer::new(), StoreOptions::default());
//! store.register_schemas(["public"]);
//! store.extend_relations(RelationKind::Tables, [RelationRow::new("public", "users")]);
//! store.extend_columns(
//!     RelationKind::Tables,
//!     [ColumnRow::new("public", "users", "id", "integer")],
//! );
//!
//! let columns = store.columns_of(RelationKind::Tables, "public", "users").unwrap();
//! assert_eq!(columns["id"].datatype, "integer");
//! ```
//!
//! ## Implementing the Catalog Trait
//!
//! ```rust,ignore
//! use sqlcomplete_catalog::{Catalog, CatalogResult, RelationKind, RelationRow};
//! use async_trait::async_trait;
//!
//! struct MyCatalog;
//!
//! #[async_trait]
//! impl Catalog for MyCatalog {
//!     async fn search_path(&self) -> CatalogResult<Vec<String>> {
//!         Ok(vec!["public".into()])
//!     }
//!
//!     async fn relations(&self, kind: RelationKind, schemas: &[String])
//!         -> CatalogResult<Vec<RelationRow>> {
//!         // Your implementation here
//!     }
//!
//!     // ...
//! }
//! ```

pub mod args;
pub mod error;
pub mod live_postgres;
pub mod metadata;
pub mod names;
pub mod r#static;
pub mod store;
pub mod r#trait;

// Re-exports
pub use args::{ArgListStyle, ArgListTemplates};
pub use error::{CatalogError, CatalogResult};
pub use live_postgres::LivePostgreSQLCatalog;
pub use metadata::{
    ArgMode, ColumnMetadata, ColumnRow, DatatypeRow, ForeignKey, FunctionArg, FunctionMetadata,
    RelationKind, RelationRow,
};
pub use names::{NameNormalizer, fold_identifier, generate_alias, normalize_ref, unescape};
pub use r#static::{CatalogSnapshot, ColumnSnapshot, RelationSnapshot, StaticCatalog};
pub use store::{ColumnMap, MetadataStore, ObjectKind, StoreOptions};
pub use r#trait::Catalog;
