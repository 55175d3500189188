// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the catalog crate

use sqlcomplete_catalog::{
    ArgListStyle, Catalog, CatalogResult, ColumnRow, DatatypeRow, ForeignKey, FunctionMetadata,
    MetadataStore, NameNormalizer, ObjectKind, RelationKind, RelationRow, StoreOptions,
};

// Mock catalog implementation for integration testing
struct TestCatalog;

#[async_trait::async_trait]
impl Catalog for TestCatalog {
    async fn search_path(&self) -> CatalogResult<Vec<String>> {
        Ok(vec!["public".into()])
    }

    async fn schemata(&self) -> CatalogResult<Vec<String>> {
        Ok(vec!["public".into(), "Audit".into()])
    }

    async fn relations(
        &self,
        kind: RelationKind,
        schemas: &[String],
    ) -> CatalogResult<Vec<RelationRow>> {
        let rows = match kind {
            RelationKind::Tables => vec![
                RelationRow::new("public", "users"),
                RelationRow::new("public", "orders"),
                RelationRow::new("Audit", "Events"),
            ],
            RelationKind::Views => vec![RelationRow::new("public", "active_users")],
        };
        Ok(rows.into_iter().filter(|r| schemas.contains(&r.schema)).collect())
    }

    async fn columns(&self, kind: RelationKind, schemas: &[String]) -> CatalogResult<Vec<ColumnRow>> {
        let rows = match kind {
            RelationKind::Tables => vec![
                ColumnRow::new("public", "users", "id", "integer")
                    .with_default("nextval('users_id_seq'::regclass)"),
                ColumnRow::new("public", "users", "email", "text"),
                ColumnRow::new("public", "orders", "id", "integer"),
                ColumnRow::new("public", "orders", "user_id", "integer"),
                ColumnRow::new("Audit", "Events", "UserId", "integer"),
            ],
            RelationKind::Views => vec![ColumnRow::new("public", "active_users", "id", "integer")],
        };
        Ok(rows.into_iter().filter(|r| schemas.contains(&r.schema)).collect())
    }

    async fn functions(&self, schemas: &[String]) -> CatalogResult<Vec<FunctionMetadata>> {
        let rows = vec![
            FunctionMetadata::new("public", "user_count").returns("bigint"),
            FunctionMetadata::new("public", "user_count")
                .with_arg("active", "boolean")
                .returns("bigint"),
        ];
        Ok(rows.into_iter().filter(|f| schemas.contains(&f.schema)).collect())
    }

    async fn foreign_keys(&self, _schemas: &[String]) -> CatalogResult<Vec<ForeignKey>> {
        Ok(vec![
            ForeignKey::new(("public", "users", "id"), ("public", "orders", "user_id")),
            ForeignKey::new(("public", "users", "id"), ("Audit", "Events", "UserId")),
        ])
    }

    async fn datatypes(&self, _schemas: &[String]) -> CatalogResult<Vec<DatatypeRow>> {
        Ok(vec![DatatypeRow::new("public", "mood")])
    }

    async fn databases(&self) -> CatalogResult<Vec<String>> {
        Ok(vec!["app".into(), "Reporting".into()])
    }
}

async fn populated_store() -> MetadataStore {
    let catalog = TestCatalog;
    let mut store = MetadataStore::new(NameNormalizer::new(), StoreOptions::default());

    store.register_schemas(catalog.schemata().await.unwrap());
    store.set_search_path(catalog.search_path().await.unwrap());

    let schemas = catalog.schemata().await.unwrap();
    for kind in RelationKind::ALL {
        store.extend_relations(kind, catalog.relations(kind, &schemas).await.unwrap());
        store.extend_columns(kind, catalog.columns(kind, &schemas).await.unwrap());
    }
    store.extend_functions(catalog.functions(&schemas).await.unwrap());
    store.extend_foreignkeys(catalog.foreign_keys(&schemas).await.unwrap());
    store.extend_datatypes(catalog.datatypes(&schemas).await.unwrap());
    store.extend_database_names(catalog.databases().await.unwrap());
    store
}

#[tokio::test]
async fn test_catalog_rows_populate_store() {
    let store = populated_store().await;

    assert_eq!(store.schema_names(), vec!["public", "\"Audit\""]);
    assert_eq!(
        store.relation_names(RelationKind::Tables, "public"),
        vec!["users", "orders"]
    );
    assert_eq!(
        store.relation_names(RelationKind::Tables, "\"Audit\""),
        vec!["\"Events\""]
    );
    assert_eq!(
        store.relation_names(RelationKind::Views, "public"),
        vec!["active_users"]
    );
    assert_eq!(store.datatype_names("public"), vec!["mood"]);
    assert_eq!(store.databases(), ["app", "\"Reporting\""]);
}

#[tokio::test]
async fn test_cross_schema_foreign_keys() {
    let store = populated_store().await;

    let users = store.columns_of(RelationKind::Tables, "public", "users").unwrap();
    assert_eq!(users["id"].foreign_keys.len(), 2);

    let events = store
        .columns_of(RelationKind::Tables, "\"Audit\"", "\"Events\"")
        .unwrap();
    let fk = &events["\"UserId\""].foreign_keys[0];
    assert_eq!(fk.parent_table, "users");
    assert_eq!(fk.child_schema, "Audit");
}

#[tokio::test]
async fn test_overloads_and_arg_lists() {
    let store = populated_store().await;
    let overloads = store.functions_named("public", "user_count");
    assert_eq!(overloads.len(), 2);

    let signatures: Vec<String> = overloads
        .iter()
        .map(|f| store.arg_list(ArgListStyle::Signature, f))
        .collect();
    assert_eq!(signatures, vec!["()", "(active boolean)"]);
}

#[tokio::test]
async fn test_reregistering_keeps_contents() {
    let mut store = populated_store().await;
    let version = store.version();

    store.register_schemas(["public", "Audit"]);

    assert!(store.version() > version);
    assert_eq!(store.schema_names(), vec!["public", "\"Audit\""]);
    assert_eq!(
        store.relation_names(RelationKind::Tables, "public"),
        vec!["users", "orders"]
    );
    assert_eq!(store.functions_named("public", "user_count").len(), 2);
}

#[tokio::test]
async fn test_search_path_filtering() {
    let catalog = TestCatalog;
    let options = StoreOptions {
        search_path_filter: true,
        ..Default::default()
    };
    let mut store = MetadataStore::new(NameNormalizer::new(), options);
    store.register_schemas(catalog.schemata().await.unwrap());
    store.set_search_path(catalog.search_path().await.unwrap());

    assert_eq!(store.schemas_for(ObjectKind::Tables, None), vec!["public"]);
    assert_eq!(
        store.schemas_for(ObjectKind::Tables, Some("Audit")),
        vec!["\"Audit\""]
    );
}
