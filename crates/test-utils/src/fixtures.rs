// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures and sample data
//!
//! The sample schema is a small shop database:
//!
//! - `public.users`, `public.orders`, `public.order_items`, `public.products`
//! - `public.active_users` (view)
//! - `"Audit"."Events"`, a mixed-case schema and table
//! - overloaded, set-returning, aggregate and extension functions
//! - foreign keys from orders to users, order items to orders and products,
//!   and audit events to users

use sqlcomplete_catalog::{
    ArgMode, CatalogSnapshot, DatatypeRow, ForeignKey, FunctionMetadata, RelationSnapshot,
};
use sqlcomplete_context::{Classifier, Suggestion};

const SERIAL: &str = "nextval('users_id_seq'::regclass)";

/// The shared sample schema
pub fn sample_snapshot() -> CatalogSnapshot {
    CatalogSnapshot {
        search_path: vec!["public".to_string()],
        schemata: vec!["public".to_string(), "Audit".to_string()],
        tables: vec![
            RelationSnapshot::new("public", "users")
                .column_with_default("id", "integer", SERIAL)
                .column("name", "text")
                .column("email", "text")
                .column_with_default("created_at", "timestamp", "now()"),
            RelationSnapshot::new("public", "orders")
                .column_with_default("id", "integer", "nextval('orders_id_seq'::regclass)")
                .column("user_id", "integer")
                .column("total", "numeric")
                .column_with_default("status", "text", "'new'::text")
                .column_with_default("created_at", "timestamp", "now()"),
            RelationSnapshot::new("public", "order_items")
                .column("id", "integer")
                .column("order_id", "integer")
                .column("product_id", "integer")
                .column("quantity", "integer"),
            RelationSnapshot::new("public", "products")
                .column("id", "integer")
                .column("name", "text")
                .column("price", "numeric"),
            RelationSnapshot::new("Audit", "Events")
                .column("event_id", "bigint")
                .column("user_id", "integer")
                .column("payload", "jsonb"),
        ],
        views: vec![
            RelationSnapshot::new("public", "active_users")
                .column("id", "integer")
                .column("name", "text"),
        ],
        functions: vec![
            FunctionMetadata::new("public", "custom_func")
                .with_arg("a", "integer")
                .with_arg("b", "text")
                .returns("integer"),
            FunctionMetadata::new("public", "format_name")
                .with_arg("name", "text")
                .returns("text"),
            FunctionMetadata::new("public", "format_name")
                .with_arg("first", "text")
                .with_arg("last", "text")
                .returns("text"),
            FunctionMetadata::new("public", "user_orders")
                .with_arg("uid", "integer")
                .with_arg("order_id", "integer")
                .with_arg("total", "numeric")
                .with_modes(vec![ArgMode::In, ArgMode::Table, ArgMode::Table])
                .returns("record")
                .set_returning(),
            FunctionMetadata::new("public", "sum_total")
                .with_arg("amount", "numeric")
                .returns("numeric")
                .aggregate(),
            FunctionMetadata::new("public", "gen_random_bytes")
                .with_arg("n", "integer")
                .returns("bytea")
                .extension(),
        ],
        foreign_keys: vec![
            ForeignKey::new(("public", "users", "id"), ("public", "orders", "user_id")),
            ForeignKey::new(("public", "orders", "id"), ("public", "order_items", "order_id")),
            ForeignKey::new(("public", "products", "id"), ("public", "order_items", "product_id")),
            ForeignKey::new(("public", "users", "id"), ("Audit", "Events", "user_id")),
        ],
        datatypes: vec![
            DatatypeRow::new("public", "mood"),
            DatatypeRow::new("Audit", "severity"),
        ],
        databases: vec!["app".to_string(), "analytics".to_string(), "postgres".to_string()],
        keywords: Vec::new(),
    }
}

/// Classifier that ignores its input and returns canned suggestions
#[derive(Debug, Clone, Default)]
pub struct FixedClassifier {
    suggestions: Vec<Suggestion>,
}

impl FixedClassifier {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self { suggestions }
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _full_sql: &str, _text_before_cursor: &str) -> Vec<Suggestion> {
        self.suggestions.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_schemas() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.schemata(), vec!["public", "Audit"]);
        assert_eq!(snapshot.search_path(), vec!["public"]);
        assert_eq!(snapshot.tables.len(), 5);
    }

    #[test]
    fn test_fixed_classifier() {
        let classifier = FixedClassifier::new(vec![Suggestion::Database]);
        assert_eq!(classifier.classify("anything", ""), vec![Suggestion::Database]);
    }
}
