// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for sqlcomplete
//!
//! This crate provides common testing components including:
//! - A mock catalog with call counting and failure injection
//! - A sample schema shared by the engine tests
//! - A classifier that returns canned suggestions
//! - Ordering assertions for completion lists

pub mod assertions;
pub mod fixtures;
pub mod mock_catalog;

// Re-exports for convenience
pub use assertions::{assert_contains_all, assert_excludes, assert_ranked_before};
pub use fixtures::{FixedClassifier, sample_snapshot};
pub use mock_catalog::{MockCatalog, MockCatalogBuilder, MockOperation};
