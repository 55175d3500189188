// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqlcomplete - Completion Engine
//!
//! Turns the SQL typed so far into a ranked list of completions, using
//! metadata fetched lazily from a database connection.
//!
//! ## Architecture
//!
//! ```text
//! CompletionEngine
//!   ├── Classifier (sqlcomplete-context): which kinds of object fit here
//!   ├── CatalogLoader: fetches only the metadata those kinds need
//!   ├── generators: one candidate list per suggestion
//!   ├── matcher: fuzzy or strict matching, priority keys
//!   └── PrevalenceTracker: how often names and keywords were used
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sqlcomplete_catalog::StaticCatalog;
//! use sqlcomplete_engine::CompletionEngine;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let catalog = StaticCatalog::from_path("schema.json")?;
//! let mut engine = CompletionEngine::new(Arc::new(catalog));
//!
//! let sql = "SELECT * FROM users WHERE na";
//! for completion in engine.complete(sql, sql).await? {
//!     println!("{}", completion.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod candidate;
pub mod catalog_integration;
pub mod config;
pub mod engine;
pub mod error;
pub mod generators;
pub mod matcher;
pub mod prevalence;
pub mod session;

pub use candidate::{Candidate, Category, Completion, Match, MatchMode};
pub use catalog_integration::{CatalogLoader, LoadKey};
pub use config::{AsteriskColumnOrder, CompletionConfig, ConfigError, KeywordCasing, QualifyColumns};
pub use engine::{CompletionEngine, EngineState};
pub use error::{CompletionError, CompletionResult};
pub use generators::{Generated, GeneratorContext};
pub use matcher::{MatchQuality, PriorityKey};
pub use prevalence::PrevalenceTracker;
pub use session::SessionRegistry;
