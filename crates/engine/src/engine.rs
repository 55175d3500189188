// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Completion engine
//!
//! Ties the pipeline together for one session:
//!
//! ```text
//! text ─► classifier ─► suggestions ─► loader + generators ─► candidates
//!                                                                │
//!        completions ◄── dedup ◄── sort ◄── matcher ◄────────────┘
//! ```
//!
//! The engine owns the session's metadata store and prevalence counts. Both
//! survive between completions; [`CompletionEngine::refresh`] drops the
//! metadata so it is fetched again.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use sqlcomplete_catalog::{Catalog, MetadataStore, NameNormalizer};
use sqlcomplete_context::{Classifier, KeywordProvider, LexicalClassifier, WordBoundary, last_word};
use tracing::{debug, trace};

use crate::candidate::{Completion, Match};
use crate::catalog_integration::CatalogLoader;
use crate::config::CompletionConfig;
use crate::error::{CompletionError, CompletionResult};
use crate::generators::{self, GeneratorContext};
use crate::matcher;
use crate::prevalence::PrevalenceTracker;

/// Where a completion request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    AwaitingSuggestionTypes,
    GeneratingCandidates,
    Ranking,
    Done,
}

/// Context-aware SQL completion for one session
pub struct CompletionEngine {
    loader: CatalogLoader,
    classifier: Box<dyn Classifier>,
    config: CompletionConfig,
    skip_patterns: Vec<Regex>,
    store: MetadataStore,
    prevalence: PrevalenceTracker,
    keywords: KeywordProvider,
    state: EngineState,
}

impl CompletionEngine {
    /// Create an engine with the default configuration and classifier
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        let keywords = KeywordProvider::new();
        let config = CompletionConfig::default();
        Self {
            loader: CatalogLoader::new(catalog),
            classifier: Box::new(LexicalClassifier::new()),
            skip_patterns: config.skip_patterns().unwrap_or_default(),
            store: new_store(&config, keywords),
            prevalence: PrevalenceTracker::new(keywords.all()),
            config,
            keywords,
            state: EngineState::Idle,
        }
    }

    /// Replace the configuration
    ///
    /// The metadata store is rebuilt with the new options and refilled on
    /// the next completion.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Configuration` when a skip pattern does not
    /// compile.
    pub fn with_config(mut self, config: CompletionConfig) -> CompletionResult<Self> {
        self.skip_patterns = config
            .skip_patterns()
            .map_err(|e| CompletionError::Configuration(e.to_string()))?;
        self.store = new_store(&config, self.keywords);
        self.loader.reset();
        self.config = config;
        Ok(self)
    }

    /// Replace the statement classifier
    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// The session's metadata cache
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn prevalence(&self) -> &PrevalenceTracker {
        &self.prevalence
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Complete at the end of `text_before_cursor`
    ///
    /// `full_sql` is the whole buffer and `text_before_cursor` its prefix up
    /// to the cursor. Completions come back best first, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::ConnectionUnavailable` when the catalog
    /// reports a lost connection. Failed metadata queries are not errors;
    /// they leave gaps in the results.
    pub async fn complete(
        &mut self,
        full_sql: &str,
        text_before_cursor: &str,
    ) -> CompletionResult<Vec<Completion>> {
        if !self.loader.is_connected().await {
            self.transition(EngineState::Idle);
            return Err(CompletionError::ConnectionUnavailable);
        }

        self.transition(EngineState::AwaitingSuggestionTypes);
        let suggestions = self.classifier.classify(full_sql, text_before_cursor);
        debug!(count = suggestions.len(), "Classified completion context");

        self.transition(EngineState::GeneratingCandidates);
        self.loader.ensure_session(&mut self.store).await;
        self.prevalence.add_keywords(self.store.keywords());

        let word_before_cursor = last_word(text_before_cursor, WordBoundary::ManyPunctuations);
        let mut generated = Vec::new();
        for suggestion in &suggestions {
            self.loader.ensure_for(suggestion, &mut self.store).await;
            let ctx = GeneratorContext {
                store: &self.store,
                config: &self.config,
                skip_patterns: &self.skip_patterns,
                keywords: self.keywords,
                word_before_cursor,
            };
            generated.extend(generators::generate(suggestion, &ctx));
        }

        self.transition(EngineState::Ranking);
        let mut matches: Vec<Match> = generated
            .into_iter()
            .flat_map(|batch| matcher::rank(batch, text_before_cursor, &self.prevalence))
            .collect();
        matches.sort_by(|a, b| b.priority_key.cmp(&a.priority_key));

        let mut seen = HashSet::new();
        let completions: Vec<Completion> = matches
            .into_iter()
            .map(|m| m.completion)
            .filter(|c| seen.insert((c.text.clone(), c.display_text.clone())))
            .collect();

        self.transition(EngineState::Done);
        debug!(count = completions.len(), "Completed");
        Ok(completions)
    }

    /// Count the keywords and names of an executed query
    pub fn record_query(&mut self, sql: &str) {
        self.prevalence.update(sql);
    }

    /// Drop cached metadata; the next completion fetches it again
    pub fn refresh(&mut self) {
        self.store.reset();
        self.loader.reset();
        debug!("Metadata cache cleared");
    }

    fn transition(&mut self, next: EngineState) {
        trace!(from = ?self.state, to = ?next, "Engine state");
        self.state = next;
    }
}

fn new_store(config: &CompletionConfig, keywords: KeywordProvider) -> MetadataStore {
    MetadataStore::new(
        NameNormalizer::with_reserved_words(keywords.reserved_words()),
        config.store_options(),
    )
}
