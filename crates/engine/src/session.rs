// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Session registry
//!
//! Maps session ids to their completion engines.
//!
//! The registry is responsible for:
//! - Creating an engine when a session opens
//! - Routing completion requests to the session's engine
//! - Dropping the engine, and with it the session's metadata, on close

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use sqlcomplete_catalog::Catalog;
use tracing::debug;

use crate::candidate::Completion;
use crate::config::CompletionConfig;
use crate::engine::CompletionEngine;
use crate::error::{CompletionError, CompletionResult};

/// Session registry
///
/// Owned by whatever manages connections; each session has its own engine,
/// store and catalog handle.
#[derive(Default)]
pub struct SessionRegistry {
    engines: HashMap<String, CompletionEngine>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session with the given catalog and configuration
    ///
    /// An existing session with the same id is replaced.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// registry.open("s1", catalog, CompletionConfig::default())?;
    /// let completions = registry.complete("s1", sql, sql).await?;
    /// ```
    pub fn open(
        &mut self,
        session_id: impl Into<String>,
        catalog: Arc<dyn Catalog>,
        config: CompletionConfig,
    ) -> CompletionResult<&mut CompletionEngine> {
        let engine = CompletionEngine::new(catalog).with_config(config)?;
        Ok(self.insert(session_id, engine))
    }

    /// Register an engine built by the caller
    pub fn insert(&mut self, session_id: impl Into<String>, engine: CompletionEngine) -> &mut CompletionEngine {
        let session_id = session_id.into();
        debug!(session = %session_id, "Session opened");
        match self.engines.entry(session_id) {
            Entry::Occupied(mut entry) => {
                entry.insert(engine);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(engine),
        }
    }

    pub fn get_mut(&mut self, session_id: &str) -> Option<&mut CompletionEngine> {
        self.engines.get_mut(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.engines.contains_key(session_id)
    }

    /// Complete within a session
    ///
    /// # Errors
    ///
    /// `CompletionError::UnknownSession` when no such session is open, else
    /// whatever [`CompletionEngine::complete`] returns.
    pub async fn complete(
        &mut self,
        session_id: &str,
        full_sql: &str,
        text_before_cursor: &str,
    ) -> CompletionResult<Vec<Completion>> {
        let engine = self
            .engines
            .get_mut(session_id)
            .ok_or_else(|| CompletionError::UnknownSession(session_id.to_string()))?;
        engine.complete(full_sql, text_before_cursor).await
    }

    /// Close a session, dropping its cached metadata
    pub fn close(&mut self, session_id: &str) -> bool {
        let closed = self.engines.remove(session_id).is_some();
        if closed {
            debug!(session = %session_id, "Session closed");
        }
        closed
    }

    /// Close all sessions
    ///
    /// This should be called when shutting down.
    pub fn close_all(&mut self) {
        self.engines.clear();
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
