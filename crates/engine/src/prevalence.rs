// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Prevalence tracking
//!
//! Counts how often keywords and names appear in executed queries. The counts
//! break ties between equally good matches, so identifiers the user works
//! with a lot float to the top.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use sqlcomplete_context::{TokenKind, tokenize};
use tracing::trace;

static INNER_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Keyword and name usage counts for one session
#[derive(Debug, Default)]
pub struct PrevalenceTracker {
    known_keywords: HashSet<String>,
    keyword_patterns: Vec<(String, Regex)>,
    keyword_counts: HashMap<String, u64>,
    name_counts: HashMap<String, u64>,
}

impl PrevalenceTracker {
    /// Create a tracker that counts the given keywords
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tracker = Self::default();
        tracker.add_keywords(keywords);
        tracker
    }

    /// Start counting more keywords; known keywords are ignored
    pub fn add_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            let keyword = keyword.as_ref().to_uppercase();
            if keyword.is_empty() || !self.known_keywords.insert(keyword.clone()) {
                continue;
            }
            if let Some(pattern) = keyword_pattern(&keyword) {
                self.keyword_patterns.push((keyword, pattern));
            }
        }
    }

    /// Count the keywords and names in an executed query
    pub fn update(&mut self, sql: &str) {
        self.update_keywords(sql);
        self.update_names(sql);
    }

    fn update_keywords(&mut self, sql: &str) {
        for (keyword, pattern) in &self.keyword_patterns {
            let hits = pattern.find_iter(sql).count() as u64;
            if hits > 0 {
                *self.keyword_counts.entry(keyword.clone()).or_default() += hits;
            }
        }
    }

    fn update_names(&mut self, sql: &str) {
        for token in tokenize(sql) {
            let name = match token.kind {
                TokenKind::Name => token.text.to_lowercase(),
                TokenKind::QuotedName => token.text.to_string(),
                _ => continue,
            };
            *self.name_counts.entry(name).or_default() += 1;
        }
        trace!(names = self.name_counts.len(), "Updated name prevalence");
    }

    /// Forget name counts, keeping keyword counts
    pub fn clear_names(&mut self) {
        self.name_counts.clear();
    }

    pub fn keyword_count(&self, keyword: &str) -> u64 {
        self.keyword_counts
            .get(&keyword.to_uppercase())
            .copied()
            .unwrap_or(0)
    }

    /// Usage count of a name, spelled the way it would be inserted
    pub fn name_count(&self, name: &str) -> u64 {
        self.name_counts.get(name).copied().unwrap_or(0)
    }
}

/// Whole-word, case-insensitive pattern; inner spaces match any whitespace
fn keyword_pattern(keyword: &str) -> Option<Regex> {
    let escaped = regex::escape(keyword);
    let body = INNER_WHITESPACE.replace_all(&escaped, r"\s+");
    RegexBuilder::new(&format!(r"\b{body}\b"))
        .case_insensitive(true)
        .build()
        .ok()
}
