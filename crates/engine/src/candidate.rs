// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Candidates and completions
//!
//! A [`Candidate`] is a piece of text a generator proposes; the matcher turns
//! the ones that fit the typed word into ranked [`Match`]es, and the engine
//! hands their [`Completion`]s to the caller.

use std::fmt;

use serde::Serialize;
use sqlcomplete_catalog::generate_alias;

use crate::matcher::PriorityKey;

/// Kind of object a completion refers to
///
/// Declaration order is ranking order: later categories win ties on match
/// quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Keyword,
    Function,
    View,
    Table,
    Datatype,
    Database,
    Schema,
    Column,
    TableAlias,
    Join,
    NameJoin,
    FkJoin,
    TableFormat,
}

impl Category {
    /// Label shown next to a completion
    pub fn label(self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::Function => "function",
            Category::View => "view",
            Category::Table => "table",
            Category::Datatype => "datatype",
            Category::Database => "database",
            Category::Schema => "schema",
            Category::Column => "column",
            Category::TableAlias => "table alias",
            Category::Join => "join",
            Category::NameJoin => "name join",
            Category::FkJoin => "fk join",
            Category::TableFormat => "table format",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the typed word is compared with candidate text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Characters in order, gaps allowed
    Fuzzy,
    /// Literal substring
    Strict,
}

/// Proposed completion text before matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Text inserted on acceptance
    pub completion: String,
    pub priority: i64,
    /// Overrides the category label shown to the user
    pub display_meta: Option<String>,
    /// Alternative spellings the typed word may match; the completion
    /// itself is always first
    pub synonyms: Vec<String>,
    pub secondary_priority: i64,
    /// Text shown in the menu
    pub display: String,
    /// Overrides the category of the batch this candidate belongs to
    pub category: Option<Category>,
}

impl Candidate {
    pub fn new(completion: impl Into<String>) -> Self {
        let completion = completion.into();
        Self {
            synonyms: vec![completion.clone()],
            display: completion.clone(),
            completion,
            priority: 0,
            display_meta: None,
            secondary_priority: 0,
            category: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_secondary_priority(mut self, priority: i64) -> Self {
        self.secondary_priority = priority;
        self
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.display_meta = Some(meta.into());
        self
    }

    /// Category override; the category label also becomes the display meta
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self.display_meta = Some(category.label().to_string());
        self
    }

    /// Replace the alternative spellings
    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    /// Synonyms `[name, generate_alias(name)]`, so `ft` finds `FooTable`
    pub fn with_alias_synonym(self, name: &str) -> Self {
        let alias = generate_alias(name);
        self.with_synonyms([name.to_string(), alias])
    }
}

/// Completion item returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Completion {
    /// Text to insert
    pub text: String,
    /// Where replacement starts, relative to the cursor (zero or negative)
    pub start_offset: isize,
    /// Text shown in the menu
    pub display_text: String,
    /// Category label shown next to the item
    pub display_category: Option<String>,
}

/// Ranked completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub completion: Completion,
    pub priority_key: PriorityKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order() {
        assert!(Category::Keyword < Category::Function);
        assert!(Category::Table < Category::Column);
        assert!(Category::NameJoin < Category::FkJoin);
        assert_eq!(Category::TableAlias.to_string(), "table alias");
    }

    #[test]
    fn test_candidate_defaults() {
        let candidate = Candidate::new("users");
        assert_eq!(candidate.synonyms, vec!["users"]);
        assert_eq!(candidate.display, "users");
        assert_eq!(candidate.priority, 0);
        assert!(candidate.category.is_none());
    }

    #[test]
    fn test_alias_synonym() {
        let candidate = Candidate::new("public.user_emails").with_alias_synonym("user_emails");
        assert_eq!(candidate.synonyms, vec!["user_emails", "ue"]);
        assert_eq!(candidate.completion, "public.user_emails");
    }

    #[test]
    fn test_category_override_sets_meta() {
        let candidate = Candidate::new("a.id = b.id").with_category(Category::FkJoin);
        assert_eq!(candidate.display_meta.as_deref(), Some("fk join"));
    }
}
