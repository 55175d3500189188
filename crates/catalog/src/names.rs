// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Name normalization
//!
//! PostgreSQL folds unquoted identifiers to lower case, so a name coming from
//! the catalog has to be quoted whenever its exact spelling would not survive
//! that folding, or when it collides with a reserved word. [`NameNormalizer`]
//! produces the canonical spelling used as a key everywhere in the
//! [`MetadataStore`](crate::MetadataStore).

use std::collections::HashSet;

/// Quotes, unquotes and canonicalizes SQL identifiers.
///
/// The normalizer owns the reserved-word set. A name is emitted quoted when it
/// is not a plain lower-case identifier (`^[_a-z][_a-z0-9$]*$`) or when its
/// upper-cased form is a reserved word.
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    reserved: HashSet<String>,
}

impl NameNormalizer {
    /// Create a normalizer with an empty reserved-word set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer seeded with reserved words
    ///
    /// Words are compared case-insensitively.
    pub fn with_reserved_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalizer = Self::new();
        normalizer.extend_reserved_words(words);
        normalizer
    }

    /// Add reserved words (keywords or built-in function names)
    pub fn extend_reserved_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reserved
            .extend(words.into_iter().map(|w| w.as_ref().to_uppercase()));
    }

    /// Check whether a word collides with the reserved-word set
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(&word.to_uppercase())
    }

    /// Canonical storage key for an exact catalog name
    ///
    /// Already-quoted input is returned unchanged, which makes the operation
    /// idempotent.
    pub fn normalize(&self, name: &str) -> String {
        self.escape(name)
    }

    /// Quote a name if PostgreSQL would not read it back verbatim
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlcomplete_catalog::NameNormalizer;
    ///
    /// let names = NameNormalizer::with_reserved_words(["SELECT"]);
    /// assert_eq!(names.escape("users"), "users");
    /// assert_eq!(names.escape("Users"), "\"Users\"");
    /// assert_eq!(names.escape("select"), "\"select\"");
    /// assert_eq!(names.escape("a\"b"), "\"a\"\"b\"");
    /// ```
    pub fn escape(&self, name: &str) -> String {
        if name.is_empty() || is_quoted(name) {
            return name.to_string();
        }
        if is_plain_identifier(name) && !self.is_reserved(name) {
            name.to_string()
        } else {
            format!("\"{}\"", name.replace('"', "\"\""))
        }
    }

    /// Strip surrounding quotes and undouble embedded quotes
    pub fn unescape(&self, name: &str) -> String {
        unescape(name)
    }

    /// Comparison form of a reference as typed in SQL
    ///
    /// Quoted references are kept verbatim, anything else is lower-cased and
    /// quoted. Two references name the same object iff their forms are equal.
    pub fn normalize_ref(&self, reference: &str) -> String {
        normalize_ref(reference)
    }
}

/// Strip surrounding quotes and undouble embedded quotes
pub fn unescape(name: &str) -> String {
    if is_quoted(name) {
        name[1..name.len() - 1].replace("\"\"", "\"")
    } else {
        name.to_string()
    }
}

/// See [`NameNormalizer::normalize_ref`]
pub fn normalize_ref(reference: &str) -> String {
    if reference.starts_with('"') {
        reference.to_string()
    } else {
        format!("\"{}\"", reference.to_lowercase())
    }
}

/// Fold an identifier as typed in SQL to the exact catalog name it denotes
///
/// Quoted identifiers keep their spelling, unquoted ones fold to lower case.
pub fn fold_identifier(typed: &str) -> String {
    if is_quoted(typed) {
        unescape(typed)
    } else {
        typed.to_lowercase()
    }
}

/// Derive a short table alias from a relation name
///
/// Takes every upper-case letter of the name; a name without upper-case
/// letters contributes its first letter plus each letter that follows an
/// underscore (underscores themselves are skipped).
///
/// # Examples
///
/// ```
/// use sqlcomplete_catalog::generate_alias;
///
/// assert_eq!(generate_alias("order_items"), "oi");
/// assert_eq!(generate_alias("OrderItems"), "OI");
/// assert_eq!(generate_alias("users"), "u");
/// ```
pub fn generate_alias(name: &str) -> String {
    let upper: String = name.chars().filter(|c| c.is_uppercase()).collect();
    if !upper.is_empty() {
        return upper;
    }

    let mut alias = String::new();
    let mut previous = '_';
    for c in name.chars() {
        if previous == '_' && c != '_' {
            alias.push(c);
        }
        previous = c;
    }
    alias
}

fn is_quoted(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('"') && name.ends_with('"')
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_lowercase() || c.is_ascii_digit())
}
