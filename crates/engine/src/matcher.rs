// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Matching and ranking
//!
//! Compares the word under the cursor with candidate text and builds the
//! sort key every completion is ranked by. Keys compare field by field:
//!
//! 1. match quality (exact, then fuzzy by span and start, then strict)
//! 2. category
//! 3. candidate priority
//! 4. prevalence in executed queries
//! 5. secondary priority
//! 6. lexical order
//!
//! Higher keys rank first.

use std::cmp::Reverse;

use sqlcomplete_catalog::unescape;
use sqlcomplete_context::{WordBoundary, last_word};

use crate::candidate::{Candidate, Category, Completion, Match, MatchMode};
use crate::generators::Generated;
use crate::prevalence::PrevalenceTracker;

const MAX_META_LEN: usize = 50;

/// How well the typed word fits a candidate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    /// Literal substring; earlier starts are better
    Strict { start: Reverse<usize> },
    /// Ordered characters; tighter spans, then earlier starts, are better
    Fuzzy {
        span: Reverse<usize>,
        start: Reverse<usize>,
    },
    /// The word is the candidate's whole text or its first word
    Exact,
    /// `*` expanded to a column list
    Expansion,
}

/// Alphabetical tie breaker
///
/// Spaces and underscores sort before letters, a prefix sorts before its
/// extensions, and a case-sensitive comparison settles the rest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LexicalKey {
    order: Vec<i64>,
    chars: Vec<char>,
}

impl LexicalKey {
    pub fn new(item: &str) -> Self {
        let mut order: Vec<i64> = unescape(&item.to_lowercase())
            .chars()
            .map(|c| if c == ' ' || c == '_' { 0 } else { -(c as i64) })
            .collect();
        order.push(1);
        Self {
            order,
            chars: item.chars().collect(),
        }
    }
}

/// Full ranking key of a match
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    pub quality: MatchQuality,
    pub category: Category,
    pub priority: i64,
    pub prevalence: u64,
    pub secondary_priority: i64,
    pub lexical: LexicalKey,
}

/// Match the word before the cursor against candidates
///
/// The replaced range is the trailing word (punctuation other than `.`,
/// `(`, `)`, `:` and `,` included); a leading double quote is ignored for
/// matching but still replaced.
pub fn find_matches(
    text_before_cursor: &str,
    candidates: Vec<Candidate>,
    mode: MatchMode,
    category: Category,
    prevalence: &PrevalenceTracker,
) -> Vec<Match> {
    let raw = last_word(text_before_cursor, WordBoundary::MostPunctuations);
    let start_offset = -(raw.chars().count() as isize);
    let lowered = raw.to_lowercase();
    let word = lowered.strip_prefix('"').unwrap_or(&lowered);
    let word: Vec<char> = word.chars().collect();

    candidates
        .into_iter()
        .filter_map(|candidate| {
            let quality = candidate
                .synonyms
                .iter()
                .filter_map(|synonym| match mode {
                    MatchMode::Fuzzy => fuzzy_quality(&word, synonym),
                    MatchMode::Strict => strict_quality(&word, synonym),
                })
                .max()?;

            let category = candidate.category.unwrap_or(category);
            let meta = candidate
                .display_meta
                .clone()
                .unwrap_or_else(|| category.label().to_string());
            let prevalence = match mode {
                MatchMode::Fuzzy => prevalence.name_count(&candidate.completion),
                MatchMode::Strict => prevalence.keyword_count(&candidate.completion),
            };

            let priority_key = PriorityKey {
                quality,
                category,
                priority: candidate.priority,
                prevalence,
                secondary_priority: candidate.secondary_priority,
                lexical: LexicalKey::new(&candidate.completion),
            };
            Some(Match {
                completion: Completion {
                    text: candidate.completion,
                    start_offset,
                    display_text: candidate.display,
                    display_category: Some(truncate_meta(meta)),
                },
                priority_key,
            })
        })
        .collect()
}

/// Turn one generator batch into matches
pub fn rank(generated: Generated, text_before_cursor: &str, prevalence: &PrevalenceTracker) -> Vec<Match> {
    match generated {
        Generated::Candidates {
            mode,
            category,
            candidates,
        } => find_matches(text_before_cursor, candidates, mode, category, prevalence),
        Generated::Expansion { text, replace } => vec![expansion_match(text, replace)],
    }
}

/// The single match that replaces `*`, or a qualified `x.*`, with a column list
pub fn expansion_match(text: String, replace: usize) -> Match {
    let lexical = LexicalKey::new(&text);
    Match {
        completion: Completion {
            text,
            start_offset: -(replace as isize),
            display_text: "*".to_string(),
            display_category: Some("columns".to_string()),
        },
        priority_key: PriorityKey {
            quality: MatchQuality::Expansion,
            category: Category::Column,
            priority: 0,
            prevalence: 0,
            secondary_priority: 0,
            lexical,
        },
    }
}

fn fuzzy_quality(word: &[char], item: &str) -> Option<MatchQuality> {
    let lowered: Vec<char> = item.to_lowercase().chars().collect();
    let prefix = &lowered[..lowered.len().min(word.len() + 1)];
    let first_word = prefix.len() == word.len() + 1
        && prefix[word.len()] == ' '
        && prefix[..word.len()] == *word;
    if prefix == word || first_word {
        return Some(MatchQuality::Exact);
    }

    let haystack: Vec<char> = unescape(&item.to_lowercase()).chars().collect();
    let (start, end) = fuzzy_span(word, &haystack)?;
    Some(MatchQuality::Fuzzy {
        span: Reverse(end - start),
        start: Reverse(start),
    })
}

/// Leftmost occurrence of `word` as a subsequence of `haystack`, each
/// character taken as early as possible; returns `(start, end)` in chars
fn fuzzy_span(word: &[char], haystack: &[char]) -> Option<(usize, usize)> {
    let Some((&first, rest)) = word.split_first() else {
        return Some((0, 0));
    };
    let start = haystack.iter().position(|&c| c == first)?;
    let mut pos = start + 1;
    for &c in rest {
        pos += haystack[pos..].iter().position(|&h| h == c)? + 1;
    }
    Some((start, pos))
}

fn strict_quality(word: &[char], item: &str) -> Option<MatchQuality> {
    let haystack = unescape(&item.to_lowercase());
    let needle: String = word.iter().collect();
    let byte_start = haystack.find(&needle)?;
    Some(MatchQuality::Strict {
        start: Reverse(haystack[..byte_start].chars().count()),
    })
}

fn truncate_meta(meta: String) -> String {
    if meta.chars().count() > MAX_META_LEN {
        let head: String = meta.chars().take(MAX_META_LEN - 3).collect();
        format!("{head}...")
    } else {
        meta
    }
}
