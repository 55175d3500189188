// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sqlcomplete - Context Layer
//!
//! Works out what kind of object may appear at the cursor.
//!
//! ## Overview
//!
//! The completion engine hands the SQL text and the text before the cursor
//! to a [`Classifier`], which answers with an ordered list of
//! [`Suggestion`]s: "a column of these tables", "a table in this schema",
//! "a keyword that may follow CREATE", and so on. Generators in the engine
//! turn each suggestion into candidates.
//!
//! ## Core Concepts
//!
//! ### Suggestions
//!
//! [`Suggestion`] is a closed enum with one variant per object kind. Table
//! references found in the statement travel with it as [`TableReference`]s.
//!
//! ### Lexical classification
//!
//! [`LexicalClassifier`] tokenizes the current statement ([`lexer`]) and
//! decides from the last significant token before the word being typed.
//! The helpers it uses live in [`parse_utils`].
//!
//! ### Keywords
//!
//! The [`keywords`] module holds the PostgreSQL keyword, built-in function
//! and datatype tables.
//!
//! ## Examples
//!
//! ```rust
//! use sqlcomplete_context::{Classifier, LexicalClassifier, Suggestion, TableReference};
//!
//! let sql = "SELECT * FROM users WHERE na";
//! let suggestions = LexicalClassifier::new().classify(sql, sql);
//!
//! assert_eq!(
//!     suggestions[0],
//!     Suggestion::column(vec![TableReference::new("users")])
//! );
//! ```

pub mod classifier;
pub mod keywords;
pub mod lexer;
pub mod parse_utils;
pub mod suggestion;

// Re-export commonly used types
pub use classifier::{Classifier, LexicalClassifier};
pub use keywords::KeywordProvider;
pub use lexer::{Token, TokenKind, tokenize};
pub use parse_utils::{
    PartialIdentifier, WordBoundary, extract_tables, last_word, parse_partial_identifier,
};
pub use suggestion::{
    ColumnContext, FunctionUsage, Suggestion, SuggestionKind, TableReference,
};
